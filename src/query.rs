use crate::config::Filters;

/// Constraints on the `_id` of the documents a collection yields.
///
/// Both constraints combine with AND when present; an empty query matches
/// every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// `_id` must be one of these. Empty means unrestricted.
    pub ids: Vec<String>,
    /// `_id` must be strictly greater than this.
    pub after: Option<String>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn from_filters(filters: &Filters) -> Self {
        Self {
            ids: filters.ids.clone(),
            after: filters.from.clone(),
        }
    }

    /// Evaluate the query against a single identifier.
    pub fn matches(&self, id: &str) -> bool {
        let in_set = self.ids.is_empty() || self.ids.iter().any(|i| i == id);
        let past_bound = self.after.as_deref().is_none_or(|after| id > after);
        in_set && past_bound
    }

    /// Render as a SQL boolean expression over `_id` with positional
    /// parameters, e.g. `_id IN (?, ?) AND _id > ?`.
    pub fn to_sql(&self) -> (String, Vec<String>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        if !self.ids.is_empty() {
            let marks = vec!["?"; self.ids.len()].join(", ");
            clauses.push(format!("_id IN ({marks})"));
            params.extend(self.ids.iter().cloned());
        }
        if let Some(after) = &self.after {
            clauses.push("_id > ?".to_string());
            params.push(after.clone());
        }
        if clauses.is_empty() {
            ("1 = 1".to_string(), params)
        } else {
            (clauses.join(" AND "), params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_query_matches_everything() {
        let q = Query::all();
        assert!(q.matches("anything"));
        assert_eq!(q.to_sql(), ("1 = 1".to_string(), vec![]));
    }

    #[test]
    fn id_filter_and_lower_bound_combine_conjunctively() {
        let filters = Filters::parse(None, Some("5,7,9"), Some("6"));
        let q = Query::from_filters(&filters);

        assert!(!q.matches("5"));
        assert!(q.matches("7"));
        assert!(q.matches("9"));
        assert!(!q.matches("8"));

        let (sql, params) = q.to_sql();
        assert_eq!(sql, "_id IN (?, ?, ?) AND _id > ?");
        assert_eq!(params, vec!["5", "7", "9", "6"]);
    }

    #[test]
    fn lower_bound_is_exclusive() {
        let q = Query {
            ids: vec![],
            after: Some("100".into()),
        };
        assert!(!q.matches("100"));
        assert!(q.matches("101"));
        assert!(!q.matches("099"));
    }
}
