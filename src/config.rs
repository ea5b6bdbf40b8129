use std::path::PathBuf;

pub const COLLECTION_VAR: &str = "REINDEX_COLLECTION";
pub const ID_VAR: &str = "REINDEX_ID";
pub const FROM_VAR: &str = "REINDEX_FROM";
pub const DATABASE_VAR: &str = "REINDEX_DATABASE";

pub const DEFAULT_DATABASE: &str = "app.db";
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Which collections and documents a run touches.
///
/// Parsed once at startup and never mutated afterwards. Empty lists mean
/// "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub collections: Vec<String>,
    pub ids: Vec<String>,
    /// Exclusive lower bound on `_id`, for resuming an interrupted run.
    pub from: Option<String>,
}

impl Filters {
    /// Build filters from explicit values, falling back to the `REINDEX_*`
    /// environment variables for any value not given.
    pub fn resolve(
        collection: Option<String>,
        id: Option<String>,
        from: Option<String>,
    ) -> Self {
        let collection = collection.or_else(|| env_value(COLLECTION_VAR));
        let id = id.or_else(|| env_value(ID_VAR));
        let from = from.or_else(|| env_value(FROM_VAR));
        Self::parse(collection.as_deref(), id.as_deref(), from.as_deref())
    }

    pub fn parse(collection: Option<&str>, id: Option<&str>, from: Option<&str>) -> Self {
        Self {
            collections: collection.map(split_csv).unwrap_or_default(),
            ids: id.map(split_csv).unwrap_or_default(),
            from: from
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }

    /// Whether a collection survives the collection filter.
    pub fn includes_collection(&self, name: &str) -> bool {
        self.collections.is_empty() || self.collections.iter().any(|c| c == name)
    }
}

/// Split a comma-separated list, trimming whitespace around each token and
/// dropping empty tokens.
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Database path: explicit value, then `REINDEX_DATABASE`, then `app.db`.
pub fn resolve_database(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| env_value(DATABASE_VAR).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE))
}

fn env_value(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-var tests must not run concurrently.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in [COLLECTION_VAR, ID_VAR, FROM_VAR, DATABASE_VAR] {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    fn split_csv_trims_and_drops_empty_tokens() {
        assert_eq!(split_csv(" widgets , users,,  "), vec!["widgets", "users"]);
        assert!(split_csv("").is_empty());
        assert!(split_csv(" , ,").is_empty());
    }

    #[test]
    fn parse_treats_blank_from_as_unset() {
        let filters = Filters::parse(None, Some("5, 9"), Some("   "));
        assert_eq!(filters.ids, vec!["5", "9"]);
        assert_eq!(filters.from, None);
        assert!(filters.collections.is_empty());
    }

    #[test]
    fn includes_collection_is_exact_match() {
        let filters = Filters::parse(Some("widgets,users"), None, None);
        assert!(filters.includes_collection("widgets"));
        assert!(filters.includes_collection("users"));
        assert!(!filters.includes_collection("widget"));
        assert!(!filters.includes_collection("logs"));

        assert!(Filters::default().includes_collection("anything"));
    }

    #[test]
    fn resolve_reads_env_and_prefers_explicit_values() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        unsafe {
            std::env::set_var(COLLECTION_VAR, "widgets, users");
            std::env::set_var(ID_VAR, "5,9");
            std::env::set_var(FROM_VAR, " 100 ");
        }
        let filters = Filters::resolve(None, None, None);
        assert_eq!(filters.collections, vec!["widgets", "users"]);
        assert_eq!(filters.ids, vec!["5", "9"]);
        assert_eq!(filters.from.as_deref(), Some("100"));

        let filters = Filters::resolve(Some("logs".into()), None, Some("200".into()));
        assert_eq!(filters.collections, vec!["logs"]);
        assert_eq!(filters.ids, vec!["5", "9"]);
        assert_eq!(filters.from.as_deref(), Some("200"));

        clear_env();
        assert_eq!(Filters::resolve(None, None, None), Filters::default());
    }

    #[test]
    fn resolve_database_falls_back_to_env_then_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        assert_eq!(resolve_database(None), PathBuf::from(DEFAULT_DATABASE));

        unsafe { std::env::set_var(DATABASE_VAR, "/tmp/other.db") };
        assert_eq!(resolve_database(None), PathBuf::from("/tmp/other.db"));
        assert_eq!(
            resolve_database(Some(PathBuf::from("mine.db"))),
            PathBuf::from("mine.db")
        );

        clear_env();
    }
}
