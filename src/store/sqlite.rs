use std::collections::VecDeque;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, params, params_from_iter};
use serde_json::Value;

use crate::error::{ReindexError, Result};
use crate::query::Query;
use crate::store::registry::Registry;
use crate::store::{Collection, Cursor, Document};

/// A trigger with this suffix on a collection table marks it searchable.
pub const SEARCH_TRIGGER_SUFFIX: &str = "_search";
/// Table the provisioned search trigger writes into.
pub const SEARCH_INDEX_SUFFIX: &str = "_search_index";

/// SQLite file holding document collections.
///
/// A collection is any table with an `_id` column (text or integer) and a
/// `doc` column carrying the body.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing database. Never creates the file.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(ReindexError::DatabaseNotFound(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI,
        )?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    /// Open or create a database file, for provisioning.
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Names of every document collection, ascending.
    pub fn collection_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.name FROM sqlite_master m
             WHERE m.type = 'table'
             AND m.name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
             AND EXISTS (SELECT 1 FROM pragma_table_info(m.name) WHERE name = '_id')
             AND EXISTS (SELECT 1 FROM pragma_table_info(m.name) WHERE name = 'doc')
             ORDER BY m.name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn has_search_hook(&self, collection: &str) -> Result<bool> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS (
                SELECT 1 FROM sqlite_master
                WHERE type = 'trigger' AND tbl_name = ?1 AND name = ?2
            )",
            params![collection, format!("{collection}{SEARCH_TRIGGER_SUFFIX}")],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Build the registry of every collection in the database.
    pub fn registry(&self, batch_size: usize) -> Result<Registry<'_>> {
        let mut registry = Registry::new();
        for name in self.collection_names()? {
            let handle = self.handle(name, batch_size)?;
            registry.register(Box::new(handle));
        }
        Ok(registry)
    }

    pub fn collection(&self, name: &str) -> Result<SqliteCollection<'_>> {
        self.collection_with_batch(name, crate::config::DEFAULT_BATCH_SIZE)
    }

    fn collection_with_batch(&self, name: &str, batch_size: usize) -> Result<SqliteCollection<'_>> {
        validate_name(name)?;
        if !self.collection_names()?.iter().any(|n| n == name) {
            return Err(ReindexError::UnknownCollection(name.to_string()));
        }
        self.handle(name.to_string(), batch_size)
    }

    fn handle(&self, name: String, batch_size: usize) -> Result<SqliteCollection<'_>> {
        let searchable = self.has_search_hook(&name)?;
        Ok(SqliteCollection {
            conn: &self.conn,
            name,
            searchable,
            batch_size: batch_size.max(1),
        })
    }

    /// Create a collection table. Searchable collections also get a
    /// `<name>_search_index` table and a `<name>_search` trigger that
    /// upserts into it whenever a document is updated.
    pub fn create_collection(&self, name: &str, searchable: bool) -> Result<()> {
        validate_name(name)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                _id TEXT PRIMARY KEY,
                doc TEXT NOT NULL
            );",
            table = quote(name),
        ))?;
        if searchable {
            let index = format!("{name}{SEARCH_INDEX_SUFFIX}");
            let trigger = format!("{name}{SEARCH_TRIGGER_SUFFIX}");
            tx.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {index} (
                    doc_id TEXT PRIMARY KEY,
                    content TEXT NOT NULL,
                    indexed_count INTEGER NOT NULL DEFAULT 0
                );
                CREATE TRIGGER IF NOT EXISTS {trigger} AFTER UPDATE ON {table}
                BEGIN
                    INSERT OR IGNORE INTO {index} (doc_id, content, indexed_count)
                        VALUES (NEW._id, NEW.doc, 0);
                    UPDATE {index} SET content = NEW.doc, indexed_count = indexed_count + 1
                        WHERE doc_id = NEW._id;
                END;",
                table = quote(name),
                index = quote(&index),
                trigger = quote(&trigger),
            ))?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn insert(&self, collection: &str, id: &str, body: &Value) -> Result<()> {
        validate_name(collection)?;
        if !self.collection_names()?.iter().any(|n| n == collection) {
            return Err(ReindexError::UnknownCollection(collection.to_string()));
        }
        self.conn.execute(
            &format!("INSERT INTO {} (_id, doc) VALUES (?1, ?2)", quote(collection)),
            params![id, serde_json::to_string(body)?],
        )?;
        Ok(())
    }

    /// How many times the search trigger has indexed `id`, if ever.
    pub fn indexed_count(&self, collection: &str, id: &str) -> Result<Option<u64>> {
        validate_name(collection)?;
        let index = format!("{collection}{SEARCH_INDEX_SUFFIX}");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT indexed_count FROM {} WHERE doc_id = ?1",
            quote(&index)
        ))?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Raw connection, for operators attaching their own triggers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Collection names end up inside SQL; allow only plain identifiers.
pub fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_start || !valid_rest || name.to_ascii_lowercase().starts_with("sqlite_") {
        return Err(ReindexError::InvalidCollectionName(name.to_string()));
    }
    Ok(())
}

/// Quote an identifier, doubling embedded quotes. Discovered tables are
/// not guaranteed to pass `validate_name`.
fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Text form of an `_id`. Integer ids are compared back through the column's
/// numeric affinity, so `"10" > "9"` holds for them.
fn render_id(collection: &str, value: ValueRef<'_>) -> Result<String> {
    let unsupported = |kind| ReindexError::UnsupportedId {
        collection: collection.to_string(),
        kind,
    };
    match value {
        ValueRef::Text(text) => Ok(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Integer(n) => Ok(n.to_string()),
        ValueRef::Real(f) => Ok(f.to_string()),
        ValueRef::Null => Err(unsupported("null")),
        ValueRef::Blob(_) => Err(unsupported("blob")),
    }
}

/// Handle on one collection table.
pub struct SqliteCollection<'c> {
    conn: &'c Connection,
    name: String,
    searchable: bool,
    batch_size: usize,
}

impl Collection for SqliteCollection<'_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn searchable(&self) -> bool {
        self.searchable
    }

    fn count_documents(&self, query: &Query) -> Result<u64> {
        let (clause, params) = query.to_sql();
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE {clause}", quote(&self.name)),
            params_from_iter(params.iter()),
            |row| row.get::<_, u64>(0),
        )?;
        Ok(count)
    }

    fn find<'a>(&'a self, query: &Query) -> Result<Cursor<'a>> {
        Ok(Box::new(SqliteCursor {
            collection: self,
            query: query.clone(),
            last_id: None,
            buffer: VecDeque::with_capacity(self.batch_size),
            exhausted: false,
        }))
    }

    fn save(&self, doc: &Document) -> Result<()> {
        // Self-assignment keeps the stored bytes and still fires UPDATE triggers.
        let changed = self.conn.execute(
            &format!("UPDATE {} SET doc = doc WHERE _id = ?1", quote(&self.name)),
            params![doc.id],
        )?;
        if changed == 0 {
            return Err(ReindexError::DocumentMissing {
                collection: self.name.clone(),
                id: doc.id.clone(),
            });
        }
        Ok(())
    }
}

/// Keyset-paged cursor: pages are fetched in `_id` order, each one starting
/// after the last identifier of the previous page.
struct SqliteCursor<'a> {
    collection: &'a SqliteCollection<'a>,
    query: Query,
    last_id: Option<String>,
    buffer: VecDeque<Document>,
    exhausted: bool,
}

impl SqliteCursor<'_> {
    fn fetch_page(&mut self) -> Result<()> {
        let coll = self.collection;
        let (clause, mut params) = self.query.to_sql();
        let mut sql = format!("SELECT _id FROM {} WHERE {clause}", quote(&coll.name));
        if let Some(last) = &self.last_id {
            sql.push_str(" AND _id > ?");
            params.push(last.clone());
        }
        sql.push_str(&format!(" ORDER BY _id LIMIT {}", coll.batch_size));

        let mut stmt = coll.conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let mut page = Vec::with_capacity(coll.batch_size);
        while let Some(row) = rows.next()? {
            page.push(Document::new(render_id(&coll.name, row.get_ref(0)?)?));
        }

        if page.len() < coll.batch_size {
            self.exhausted = true;
        }
        if let Some(last) = page.last() {
            self.last_id = Some(last.id.clone());
        }
        self.buffer.extend(page);
        Ok(())
    }
}

impl Iterator for SqliteCursor<'_> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
