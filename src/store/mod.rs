pub mod registry;
pub mod sqlite;

use crate::error::Result;
use crate::query::Query;

/// Handle on a stored record. The body is never read: saving rewrites the
/// stored value in place, so only the identifier travels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A lazily fetched stream of documents, consumed one at a time.
pub type Cursor<'a> = Box<dyn Iterator<Item = Result<Document>> + 'a>;

/// What the runner needs from a collection handle.
pub trait Collection {
    fn name(&self) -> &str;

    /// Whether saving a document in this collection fires a search-indexing hook.
    fn searchable(&self) -> bool;

    fn count_documents(&self, query: &Query) -> Result<u64>;

    fn find<'a>(&'a self, query: &Query) -> Result<Cursor<'a>>;

    /// Re-persist `doc` unchanged, firing any hooks attached to writes.
    fn save(&self, doc: &Document) -> Result<()>;
}
