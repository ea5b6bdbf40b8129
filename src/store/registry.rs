use crate::store::Collection;

struct Entry<'c> {
    handle: Box<dyn Collection + 'c>,
    searchable: bool,
}

/// Collection handles in registration order.
///
/// The search capability of each handle is captured when it is registered.
#[derive(Default)]
pub struct Registry<'c> {
    entries: Vec<Entry<'c>>,
}

impl<'c> Registry<'c> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn register(&mut self, handle: Box<dyn Collection + 'c>) {
        let searchable = handle.searchable();
        self.entries.push(Entry { handle, searchable });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every registered collection with its search flag.
    pub fn iter(&self) -> impl Iterator<Item = (&(dyn Collection + 'c), bool)> {
        self.entries
            .iter()
            .map(|e| (e.handle.as_ref(), e.searchable))
    }

    /// Only the collections with a search capability, in registration order.
    pub fn searchable(&self) -> impl Iterator<Item = &(dyn Collection + 'c)> {
        self.entries
            .iter()
            .filter(|e| e.searchable)
            .map(|e| e.handle.as_ref())
    }
}
