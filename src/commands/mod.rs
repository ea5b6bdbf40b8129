pub mod collections;
pub mod reindex;
