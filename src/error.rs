use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReindexError {
    #[error("database not found: {0}")]
    DatabaseNotFound(PathBuf),

    #[error(
        "invalid collection name '{0}' (use ASCII letters, digits and underscores, not starting with a digit)"
    )]
    InvalidCollectionName(String),

    #[error("collection '{0}' not found")]
    UnknownCollection(String),

    #[error("document {collection}/#{id} no longer exists")]
    DocumentMissing { collection: String, id: String },

    #[error("collection '{collection}' has a {kind} _id, expected text or a number")]
    UnsupportedId {
        collection: String,
        kind: &'static str,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl ReindexError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DatabaseNotFound(_) => "database_not_found",
            Self::InvalidCollectionName(_) => "invalid_collection_name",
            Self::UnknownCollection(_) => "unknown_collection",
            Self::DocumentMissing { .. } => "document_missing",
            Self::UnsupportedId { .. } => "unsupported_id",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::Db(_) => "db_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReindexError>;
