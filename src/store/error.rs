use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{0} is not an export data store (missing documents table)")]
    MissingSchema(PathBuf),

    #[error("failed to decode document in '{collection}': {source}")]
    Decode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode document for '{collection}': {source}")]
    Encode {
        collection: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected exactly one '{collection}' record, found {count}")]
    NotSingle {
        collection: &'static str,
        count: usize,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
