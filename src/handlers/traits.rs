use std::any::Any;
use thiserror::Error;

use crate::store::{ExportRepository, StoreError};

/// Handler errors
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler construction failed: {0}")]
    Construction(String),
    #[error("data store query failed: {0}")]
    Store(#[from] StoreError),
    #[error("import total unavailable: {0}")]
    Total(String),
    #[error("handler panicked: {0}")]
    Panicked(String),
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A pluggable unit that knows how to import one category of content
///
/// Implementations are built fresh for every verification and only see the
/// opened data store for the duration of a single call.
pub trait PortableService: Send {
    /// Category label this handler is responsible for, e.g. `"Pages"`
    fn category(&self) -> &str;

    /// Number of items of this category an import would process
    fn import_total(&self, repository: &dyn ExportRepository) -> Result<u64, HandlerError>;
}
