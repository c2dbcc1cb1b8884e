//! Access to the data store embedded in an export package
//!
//! The exported content lives in a document store: named collections of
//! JSON documents. Handlers and the summary builder only see the
//! [`ExportRepository`] trait, so they work the same against the SQLite
//! file shipped in a package ([`ExportDb`]) and against the in-memory
//! [`MemoryRepository`] used in tests.

mod error;
mod memory;
mod records;
mod sqlite;

pub use error::{Result, StoreError};
pub use memory::MemoryRepository;
pub use records::{ExportMetadata, StoreRecord};
pub use sqlite::{ExportDb, ExportDbWriter};

use serde_json::Value;

/// Read-only view over the collections of an opened data store
pub trait ExportRepository {
    /// Number of documents in `collection` (zero when it does not exist)
    fn count(&self, collection: &str) -> Result<u64>;

    /// All documents in `collection`, in insertion order
    fn documents(&self, collection: &str) -> Result<Vec<Value>>;
}

/// Typed helpers layered over any [`ExportRepository`]
pub trait RepositoryExt: ExportRepository {
    /// Load the only record of type `T`
    ///
    /// Fails with [`StoreError::NotSingle`] when the collection holds zero or
    /// several documents.
    fn get_single_item<T: StoreRecord>(&self) -> Result<T> {
        let mut documents = self.documents(T::COLLECTION)?;
        if documents.len() != 1 {
            return Err(StoreError::NotSingle {
                collection: T::COLLECTION,
                count: documents.len(),
            });
        }

        let document = documents.remove(0);
        serde_json::from_value(document).map_err(|source| StoreError::Decode {
            collection: T::COLLECTION.to_string(),
            source,
        })
    }
}

impl<R: ExportRepository + ?Sized> RepositoryExt for R {}
