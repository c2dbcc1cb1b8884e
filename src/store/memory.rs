use serde_json::Value;
use std::collections::HashMap;

use super::{ExportRepository, Result};

/// In-memory document store
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    collections: HashMap<String, Vec<Value>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, collection: impl Into<String>, document: Value) {
        self.collections
            .entry(collection.into())
            .or_default()
            .push(document);
    }
}

impl ExportRepository for MemoryRepository {
    fn count(&self, collection: &str) -> Result<u64> {
        Ok(self.collections.get(collection).map_or(0, |docs| docs.len() as u64))
    }

    fn documents(&self, collection: &str) -> Result<Vec<Value>> {
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }
}
