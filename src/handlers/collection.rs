use super::traits::{HandlerError, PortableService};
use crate::store::ExportRepository;

/// Reports the number of documents in one collection of the data store
///
/// This is the handler the registry builds from configuration: each
/// `[[handlers]]` entry maps a category label onto the collection the
/// exporter wrote its items to.
#[derive(Debug, Clone)]
pub struct CollectionCountHandler {
    category: String,
    collection: String,
}

impl CollectionCountHandler {
    pub fn new(category: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            collection: collection.into(),
        }
    }
}

impl PortableService for CollectionCountHandler {
    fn category(&self) -> &str {
        &self.category
    }

    fn import_total(&self, repository: &dyn ExportRepository) -> Result<u64, HandlerError> {
        Ok(repository.count(&self.collection)?)
    }
}
