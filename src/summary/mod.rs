//! Import summary for a verified package
//!
//! Runs every discovered handler against the opened data store and
//! combines their totals with the export metadata into one report.

use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::debug;

use crate::handlers::{HandlerError, PortableService, categories, panic_message};
use crate::store::{ExportMetadata, ExportRepository, RepositoryExt, StoreError};

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("export metadata unavailable: {0}")]
    Metadata(#[source] StoreError),

    #[error("handler for '{category}' failed: {source}")]
    Handler {
        category: String,
        #[source]
        source: HandlerError,
    },
}

/// One row of the report, produced by one handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItem {
    pub category: String,
    pub total_items: u64,
    /// Whether the original export asked for this category
    pub show_item: bool,
}

/// Per-category accounting of what an import would process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportExportSummary {
    pub summary_items: Vec<SummaryItem>,
    pub include_deletions: bool,
    pub include_profile_properties: bool,
    // Not derived from the export metadata yet; always false.
    pub include_permissions: bool,
    pub include_extensions: bool,
}

impl ImportExportSummary {
    pub fn item(&self, category: &str) -> Option<&SummaryItem> {
        self.summary_items.iter().find(|item| item.category == category)
    }
}

/// Build the report for an opened data store
///
/// Items follow the order of `handlers`. `include_profile_properties` is
/// taken from the export list, not from any handler's item.
pub fn build_import_summary(
    repository: &dyn ExportRepository,
    handlers: Vec<Box<dyn PortableService>>,
) -> Result<ImportExportSummary, SummaryError> {
    let metadata: ExportMetadata = repository
        .get_single_item()
        .map_err(SummaryError::Metadata)?;

    let mut summary_items = Vec::with_capacity(handlers.len());
    for handler in handlers {
        let category = handler.category().to_string();
        let total_items = import_total(handler.as_ref(), repository).map_err(|source| {
            SummaryError::Handler {
                category: category.clone(),
                source,
            }
        })?;
        let show_item = metadata.exports(&category);

        debug!(%category, total_items, show_item, "Summarized category");
        summary_items.push(SummaryItem {
            category,
            total_items,
            show_item,
        });
    }

    Ok(ImportExportSummary {
        summary_items,
        include_deletions: metadata.include_deletions,
        include_profile_properties: metadata.exports(categories::PROFILE_PROPERTIES),
        ..Default::default()
    })
}

/// Run one handler, turning a panic into a handler error
fn import_total(
    handler: &dyn PortableService,
    repository: &dyn ExportRepository,
) -> Result<u64, HandlerError> {
    panic::catch_unwind(AssertUnwindSafe(|| handler.import_total(repository)))
        .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_message(&*payload))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{CollectionCountHandler, HandlerRegistry};
    use crate::store::{MemoryRepository, StoreRecord};
    use serde_json::json;

    fn repo_with_metadata(metadata: serde_json::Value) -> MemoryRepository {
        let mut repo = MemoryRepository::new();
        repo.insert(ExportMetadata::COLLECTION, metadata);
        repo
    }

    fn handlers(categories: &[(&str, &str)]) -> Vec<Box<dyn PortableService>> {
        categories
            .iter()
            .map(|(category, collection)| {
                Box::new(CollectionCountHandler::new(*category, *collection)) as Box<dyn PortableService>
            })
            .collect()
    }

    struct FailingHandler;

    impl PortableService for FailingHandler {
        fn category(&self) -> &str {
            "Broken"
        }

        fn import_total(&self, _repository: &dyn ExportRepository) -> Result<u64, HandlerError> {
            Err(HandlerError::Total("index missing".to_string()))
        }
    }

    #[test]
    fn test_show_item_follows_export_list() {
        let mut repo = repo_with_metadata(json!({
            "itemsToExport": ["Pages", "Users"],
            "includeDeletions": false
        }));
        repo.insert("pages", json!({}));
        repo.insert("pages", json!({}));
        repo.insert("users", json!({}));
        repo.insert("profile_properties", json!({}));

        let summary = build_import_summary(
            &repo,
            handlers(&[
                ("Pages", "pages"),
                ("Users", "users"),
                ("ProfileProperties", "profile_properties"),
            ]),
        )
        .unwrap();

        assert_eq!(summary.summary_items.len(), 3);
        assert_eq!(
            summary.item("Pages"),
            Some(&SummaryItem {
                category: "Pages".to_string(),
                total_items: 2,
                show_item: true,
            })
        );
        assert!(summary.item("Users").unwrap().show_item);
        let profile = summary.item("ProfileProperties").unwrap();
        assert!(!profile.show_item);
        assert_eq!(profile.total_items, 1);
        assert!(!summary.include_profile_properties);
    }

    #[test]
    fn test_include_profile_properties_ignores_handlers() {
        let repo = repo_with_metadata(json!({
            "itemsToExport": ["ProfileProperties"]
        }));

        // No handler for the category at all
        let summary = build_import_summary(&repo, handlers(&[("Pages", "pages")])).unwrap();

        assert!(summary.include_profile_properties);
        assert!(summary.item("ProfileProperties").is_none());
        assert!(!summary.item("Pages").unwrap().show_item);
    }

    #[test]
    fn test_flags_copied_and_gaps_left_false() {
        let repo = repo_with_metadata(json!({
            "itemsToExport": [],
            "includeDeletions": true,
            "includePermissions": true,
            "includeExtensions": true
        }));

        let summary = build_import_summary(&repo, Vec::new()).unwrap();

        assert!(summary.include_deletions);
        assert!(!summary.include_permissions);
        assert!(!summary.include_extensions);
        assert!(summary.summary_items.is_empty());
    }

    #[test]
    fn test_items_follow_handler_order() {
        let repo = repo_with_metadata(json!({ "itemsToExport": [] }));

        let summary =
            build_import_summary(&repo, handlers(&[("Users", "users"), ("Assets", "assets")])).unwrap();
        let order: Vec<_> = summary.summary_items.iter().map(|i| i.category.as_str()).collect();

        assert_eq!(order, vec!["Users", "Assets"]);
    }

    #[test]
    fn test_one_item_per_registered_handler() {
        let repo = repo_with_metadata(json!({ "itemsToExport": ["Pages"] }));
        let registry = HandlerRegistry::with_defaults();

        let summary = build_import_summary(&repo, registry.discover()).unwrap();

        let categories: Vec<_> = summary.summary_items.iter().map(|i| i.category.as_str()).collect();
        assert_eq!(categories, registry.categories().collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_metadata_is_error() {
        let repo = MemoryRepository::new();
        let err = build_import_summary(&repo, handlers(&[("Pages", "pages")])).unwrap_err();

        assert!(matches!(
            err,
            SummaryError::Metadata(StoreError::NotSingle { count: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_metadata_is_error() {
        let mut repo = repo_with_metadata(json!({}));
        repo.insert(ExportMetadata::COLLECTION, json!({}));

        let err = build_import_summary(&repo, Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            SummaryError::Metadata(StoreError::NotSingle { count: 2, .. })
        ));
    }

    struct PanickingHandler;

    impl PortableService for PanickingHandler {
        fn category(&self) -> &str {
            "Panicking"
        }

        fn import_total(&self, _repository: &dyn ExportRepository) -> Result<u64, HandlerError> {
            panic!("index out of range in import_total")
        }
    }

    #[test]
    fn test_handler_panic_is_reported_as_error() {
        let repo = repo_with_metadata(json!({}));
        let handlers: Vec<Box<dyn PortableService>> =
            vec![Box::new(CollectionCountHandler::new("Pages", "pages")), Box::new(PanickingHandler)];

        let err = build_import_summary(&repo, handlers).unwrap_err();

        match err {
            SummaryError::Handler {
                category,
                source: HandlerError::Panicked(message),
            } => {
                assert_eq!(category, "Panicking");
                assert!(message.contains("index out of range"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_handler_failure_is_reported_with_category() {
        let repo = repo_with_metadata(json!({}));
        let err = build_import_summary(&repo, vec![Box::new(FailingHandler) as Box<dyn PortableService>]).unwrap_err();

        match err {
            SummaryError::Handler { category, .. } => assert_eq!(category, "Broken"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
