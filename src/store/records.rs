use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A document type stored in a well-known collection
pub trait StoreRecord: DeserializeOwned {
    const COLLECTION: &'static str;
}

/// What the original export contained
///
/// Written once by the exporter; every package holds exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportMetadata {
    pub portal_id: i32,
    pub export_name: String,
    pub export_description: String,
    /// Category labels the export was asked to include
    pub items_to_export: Vec<String>,
    pub include_deletions: bool,
    pub include_permissions: bool,
    pub include_extensions: bool,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

impl ExportMetadata {
    /// Whether `category` was requested by the export
    pub fn exports(&self, category: &str) -> bool {
        self.items_to_export.iter().any(|item| item == category)
    }
}

impl StoreRecord for ExportMetadata {
    const COLLECTION: &'static str = "export_metadata";
}
