use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::handlers::categories;
use crate::package::PackageLayout;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default = "default_handlers")]
    pub handlers: Vec<HandlerConfig>,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export: ExportConfig::default(),
            queue: QueueConfig::default(),
            handlers: default_handlers(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Where packages live and how they are laid out
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Directory holding one subdirectory per package
    #[serde(default = "default_export_root")]
    pub root: PathBuf,
    /// Upper bound on the unpacked data store size
    #[serde(default = "default_max_unpacked_bytes")]
    pub max_unpacked_bytes: u64,
    #[serde(default)]
    pub layout: PackageLayout,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            root: default_export_root(),
            max_unpacked_bytes: default_max_unpacked_bytes(),
            layout: PackageLayout::default(),
        }
    }
}

fn default_export_root() -> PathBuf {
    PathBuf::from("data/exports")
}

fn default_max_unpacked_bytes() -> u64 {
    4 * 1024 * 1024 * 1024 // 4 GB
}

/// Import job queue location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueConfig {
    #[serde(default = "default_queue_path")]
    pub path: PathBuf,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            path: default_queue_path(),
        }
    }
}

fn default_queue_path() -> PathBuf {
    PathBuf::from("data/jobs")
}

/// One `[[handlers]]` entry: a category counted from a collection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HandlerConfig {
    /// Category label, e.g. "Pages"
    pub category: String,
    /// Collection holding the category's documents (defaults to the
    /// snake_case category label)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl HandlerConfig {
    pub fn collection_name(&self) -> String {
        self.collection
            .clone()
            .unwrap_or_else(|| categories::default_collection(&self.category))
    }
}

fn default_enabled() -> bool {
    true
}

fn default_handlers() -> Vec<HandlerConfig> {
    categories::BUILT_IN
        .iter()
        .map(|category| HandlerConfig {
            category: category.to_string(),
            collection: None,
            enabled: true,
        })
        .collect()
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Default tracing filter; `RUST_LOG` takes precedence
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            ansi: default_ansi(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_ansi() -> bool {
    true
}
