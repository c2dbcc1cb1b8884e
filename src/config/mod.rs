//! Configuration management for sitepack
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use sitepack::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Exports live in: {}", config.export.root.display());
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `SITEPACK__<section>__<key>`
//!
//! Examples:
//! - `SITEPACK__EXPORT__ROOT=/srv/exports`
//! - `SITEPACK__QUEUE__PATH=/var/lib/sitepack/jobs`
//! - `SITEPACK__TELEMETRY__LOG_FILTER=sitepack=debug`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/sitepack.toml`.
//! This can be overridden using the `SITEPACK_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

// Re-export public types
pub use models::{Config, ExportConfig, HandlerConfig, QueueConfig, TelemetryConfig};
pub use sources::default_path;
pub use validation::ValidationError;

use crate::handlers::{HandlerRegistry, RegistryError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`SITEPACK__*`)
    /// 2. TOML file (default: `config/sitepack.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (bad layout names, duplicate categories, etc.)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Build the handler registry for the configured categories
    pub fn handler_registry(&self) -> Result<HandlerRegistry, RegistryError> {
        HandlerRegistry::from_config(&self.handlers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[[handlers]]
category = "Pages"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.handlers.len(), 1);
        assert_eq!(config.export.layout.db_name, "export.db");
    }

    #[test]
    fn test_validation_catches_duplicate_category() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[[handlers]]
category = "Pages"

[[handlers]]
category = "Pages"
collection = "tabs"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::DuplicateCategory { .. })
        ));
    }

    #[test]
    fn test_handler_registry_skips_disabled() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[[handlers]]
category = "Pages"

[[handlers]]
category = "Users"
enabled = false

[[handlers]]
category = "Roles"
collection = "security_roles"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        let registry = config.handler_registry().unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("Pages"));
        assert!(registry.contains("Roles"));
        assert!(!registry.contains("Users"));
    }

    #[test]
    fn test_full_config_example() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[export]
root = "/srv/dnn/App_Data/ExportImport"
max_unpacked_bytes = 536870912

[export.layout]
manifest_name = "export_manifest.xml"
archive_name = "export_db.zip"
db_name = "export.db"

[queue]
path = "/var/lib/sitepack/jobs"

[[handlers]]
category = "Pages"

[[handlers]]
category = "Users"

[[handlers]]
category = "ProfileProperties"

[telemetry]
log_filter = "info,sitepack::controller=debug"
ansi = false
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();

        assert_eq!(config.export.max_unpacked_bytes, 512 * 1024 * 1024);
        assert_eq!(config.handlers.len(), 3);
        assert_eq!(config.handlers[2].collection_name(), "profile_properties");
        assert!(!config.telemetry.ansi);

        let registry = config.handler_registry().unwrap();
        let categories: Vec<&str> = registry.categories().collect();
        assert_eq!(categories, vec!["Pages", "ProfileProperties", "Users"]);
    }
}
