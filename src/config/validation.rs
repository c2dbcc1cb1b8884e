use super::models::Config;
use crate::package::PackageLayout;
use std::collections::HashSet;
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Layout name '{field}' must be a plain file name, got '{value}'")]
    InvalidLayoutName { field: &'static str, value: String },

    #[error("Layout names must be distinct, '{name}' is used twice")]
    DuplicateLayoutName { name: String },

    #[error("max_unpacked_bytes must be positive")]
    InvalidUnpackLimit,

    #[error("Handler category must not be empty")]
    EmptyCategory,

    #[error("Handler category '{category}' is configured more than once")]
    DuplicateCategory { category: String },

    #[error("Handler '{category}' has an empty collection name")]
    EmptyCollection { category: String },

    #[error("No handlers enabled (at least one category handler is required)")]
    NoHandlersEnabled,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_layout(&config.export.layout)?;
    validate_export(config)?;
    validate_handlers(config)?;
    Ok(())
}

/// Layout names are joined onto package directories, so they must not
/// escape them or alias each other
fn validate_layout(layout: &PackageLayout) -> Result<(), ValidationError> {
    let fields = [
        ("manifest_name", &layout.manifest_name),
        ("archive_name", &layout.archive_name),
        ("db_name", &layout.db_name),
    ];

    let mut seen = HashSet::new();
    for (field, value) in fields {
        if !is_plain_file_name(value) {
            return Err(ValidationError::InvalidLayoutName {
                field,
                value: value.clone(),
            });
        }
        if !seen.insert(value.as_str()) {
            return Err(ValidationError::DuplicateLayoutName {
                name: value.clone(),
            });
        }
    }

    Ok(())
}

fn validate_export(config: &Config) -> Result<(), ValidationError> {
    if config.export.max_unpacked_bytes == 0 {
        return Err(ValidationError::InvalidUnpackLimit);
    }
    Ok(())
}

/// Categories are unique, collections non-empty, and something is enabled
fn validate_handlers(config: &Config) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for handler in &config.handlers {
        if handler.category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if !seen.insert(handler.category.as_str()) {
            return Err(ValidationError::DuplicateCategory {
                category: handler.category.clone(),
            });
        }
        if handler
            .collection
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            return Err(ValidationError::EmptyCollection {
                category: handler.category.clone(),
            });
        }
    }

    if !config.handlers.iter().any(|h| h.enabled) {
        return Err(ValidationError::NoHandlersEnabled);
    }

    Ok(())
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(n)), None) if n == name
    )
}
