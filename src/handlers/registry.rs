use std::collections::BTreeMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use super::categories;
use super::collection::CollectionCountHandler;
use super::traits::{HandlerError, PortableService, panic_message};
use crate::config::HandlerConfig;

/// Builds a fresh handler instance
pub type HandlerFactory =
    Arc<dyn Fn() -> Result<Box<dyn PortableService>, HandlerError> + Send + Sync>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("category already registered: {0}")]
    DuplicateCategory(String),
}

#[derive(Clone)]
struct Registration {
    type_name: String,
    factory: HandlerFactory,
}

impl Registration {
    fn collection_count(category: &str, collection: String) -> Self {
        let category = category.to_string();
        Self {
            type_name: std::any::type_name::<CollectionCountHandler>().to_string(),
            factory: Arc::new(move || -> Result<Box<dyn PortableService>, HandlerError> {
                Ok(Box::new(CollectionCountHandler::new(
                    category.clone(),
                    collection.clone(),
                )))
            }),
        }
    }
}

/// Registry mapping category labels to handler factories
///
/// Populated once by the composition root. Every call to [`discover`]
/// builds a new set of handlers; instances are never shared between calls.
///
/// [`discover`]: HandlerRegistry::discover
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    entries: BTreeMap<String, Registration>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for `category`
    ///
    /// `type_name` identifies the implementation in logs when the factory
    /// fails.
    pub fn register<F>(
        &mut self,
        category: impl Into<String>,
        type_name: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn() -> Result<Box<dyn PortableService>, HandlerError> + Send + Sync + 'static,
    {
        let category = category.into();
        if self.entries.contains_key(&category) {
            return Err(RegistryError::DuplicateCategory(category));
        }

        let type_name = type_name.into();
        debug!(%category, %type_name, "Registered portable service");
        self.entries.insert(
            category,
            Registration {
                type_name,
                factory: Arc::new(factory),
            },
        );
        Ok(())
    }

    /// Register a handler type built with `Default`
    pub fn register_default<H>(&mut self, category: impl Into<String>) -> Result<(), RegistryError>
    where
        H: PortableService + Default + 'static,
    {
        self.register(category, std::any::type_name::<H>(), || {
            Ok(Box::new(H::default()) as Box<dyn PortableService>)
        })
    }

    /// Build a registry from `[[handlers]]` configuration
    ///
    /// Disabled entries are left out.
    pub fn from_config(handlers: &[HandlerConfig]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for config in handlers.iter().filter(|h| h.enabled) {
            if registry.contains(&config.category) {
                return Err(RegistryError::DuplicateCategory(config.category.clone()));
            }
            registry.entries.insert(
                config.category.clone(),
                Registration::collection_count(&config.category, config.collection_name()),
            );
        }
        Ok(registry)
    }

    /// Registry with a collection-count handler for every built-in category
    pub fn with_defaults() -> Self {
        let entries = categories::BUILT_IN
            .iter()
            .map(|&category| {
                let registration =
                    Registration::collection_count(category, categories::default_collection(category));
                (category.to_string(), registration)
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.entries.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Instantiate every registered handler
    ///
    /// Each factory runs in isolation: a factory that returns an error or
    /// panics, or that builds a handler for a different category, is logged
    /// and skipped. The remaining handlers are returned in category order.
    pub fn discover(&self) -> Vec<Box<dyn PortableService>> {
        let mut handlers = Vec::with_capacity(self.entries.len());

        for (category, registration) in &self.entries {
            let type_name = registration.type_name.as_str();
            match panic::catch_unwind(AssertUnwindSafe(|| (registration.factory)())) {
                Ok(Ok(handler)) if handler.category() == category.as_str() => handlers.push(handler),
                Ok(Ok(handler)) => {
                    error!(
                        %type_name,
                        registered = %category,
                        reported = %handler.category(),
                        "Unable to use {} while collecting portable services: category mismatch",
                        type_name
                    );
                }
                Ok(Err(err)) => {
                    error!(
                        %type_name,
                        %category,
                        error = %err,
                        "Unable to create {} while collecting portable services",
                        type_name
                    );
                }
                Err(payload) => {
                    error!(
                        %type_name,
                        %category,
                        panic = %panic_message(&*payload),
                        "Unable to create {} while collecting portable services: constructor panicked",
                        type_name
                    );
                }
            }
        }

        debug!(
            registered = self.entries.len(),
            created = handlers.len(),
            "Collected portable services"
        );
        handlers
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(category, reg)| (category, &reg.type_name)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ExportRepository, MemoryRepository};

    #[derive(Default)]
    struct PagesHandler;

    impl PortableService for PagesHandler {
        fn category(&self) -> &str {
            "Pages"
        }

        fn import_total(&self, _repository: &dyn ExportRepository) -> Result<u64, HandlerError> {
            Ok(3)
        }
    }

    fn failing_factory() -> Result<Box<dyn PortableService>, HandlerError> {
        Err(HandlerError::Construction("missing dependency".to_string()))
    }

    #[test]
    fn test_register_default_and_discover() {
        let mut registry = HandlerRegistry::new();
        registry.register_default::<PagesHandler>("Pages").unwrap();

        let handlers = registry.discover();
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].category(), "Pages");
        assert_eq!(handlers[0].import_total(&MemoryRepository::new()).unwrap(), 3);
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let mut registry = HandlerRegistry::new();
        registry.register_default::<PagesHandler>("Pages").unwrap();

        let err = registry.register_default::<PagesHandler>("Pages").unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCategory(ref c) if c == "Pages"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failing_factories_are_skipped() {
        let mut registry = HandlerRegistry::new();
        registry.register_default::<PagesHandler>("Pages").unwrap();
        registry.register("Users", "tests::BrokenUsers", failing_factory).unwrap();
        registry
            .register("Roles", "tests::PanickingRoles", || -> Result<Box<dyn PortableService>, HandlerError> {
                panic!("constructor exploded")
            })
            .unwrap();
        registry
            .register("Assets", "tests::Assets", || {
                Ok(Box::new(CollectionCountHandler::new("Assets", "assets")) as Box<dyn PortableService>)
            })
            .unwrap();

        let handlers = registry.discover();
        let categories: Vec<_> = handlers.iter().map(|h| h.category().to_string()).collect();

        // 4 registered, 2 broken
        assert_eq!(handlers.len(), 2);
        assert_eq!(categories, vec!["Assets", "Pages"]);
    }

    #[test]
    fn test_category_mismatch_is_skipped() {
        let mut registry = HandlerRegistry::new();
        registry.register_default::<PagesHandler>("Users").unwrap();

        assert!(registry.discover().is_empty());
    }

    #[test]
    fn test_discover_builds_fresh_instances_each_call() {
        let registry = HandlerRegistry::with_defaults();

        let first = registry.discover();
        let second = registry.discover();

        assert_eq!(first.len(), categories::BUILT_IN.len());
        assert_eq!(second.len(), first.len());
    }

    #[test]
    fn test_with_defaults_covers_built_in_categories() {
        let registry = HandlerRegistry::with_defaults();
        assert_eq!(registry.categories().collect::<Vec<_>>(), {
            let mut expected = categories::BUILT_IN.to_vec();
            expected.sort();
            expected
        });

        let mut repo = MemoryRepository::new();
        repo.insert("profile_properties", serde_json::json!({}));

        let profile = registry
            .discover()
            .into_iter()
            .find(|h| h.category() == categories::PROFILE_PROPERTIES)
            .unwrap();
        assert_eq!(profile.import_total(&repo).unwrap(), 1);
    }

    #[test]
    fn test_from_config_skips_disabled_and_maps_collections() {
        let handlers = vec![
            HandlerConfig {
                category: "Pages".to_string(),
                collection: Some("tabs".to_string()),
                enabled: true,
            },
            HandlerConfig {
                category: "Users".to_string(),
                collection: None,
                enabled: false,
            },
            HandlerConfig {
                category: "ProfileProperties".to_string(),
                collection: None,
                enabled: true,
            },
        ];

        let registry = HandlerRegistry::from_config(&handlers).unwrap();
        assert_eq!(
            registry.categories().collect::<Vec<_>>(),
            vec!["Pages", "ProfileProperties"]
        );

        let mut repo = MemoryRepository::new();
        repo.insert("tabs", serde_json::json!({}));
        repo.insert("profile_properties", serde_json::json!({}));
        repo.insert("profile_properties", serde_json::json!({}));

        let totals: Vec<u64> = registry
            .discover()
            .iter()
            .map(|h| h.import_total(&repo).unwrap())
            .collect();
        assert_eq!(totals, vec![1, 2]);
    }

    #[test]
    fn test_from_config_rejects_duplicates() {
        let entry = HandlerConfig {
            category: "Pages".to_string(),
            collection: None,
            enabled: true,
        };

        let result = HandlerRegistry::from_config(&[entry.clone(), entry]);
        assert!(matches!(result, Err(RegistryError::DuplicateCategory(_))));
    }
}
