//! Content-category handlers
//!
//! Every category of importable content (pages, users, profile
//! properties, ...) is covered by a [`PortableService`]. The import
//! pipeline never names concrete handlers: it asks the
//! [`HandlerRegistry`] for a fresh set and queries each one against the
//! opened data store.
//!
//! ## Example
//!
//! ```rust,ignore
//! use sitepack::handlers::HandlerRegistry;
//!
//! let mut registry = HandlerRegistry::with_defaults();
//! registry.register_default::<MyHandler>("Extensions")?;
//!
//! for handler in registry.discover() {
//!     println!("{}: {}", handler.category(), handler.import_total(&db)?);
//! }
//! ```

pub mod categories;
mod collection;
mod registry;
mod traits;

pub use collection::CollectionCountHandler;
pub use registry::{HandlerFactory, HandlerRegistry, RegistryError};
pub use traits::{HandlerError, PortableService};
pub(crate) use traits::panic_message;
