//! Export package handling
//!
//! A package is a directory produced by a site export. It carries a
//! manifest describing the package and a zip archive holding the exported
//! data store. This module knows how to:
//!
//! - find structurally valid package directories ([`locator`])
//! - read package identity from the manifest ([`manifest`])
//! - unpack the data store next to the archive ([`archive`])
//!
//! All three are synchronous and only touch the package directory they are
//! given.

pub mod archive;
mod layout;
pub mod locator;
pub mod manifest;

pub use archive::{UnpackError, ensure_unpacked};
pub use layout::PackageLayout;
pub use locator::{candidate_folders, is_valid_import_folder, resolve_package_dir};
pub use manifest::{ManifestError, PackageInfo, parse_manifest, parse_manifest_str};
