use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

use super::layout::PackageLayout;

/// Check whether `dir` looks like an export package
///
/// Both the manifest and the compressed data store must exist as regular
/// files. Nothing is opened or parsed, and any I/O problem counts as "not a
/// package".
pub fn is_valid_import_folder(dir: &Path, layout: &PackageLayout) -> bool {
    layout.manifest_path(dir).is_file() && layout.archive_path(dir).is_file()
}

/// List the immediate subdirectories of `root` that are valid packages
///
/// The result is sorted by path. A missing or unreadable root yields an
/// empty list; unreadable entries are skipped one by one.
pub fn candidate_folders(root: &Path, layout: &PackageLayout) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(root = %root.display(), error = %err, "Export root is not readable");
            return Vec::new();
        }
    };

    let mut folders: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(err) => {
                debug!(root = %root.display(), error = %err, "Skipping unreadable entry");
                None
            }
        })
        .filter(|path| path.is_dir())
        .filter(|path| {
            let valid = is_valid_import_folder(path, layout);
            if !valid {
                debug!(path = %path.display(), "Not an import package");
            }
            valid
        })
        .collect();

    folders.sort();
    folders
}

/// Map a package id onto its directory below `root`
///
/// Only ids that form a single plain path component are accepted, so an id
/// can never address anything outside the export root.
pub fn resolve_package_dir(root: &Path, package_id: &str) -> Option<PathBuf> {
    let mut components = Path::new(package_id).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == package_id => Some(root.join(name)),
        _ => None,
    }
}
