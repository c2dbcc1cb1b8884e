use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed file names inside every package directory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackageLayout {
    /// Package descriptor (XML)
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
    /// Zip archive holding the data store
    #[serde(default = "default_archive_name")]
    pub archive_name: String,
    /// Unpacked data store, also the name of the single archive entry
    #[serde(default = "default_db_name")]
    pub db_name: String,
}

impl PackageLayout {
    pub fn manifest_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.manifest_name)
    }

    pub fn archive_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.archive_name)
    }

    pub fn db_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.db_name)
    }
}

impl Default for PackageLayout {
    fn default() -> Self {
        Self {
            manifest_name: default_manifest_name(),
            archive_name: default_archive_name(),
            db_name: default_db_name(),
        }
    }
}

fn default_manifest_name() -> String {
    "export_manifest.xml".to_string()
}

fn default_archive_name() -> String {
    "export_db.zip".to_string()
}

fn default_db_name() -> String {
    "export.db".to_string()
}
