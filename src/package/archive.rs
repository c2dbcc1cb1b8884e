use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use zip::ZipArchive;
use zip::result::ZipError;

use super::layout::PackageLayout;

#[derive(Debug, Error)]
pub enum UnpackError {
    #[error("archive not found: {0}")]
    MissingArchive(PathBuf),

    #[error("archive {archive} has no entry named '{entry}'")]
    MissingEntry { archive: PathBuf, entry: String },

    #[error("failed to read archive {archive}: {source}")]
    Zip {
        archive: PathBuf,
        #[source]
        source: ZipError,
    },

    #[error("entry '{entry}' exceeds the unpack limit of {limit} bytes")]
    TooLarge { entry: String, limit: u64 },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Make sure the package's data store exists unpacked, returning its path
///
/// When the store is already present this is a no-op and the archive is
/// not opened. Otherwise only the store entry is extracted. The entry is
/// written to a temporary file in the package directory and renamed into
/// place, so a reader never observes a partially written store and two
/// concurrent first-time unpacks cannot interleave their writes.
pub fn ensure_unpacked(
    dir: &Path,
    layout: &PackageLayout,
    max_bytes: u64,
) -> Result<PathBuf, UnpackError> {
    let db_path = layout.db_path(dir);
    if db_path.is_file() {
        debug!(path = %db_path.display(), "Data store already unpacked");
        return Ok(db_path);
    }

    let archive_path = layout.archive_path(dir);
    if !archive_path.is_file() {
        return Err(UnpackError::MissingArchive(archive_path));
    }

    let file = File::open(&archive_path).map_err(|source| UnpackError::Io {
        path: archive_path.clone(),
        source,
    })?;
    let zip_err = |source| UnpackError::Zip {
        archive: archive_path.clone(),
        source,
    };
    let mut archive = ZipArchive::new(file).map_err(zip_err)?;
    let mut entry = match archive.by_name(&layout.db_name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(UnpackError::MissingEntry {
                archive: archive_path.clone(),
                entry: layout.db_name.clone(),
            });
        }
        Err(source) => return Err(zip_err(source)),
    };

    let too_large = || UnpackError::TooLarge {
        entry: layout.db_name.clone(),
        limit: max_bytes,
    };
    if entry.size() > max_bytes {
        return Err(too_large());
    }

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| UnpackError::Io { path, source }
    };

    let mut staged = tempfile::Builder::new()
        .prefix(".unpack-")
        .tempfile_in(dir)
        .map_err(io_err(dir))?;

    // Declared sizes can lie; cap what is actually inflated.
    let copied = io::copy(
        &mut (&mut entry).take(max_bytes.saturating_add(1)),
        staged.as_file_mut(),
    )
    .map_err(io_err(staged.path()))?;
    if copied > max_bytes {
        return Err(too_large());
    }
    staged.as_file().sync_all().map_err(io_err(staged.path()))?;

    match staged.persist_noclobber(&db_path) {
        Ok(_) => {
            info!(path = %db_path.display(), bytes = copied, "Unpacked data store");
        }
        Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
            debug!(path = %db_path.display(), "Data store unpacked concurrently, keeping existing");
        }
        Err(err) => return Err(io_err(&db_path)(err.error)),
    }

    Ok(db_path)
}
