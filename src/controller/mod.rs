//! Import controller
//!
//! Entry point for callers: lists the packages available under the export
//! root, verifies a package (optionally producing an import summary) and
//! queues import jobs.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::handlers::{HandlerRegistry, RegistryError};
use crate::observability::Metrics;
use crate::package::{self, ManifestError, PackageInfo, PackageLayout, UnpackError};
use crate::queue::{
    AuditEvent, ImportRequest, JobQueue, JobType, LOG_TYPE_SITE_IMPORT, NewJob, QueueError,
};
use crate::store::{ExportDb, StoreError};
use crate::summary::{self, ImportExportSummary, SummaryError};

/// Prefix of every verification failure message
pub const INVALID_PACKAGE_MARKER: &str = "Package is not valid. Technical Details:";

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to read manifest in {dir}: {source}")]
    Manifest {
        dir: PathBuf,
        #[source]
        source: ManifestError,
    },

    #[error("failed to serialize import request: {0}")]
    Request(#[from] serde_json::Error),

    #[error("job queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("handler registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("no job queue configured")]
    QueueUnavailable,
}

/// Failures that make a package invalid
#[derive(Debug, Error)]
enum VerifyError {
    #[error(transparent)]
    Unpack(#[from] UnpackError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Summary(#[from] SummaryError),
}

/// Outcome of [`ImportController::verify_package`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub is_valid: bool,
    /// Empty unless the package failed after its folder was accepted
    pub error_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ImportExportSummary>,
}

impl Verification {
    fn not_a_package() -> Self {
        Self::default()
    }

    fn invalid(details: impl std::fmt::Display) -> Self {
        Self {
            is_valid: false,
            error_message: format!("{INVALID_PACKAGE_MARKER}{details}"),
            summary: None,
        }
    }
}

pub struct ImportController {
    export_root: PathBuf,
    layout: PackageLayout,
    max_unpacked_bytes: u64,
    registry: Arc<HandlerRegistry>,
    queue: Option<Arc<dyn JobQueue>>,
    metrics: Arc<Metrics>,
}

impl ImportController {
    pub fn new(
        export_root: impl Into<PathBuf>,
        layout: PackageLayout,
        max_unpacked_bytes: u64,
        registry: Arc<HandlerRegistry>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            export_root: export_root.into(),
            layout,
            max_unpacked_bytes,
            registry,
            queue: None,
            metrics,
        }
    }

    /// Attach the queue used by [`queue_operation`](Self::queue_operation)
    ///
    /// Listing and verifying never need one.
    pub fn with_queue(mut self, queue: Arc<dyn JobQueue>) -> Self {
        self.queue = Some(queue);
        self
    }

    /// Build a controller from loaded configuration
    pub fn from_config(config: &Config, metrics: Arc<Metrics>) -> Result<Self, ControllerError> {
        let registry = config.handler_registry()?;
        info!(
            export_root = %config.export.root.display(),
            handlers = registry.len(),
            "Import controller configured"
        );
        Ok(Self::new(
            config.export.root.clone(),
            config.export.layout.clone(),
            config.export.max_unpacked_bytes,
            Arc::new(registry),
            metrics,
        ))
    }

    pub fn export_root(&self) -> &Path {
        &self.export_root
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Describe every valid package under the export root
    ///
    /// A manifest field that is missing falls back to the folder name.
    pub fn list_packages(&self) -> Result<Vec<PackageInfo>, ControllerError> {
        let folders = package::candidate_folders(&self.export_root, &self.layout);

        let mut packages = Vec::with_capacity(folders.len());
        for dir in folders {
            let fallback = dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let manifest = self.layout.manifest_path(&dir);
            let info = package::parse_manifest(&manifest, &fallback)
                .map_err(|source| ControllerError::Manifest { dir, source })?;
            packages.push(info);
        }

        self.metrics.packages_listed(packages.len() as u64);
        debug!(count = packages.len(), "Listed import packages");
        Ok(packages)
    }

    /// Check that a package can be imported
    ///
    /// An id that does not name a package folder yields an invalid result
    /// with an empty message, without touching the archive. Any failure
    /// after that point is reported in `error_message`, never returned.
    pub fn verify_package(&self, package_id: &str, with_summary: bool) -> Verification {
        let Some(dir) = package::resolve_package_dir(&self.export_root, package_id)
            .filter(|dir| package::is_valid_import_folder(dir, &self.layout))
        else {
            debug!(%package_id, "Not an import package");
            self.metrics.package_rejected();
            return Verification::not_a_package();
        };

        match self.open_and_summarize(&dir, with_summary) {
            Ok(summary) => {
                info!(%package_id, with_summary, "Package verified");
                self.metrics.package_verified();
                Verification {
                    is_valid: true,
                    error_message: String::new(),
                    summary,
                }
            }
            Err(err) => {
                warn!(%package_id, error = %err, "Package failed verification");
                self.metrics.package_rejected();
                Verification::invalid(err)
            }
        }
    }

    fn open_and_summarize(
        &self,
        dir: &Path,
        with_summary: bool,
    ) -> Result<Option<ImportExportSummary>, VerifyError> {
        let db_path = package::ensure_unpacked(dir, &self.layout, self.max_unpacked_bytes)?;
        let db = ExportDb::open(&db_path)?;

        // The handle is dropped on the error path before returning.
        let summary = if with_summary {
            Some(summary::build_import_summary(&db, self.registry.discover())?)
        } else {
            None
        };

        db.close()?;
        Ok(summary)
    }

    /// Queue an import job and record it in the audit trail
    pub fn queue_operation(
        &self,
        user_id: i32,
        request: &ImportRequest,
    ) -> Result<u64, ControllerError> {
        let queue = self.queue.as_ref().ok_or(ControllerError::QueueUnavailable)?;
        let job_object = serde_json::to_string(request)?;
        let job_id = queue.add_job(NewJob {
            portal_id: request.portal_id,
            user_id,
            job_type: JobType::Import,
            package_id: request.package_id.clone(),
            job_object,
        })?;

        queue.log_event(AuditEvent {
            job_id,
            portal_id: request.portal_id,
            user_id,
            log_type: LOG_TYPE_SITE_IMPORT.to_string(),
            created_at: Utc::now(),
        })?;
        info!(
            target: "audit",
            job_id,
            portal_id = request.portal_id,
            user_id,
            log_type = LOG_TYPE_SITE_IMPORT,
            "Import job queued"
        );

        self.metrics.job_queued();
        Ok(job_id)
    }
}
