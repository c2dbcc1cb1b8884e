use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit log type recorded when an import is queued
pub const LOG_TYPE_SITE_IMPORT: &str = "SITE_IMPORT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Export,
    Import,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Submitted,
    InProgress,
    Successful,
    Failed,
    Cancelled,
}

/// What to do when imported content already exists on the target site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionResolution {
    #[default]
    Ignore,
    Overwrite,
}

/// Caller request to import a package into a portal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub portal_id: i32,
    pub package_id: String,
    #[serde(default)]
    pub collision_resolution: CollisionResolution,
    #[serde(default)]
    pub run_now: bool,
}

/// Job as handed to the queue, before it has an id
#[derive(Debug, Clone)]
pub struct NewJob {
    pub portal_id: i32,
    pub user_id: i32,
    pub job_type: JobType,
    pub package_id: String,
    /// Serialized request the job worker will act on
    pub job_object: String,
}

/// Persisted job record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportJob {
    pub job_id: u64,
    pub portal_id: i32,
    pub user_id: i32,
    pub job_type: JobType,
    pub package_id: String,
    pub job_object: String,
    pub status: JobStatus,
    pub trace_id: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}

/// Audit trail entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub job_id: u64,
    pub portal_id: i32,
    pub user_id: i32,
    pub log_type: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
}
