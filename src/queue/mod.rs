pub mod models;
pub mod store;

pub use models::{
    AuditEvent, CollisionResolution, ImportJob, ImportRequest, JobStatus, JobType,
    LOG_TYPE_SITE_IMPORT, NewJob,
};
pub use store::{FjallJobQueue, JobQueue, QueueError};
