use chrono::Utc;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{AuditEvent, ImportJob, JobStatus, NewJob};

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, QueueError>;

const NEXT_JOB_SEQ: &[u8] = b"next_seq";
const NEXT_EVENT_SEQ: &[u8] = b"next_event_seq";

/// Persistence seam for queued jobs and their audit trail
pub trait JobQueue: Send + Sync {
    /// Persist a new job and return its id
    fn add_job(&self, job: NewJob) -> Result<u64>;

    /// Append an audit event
    fn log_event(&self, event: AuditEvent) -> Result<()>;
}

/// FjallJobQueue persists jobs and audit events in an embedded Fjall keyspace
///
/// Architecture:
/// - `jobs` partition: u64 (big-endian) -> ImportJob (JSON)
/// - `events` partition: u64 (big-endian) -> AuditEvent (JSON)
/// - `metadata` partition: "next_seq" / "next_event_seq" -> u64 counters
///
/// Job ids are sequential and survive reopening the keyspace.
pub struct FjallJobQueue {
    keyspace: Keyspace,
    jobs: PartitionHandle,
    events: PartitionHandle,
    metadata: PartitionHandle,
    job_seq: Arc<AtomicU64>,
    event_seq: Arc<AtomicU64>,
}

impl FjallJobQueue {
    /// Open or create a queue at the specified path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening FjallJobQueue at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;

        let jobs = keyspace.open_partition("jobs", PartitionCreateOptions::default())?;
        let events = keyspace.open_partition("events", PartitionCreateOptions::default())?;
        let metadata = keyspace.open_partition("metadata", PartitionCreateOptions::default())?;

        let job_seq = read_counter(&metadata, NEXT_JOB_SEQ)?;
        let event_seq = read_counter(&metadata, NEXT_EVENT_SEQ)?;

        info!(job_seq, event_seq, "FjallJobQueue opened");

        Ok(Self {
            keyspace,
            jobs,
            events,
            metadata,
            job_seq: Arc::new(AtomicU64::new(job_seq)),
            event_seq: Arc::new(AtomicU64::new(event_seq)),
        })
    }

    /// Retrieve a job by id
    pub fn get_job(&self, job_id: u64) -> Result<Option<ImportJob>> {
        match self.jobs.get(job_id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// List jobs in id order
    pub fn list_jobs(&self, limit: usize) -> Result<Vec<ImportJob>> {
        let mut jobs = Vec::new();
        for item in self.jobs.iter().take(limit) {
            let (_, value) = item?;
            jobs.push(serde_json::from_slice(&value)?);
        }
        Ok(jobs)
    }

    /// List audit events in the order they were logged
    pub fn list_events(&self, limit: usize) -> Result<Vec<AuditEvent>> {
        let mut events = Vec::new();
        for item in self.events.iter().take(limit) {
            let (_, value) = item?;
            events.push(serde_json::from_slice(&value)?);
        }
        Ok(events)
    }

    /// Id the next job will get
    pub fn current_seq(&self) -> u64 {
        self.job_seq.load(Ordering::SeqCst)
    }

    /// Flush all writes to disk
    pub fn flush(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    /// Health check - verify the keyspace is readable
    pub fn health_check(&self) -> Result<()> {
        let _ = self.metadata.get(NEXT_JOB_SEQ)?;
        Ok(())
    }
}

impl JobQueue for FjallJobQueue {
    fn add_job(&self, job: NewJob) -> Result<u64> {
        let job_id = self.job_seq.fetch_add(1, Ordering::SeqCst);

        let record = ImportJob {
            job_id,
            portal_id: job.portal_id,
            user_id: job.user_id,
            job_type: job.job_type,
            package_id: job.package_id,
            job_object: job.job_object,
            status: JobStatus::Submitted,
            trace_id: Uuid::now_v7().to_string(),
            created_at: Utc::now(),
        };

        self.jobs
            .insert(job_id.to_be_bytes(), serde_json::to_vec(&record)?)?;
        // Counter persisted after the record so a crash never skips ahead of data.
        self.metadata
            .insert(NEXT_JOB_SEQ, (job_id + 1).to_be_bytes())?;

        debug!(job_id, package_id = %record.package_id, "Job added");
        Ok(job_id)
    }

    fn log_event(&self, event: AuditEvent) -> Result<()> {
        let seq = self.event_seq.fetch_add(1, Ordering::SeqCst);
        self.events
            .insert(seq.to_be_bytes(), serde_json::to_vec(&event)?)?;
        self.metadata
            .insert(NEXT_EVENT_SEQ, (seq + 1).to_be_bytes())?;

        debug!(seq, job_id = event.job_id, log_type = %event.log_type, "Audit event logged");
        Ok(())
    }
}

fn read_counter(metadata: &PartitionHandle, key: &[u8]) -> Result<u64> {
    Ok(metadata
        .get(key)?
        .map(|bytes| u64::from_be_bytes(bytes.as_ref().try_into().unwrap_or([0u8; 8])))
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::models::{JobType, LOG_TYPE_SITE_IMPORT};
    use tempfile::TempDir;

    fn new_job(package_id: &str) -> NewJob {
        NewJob {
            portal_id: 0,
            user_id: 1,
            job_type: JobType::Import,
            package_id: package_id.to_string(),
            job_object: "{}".to_string(),
        }
    }

    #[test]
    fn test_add_and_get_job() {
        let temp_dir = TempDir::new().unwrap();
        let queue = FjallJobQueue::open(temp_dir.path()).unwrap();

        let job_id = queue.add_job(new_job("pkg-1")).unwrap();
        assert_eq!(job_id, 0);

        let job = queue.get_job(job_id).unwrap().unwrap();
        assert_eq!(job.package_id, "pkg-1");
        assert_eq!(job.status, JobStatus::Submitted);
        assert_eq!(job.job_type, JobType::Import);
        assert!(!job.trace_id.is_empty());
    }

    #[test]
    fn test_sequential_ids() {
        let temp_dir = TempDir::new().unwrap();
        let queue = FjallJobQueue::open(temp_dir.path()).unwrap();

        let ids: Vec<u64> = (0..3)
            .map(|i| queue.add_job(new_job(&format!("pkg-{i}"))).unwrap())
            .collect();

        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(queue.list_jobs(10).unwrap().len(), 3);
        assert_eq!(queue.list_jobs(2).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_job_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let queue = FjallJobQueue::open(temp_dir.path()).unwrap();

        assert!(queue.get_job(42).unwrap().is_none());
    }

    #[test]
    fn test_events_are_logged_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let queue = FjallJobQueue::open(temp_dir.path()).unwrap();

        for job_id in [7, 8] {
            queue
                .log_event(AuditEvent {
                    job_id,
                    portal_id: 0,
                    user_id: 1,
                    log_type: LOG_TYPE_SITE_IMPORT.to_string(),
                    created_at: Utc::now(),
                })
                .unwrap();
        }

        let events = queue.list_events(10).unwrap();
        assert_eq!(events.iter().map(|e| e.job_id).collect::<Vec<_>>(), vec![7, 8]);
    }

    #[test]
    fn test_persistence_across_reopens() {
        let temp_dir = TempDir::new().unwrap();

        let first = {
            let queue = FjallJobQueue::open(temp_dir.path()).unwrap();
            let id = queue.add_job(new_job("pkg-a")).unwrap();
            queue.flush().unwrap();
            id
        };

        let queue = FjallJobQueue::open(temp_dir.path()).unwrap();
        assert_eq!(queue.current_seq(), 1);

        let second = queue.add_job(new_job("pkg-b")).unwrap();
        assert_eq!(second, 1);
        assert_eq!(queue.get_job(first).unwrap().unwrap().package_id, "pkg-a");
        queue.health_check().unwrap();
    }
}
