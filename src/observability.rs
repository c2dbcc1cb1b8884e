//! Observability (tracing setup, counters)

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::TelemetryConfig;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over `telemetry.log_filter`. Output goes to
/// stderr so command output on stdout stays machine readable. Calling this
/// twice is a no-op.
pub fn init_tracing(telemetry: &TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&telemetry.log_filter));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_ansi(telemetry.ansi)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    packages_listed: AtomicU64,
    packages_verified: AtomicU64,
    packages_rejected: AtomicU64,
    jobs_queued: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packages_listed(&self, count: u64) {
        self.packages_listed.fetch_add(count, Ordering::Relaxed);
        tracing::debug!(counter = "packages_listed", count, "Metric incremented");
    }

    pub fn package_verified(&self) {
        self.packages_verified.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "packages_verified", "Metric incremented");
    }

    pub fn package_rejected(&self) {
        self.packages_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "packages_rejected", "Metric incremented");
    }

    pub fn job_queued(&self) {
        self.jobs_queued.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "jobs_queued", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packages_listed: self.packages_listed.load(Ordering::Relaxed),
            packages_verified: self.packages_verified.load(Ordering::Relaxed),
            packages_rejected: self.packages_rejected.load(Ordering::Relaxed),
            jobs_queued: self.jobs_queued.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub packages_listed: u64,
    pub packages_verified: u64,
    pub packages_rejected: u64,
    pub jobs_queued: u64,
}
