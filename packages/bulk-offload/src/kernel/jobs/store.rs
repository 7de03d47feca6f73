//! Job store interface.
//!
//! The job store is the delayed-job table bulk jobs are parked in until a
//! runner picks them up. It is the single source of truth for "what is
//! pending": the fingerprint index and the visibility filter re-read it on
//! every call instead of keeping a second index.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::JobId;
use crate::domains::bulk_actions::models::{Fingerprint, JobDescriptor};

/// A scheduled job that has not run yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingJob {
    pub id: JobId,
    pub run_at: DateTime<Utc>,
    pub descriptor: JobDescriptor,
}

/// Result type for enqueue operations that handles deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueResult {
    /// Job was scheduled, returns new job ID
    Created(JobId),
    /// An equivalent job is already pending, returns its ID
    Duplicate(JobId),
}

impl EnqueueResult {
    /// Get the job ID regardless of whether it was created or duplicate
    pub fn job_id(&self) -> JobId {
        match self {
            EnqueueResult::Created(id) | EnqueueResult::Duplicate(id) => *id,
        }
    }

    /// Returns true if this was a newly created job
    pub fn is_created(&self) -> bool {
        matches!(self, EnqueueResult::Created(_))
    }
}

/// Trait for job store operations.
///
/// Firing order across different fingerprints is not guaranteed, and a job
/// may fire more than once if the runner is retried.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Schedule a single (non-recurring) run of `job` at `run_at`.
    async fn schedule(&self, job: JobDescriptor, run_at: DateTime<Utc>) -> Result<JobId>;

    /// Schedule `job` unless a pending job matches `fingerprint`.
    ///
    /// The default implementation reads then writes and therefore races with
    /// concurrent callers. Stores that can do so should override it with an
    /// atomic compare-and-set.
    async fn schedule_if_absent(
        &self,
        fingerprint: &Fingerprint,
        job: JobDescriptor,
        run_at: DateTime<Utc>,
    ) -> Result<EnqueueResult> {
        let pending = self.list_pending().await?;
        if let Some(existing) = pending.iter().find(|p| fingerprint.matches(&p.descriptor)) {
            return Ok(EnqueueResult::Duplicate(existing.id));
        }
        let id = self.schedule(job, run_at).await?;
        Ok(EnqueueResult::Created(id))
    }

    /// Every job that has not been claimed yet, ordered by run time.
    async fn list_pending(&self) -> Result<Vec<PendingJob>>;

    /// Remove and return up to `limit` jobs due at or before `now`.
    async fn claim_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<PendingJob>>;

    /// Find the next scheduled run time (for sleep optimization).
    async fn next_run_time(&self) -> Result<Option<DateTime<Utc>>>;
}
