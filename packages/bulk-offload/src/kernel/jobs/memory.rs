//! In-memory job store.
//!
//! Backs tests and the demo binary. All operations take a single lock, so
//! `schedule_if_absent` is atomic with respect to other callers.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::store::{EnqueueResult, JobStore, PendingJob};
use crate::common::{new_job_id, JobId};
use crate::domains::bulk_actions::models::{Fingerprint, JobDescriptor};

/// Job store that keeps pending jobs in memory.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    pending: RwLock<Vec<PendingJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending jobs.
    pub fn len(&self) -> usize {
        self.pending.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a pending job by ID.
    pub fn get(&self, id: JobId) -> Option<PendingJob> {
        self.pending
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|job| job.id == id)
            .cloned()
    }

    /// Drop every pending job.
    pub fn clear(&self) {
        self.pending.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn insert(pending: &mut Vec<PendingJob>, job: JobDescriptor, run_at: DateTime<Utc>) -> JobId {
        let id = new_job_id();
        debug!(job_id = %id, kind = %job.kind(), run_at = %run_at, "job stored");
        pending.push(PendingJob {
            id,
            run_at,
            descriptor: job,
        });
        pending.sort_by(|a, b| a.run_at.cmp(&b.run_at).then(a.id.cmp(&b.id)));
        id
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn schedule(&self, job: JobDescriptor, run_at: DateTime<Utc>) -> Result<JobId> {
        let mut pending = self.pending.write().unwrap_or_else(|e| e.into_inner());
        Ok(Self::insert(&mut pending, job, run_at))
    }

    async fn schedule_if_absent(
        &self,
        fingerprint: &Fingerprint,
        job: JobDescriptor,
        run_at: DateTime<Utc>,
    ) -> Result<EnqueueResult> {
        let mut pending = self.pending.write().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = pending.iter().find(|p| fingerprint.matches(&p.descriptor)) {
            return Ok(EnqueueResult::Duplicate(existing.id));
        }
        Ok(EnqueueResult::Created(Self::insert(&mut pending, job, run_at)))
    }

    async fn list_pending(&self) -> Result<Vec<PendingJob>> {
        Ok(self.pending.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn claim_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<PendingJob>> {
        let mut pending = self.pending.write().unwrap_or_else(|e| e.into_inner());
        let mut claimed = Vec::new();
        let mut remaining = Vec::with_capacity(pending.len());

        for job in pending.drain(..) {
            if claimed.len() < limit && job.run_at <= now {
                claimed.push(job);
            } else {
                remaining.push(job);
            }
        }

        *pending = remaining;
        Ok(claimed)
    }

    async fn next_run_time(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .pending
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .first()
            .map(|job| job.run_at))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::common::{PostId, UserId};
    use crate::domains::bulk_actions::models::{ActionKind, StatusFilter};

    fn job(kind: ActionKind, ids: Vec<u64>) -> JobDescriptor {
        JobDescriptor::builder()
            .kind(kind)
            .requestor_id(UserId(1))
            .target_type("post")
            .target_ids(ids.into_iter().map(PostId).collect())
            .build()
    }

    #[tokio::test]
    async fn schedule_if_absent_deduplicates() {
        let store = InMemoryJobStore::new();
        let fp = Fingerprint::new(ActionKind::Trash, "post", StatusFilter::Any);

        let first = store
            .schedule_if_absent(&fp, job(ActionKind::Trash, vec![1]), Utc::now())
            .await
            .unwrap();
        let second = store
            .schedule_if_absent(&fp, job(ActionKind::Trash, vec![2]), Utc::now())
            .await
            .unwrap();

        assert!(first.is_created());
        assert_eq!(second, EnqueueResult::Duplicate(first.job_id()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_schedule_if_absent_creates_one_job() {
        let store = Arc::new(InMemoryJobStore::new());
        let fp = Fingerprint::new(ActionKind::DeleteAll, "post", StatusFilter::Any);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let fp = fp.clone();
            handles.push(tokio::spawn(async move {
                store
                    .schedule_if_absent(&fp, job(ActionKind::DeleteAll, vec![]), Utc::now())
                    .await
                    .unwrap()
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_created() {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn claim_due_only_takes_due_jobs_up_to_limit() {
        let store = InMemoryJobStore::new();
        let now = Utc::now();
        store.schedule(job(ActionKind::Trash, vec![1]), now).await.unwrap();
        store.schedule(job(ActionKind::Delete, vec![2]), now).await.unwrap();
        let later = store
            .schedule(job(ActionKind::Untrash, vec![3]), now + Duration::hours(1))
            .await
            .unwrap();

        let claimed = store.claim_due(now, 1).await.unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(store.len(), 2);

        let claimed = store.claim_due(now, 10).await.unwrap();
        assert_eq!(claimed.len(), 1);
        assert_eq!(store.list_pending().await.unwrap()[0].id, later);
        assert_eq!(store.next_run_time().await.unwrap(), Some(now + Duration::hours(1)));
    }
}
