//! Job execution: the per-item loop shared by every handler.
//!
//! For each target: capability check, then lock check, then the handler's
//! mutation. Every item lands in exactly one bucket of the [`ResultRecord`];
//! nothing aborts the loop. After each full batch the content store is asked
//! to release its buffers and the loop pauses.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

use super::handlers::BulkActionHandler;
use super::models::{ItemOutcome, JobDescriptor, ResultRecord};
use crate::common::{JobId, PostId};
use crate::kernel::events::BulkActionEvent;
use crate::kernel::{Capability, OffloadDeps};

/// Items processed between two buffer releases.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Pause after each batch.
pub const DEFAULT_PAUSE: Duration = Duration::from_secs(3);

/// Batching knobs for the per-item loop.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ExecutionSettings {
    #[builder(default = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
    #[builder(default = DEFAULT_PAUSE)]
    pub pause: Duration,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ExecutionSettings {
    /// Whether a release-and-pause is due after `processed` items out of
    /// `total`. No pause after the last item.
    fn pause_due(&self, processed: usize, total: usize) -> bool {
        self.batch_size > 0 && processed % self.batch_size == 0 && processed < total
    }
}

/// Run one job to completion.
///
/// Returns `None` when there was nothing to process; a `NoPosts` event is
/// emitted instead of a completion event in that case. An error means the
/// targets could not be resolved and no item was touched.
pub async fn execute(
    handler: &dyn BulkActionHandler,
    deps: &OffloadDeps,
    job_id: JobId,
    job: JobDescriptor,
    settings: &ExecutionSettings,
) -> Result<Option<ResultRecord>> {
    let targets = handler.resolve_targets(deps, &job).await?;

    if targets.is_empty() {
        info!(handler = handler.name(), job_id = %job_id, "bulk job has no posts");
        deps.events.emit(BulkActionEvent::NoPosts { job_id, job });
        return Ok(None);
    }

    let total = targets.len();
    let capability = handler.capability(&job);
    let mut record = ResultRecord::new(job.kind().clone());

    info!(
        handler = handler.name(),
        job_id = %job_id,
        total,
        capability = %capability,
        "executing bulk job"
    );

    for (index, post) in targets.into_iter().enumerate() {
        let outcome = process_item(handler, deps, &job, &capability, post).await;
        record.record(post, outcome);

        let processed = index + 1;
        if settings.pause_due(processed, total) {
            debug!(job_id = %job_id, processed, total, "releasing buffers between batches");
            deps.content.release_buffers();
            if !settings.pause.is_zero() {
                tokio::time::sleep(settings.pause).await;
            }
        }
    }

    info!(
        handler = handler.name(),
        job_id = %job_id,
        succeeded = record.succeeded.len(),
        locked = record.locked.len(),
        unauthorized = record.unauthorized.len(),
        failed = record.failed.len(),
        "bulk job completed"
    );

    deps.events
        .emit(handler.completion_event(job_id, job, record.clone()));

    Ok(Some(record))
}

async fn process_item(
    handler: &dyn BulkActionHandler,
    deps: &OffloadDeps,
    job: &JobDescriptor,
    capability: &Capability,
    post: PostId,
) -> ItemOutcome {
    let user = job.requestor_id();

    match deps.content.can_mutate(user, post, capability).await {
        Ok(true) => {}
        Ok(false) => return ItemOutcome::Unauthorized,
        Err(e) => {
            warn!(post = %post, error = %e, "capability check failed");
            return ItemOutcome::Failed;
        }
    }

    match deps.content.is_locked(post, user).await {
        Ok(false) => {}
        Ok(true) => return ItemOutcome::Locked,
        Err(e) => {
            warn!(post = %post, error = %e, "lock check failed");
            return ItemOutcome::Failed;
        }
    }

    match handler.mutate_one(deps, job, post).await {
        Ok(true) => ItemOutcome::Succeeded,
        Ok(false) => ItemOutcome::Failed,
        Err(e) => {
            warn!(handler = handler.name(), post = %post, error = %e, "mutation failed");
            ItemOutcome::Failed
        }
    }
}
