//! Per-kind bulk-action handlers.
//!
//! Each handler supplies the kind-specific pieces (capability, mutation,
//! listing scope, messages) through [`BulkActionHandler`]. Scheduling,
//! execution and visibility are shared drivers written once against that
//! trait: [`process`], [`crate::domains::bulk_actions::executor::execute`] and
//! [`visible_predicate`].

pub mod custom_action;
pub mod delete_all;
pub mod delete_permanently;
pub mod edit;
pub mod move_to_trash;
pub mod registry;
pub mod restore_from_trash;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use super::index;
use super::models::{ActionKind, Fingerprint, JobDescriptor, ResultRecord, StatusFilter};
use super::visibility::Exclusion;
use crate::common::{JobId, PostId};
use crate::kernel::events::BulkActionEvent;
use crate::kernel::jobs::{EnqueueResult, JobStore};
use crate::kernel::{Capability, OffloadDeps};

pub use custom_action::{CustomActionHandler, CustomBulkAction};
pub use delete_all::DeleteAllHandler;
pub use delete_permanently::DeletePermanentlyHandler;
pub use edit::EditHandler;
pub use move_to_trash::MoveToTrashHandler;
pub use registry::{HandlerRegistry, SharedHandlerRegistry};
pub use restore_from_trash::RestoreFromTrashHandler;

/// Status value of trashed items.
pub const TRASH_STATUS: &str = "trash";

// =============================================================================
// Handler contract
// =============================================================================

/// Which listings a handler hides pending items from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    /// Every listing except the trash.
    OutsideTrash,
    /// Only the trash listing.
    TrashOnly,
}

impl ListingScope {
    pub fn applies_to(self, listing_status: Option<&str>) -> bool {
        let in_trash = listing_status == Some(TRASH_STATUS);
        match self {
            ListingScope::OutsideTrash => !in_trash,
            ListingScope::TrashOnly => in_trash,
        }
    }
}

/// Notice texts for one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerMessages {
    /// Shown after the job was scheduled.
    pub scheduled: &'static str,
    /// Shown when an equivalent job was already pending.
    pub already_pending: &'static str,
    /// Shown on a listing that is hiding items with a pending job.
    pub hidden_pending: &'static str,
}

/// Kind-specific behavior of a bulk action.
#[async_trait]
pub trait BulkActionHandler: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this handler processes jobs of `kind`.
    fn handles(&self, kind: &ActionKind) -> bool;

    /// Query parameter carrying this handler's post-redirect flag.
    fn notice_key(&self) -> &'static str;

    fn messages(&self) -> &'static HandlerMessages;

    fn listing_scope(&self) -> ListingScope;

    /// Capability checked per item before mutating.
    fn capability(&self, _job: &JobDescriptor) -> Capability {
        Capability::DeletePost
    }

    /// Key used to detect an equivalent pending job.
    fn dedup_fingerprint(&self, job: &JobDescriptor) -> Fingerprint {
        job.fingerprint()
    }

    /// Hide every row of the listing while a job is pending, instead of only
    /// the job's target ids.
    fn excludes_whole_listing(&self) -> bool {
        false
    }

    /// The items the job operates on, in processing order.
    async fn resolve_targets(&self, _deps: &OffloadDeps, job: &JobDescriptor) -> Result<Vec<PostId>> {
        Ok(job.target_ids().iter().copied().collect())
    }

    /// Apply the mutation to one item. `Ok(false)` means the store refused.
    async fn mutate_one(
        &self,
        deps: &OffloadDeps,
        job: &JobDescriptor,
        post: PostId,
    ) -> Result<bool>;

    /// Notification emitted once the job has run.
    fn completion_event(
        &self,
        job_id: JobId,
        job: JobDescriptor,
        record: ResultRecord,
    ) -> BulkActionEvent {
        BulkActionEvent::Completed {
            job_id,
            job,
            record,
        }
    }
}

// =============================================================================
// Shared drivers
// =============================================================================

/// What [`process`] did with a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Scheduled(JobId),
    AlreadyPending(JobId),
}

impl ProcessOutcome {
    pub fn job_id(&self) -> JobId {
        match self {
            ProcessOutcome::Scheduled(id) | ProcessOutcome::AlreadyPending(id) => *id,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        matches!(self, ProcessOutcome::Scheduled(_))
    }
}

/// Schedule `job` for immediate execution unless an equivalent job is
/// already pending.
pub async fn process(
    handler: &dyn BulkActionHandler,
    deps: &OffloadDeps,
    job: JobDescriptor,
) -> Result<ProcessOutcome> {
    let fingerprint = handler.dedup_fingerprint(&job);

    let outcome = match deps
        .job_store
        .schedule_if_absent(&fingerprint, job, Utc::now())
        .await?
    {
        EnqueueResult::Created(job_id) => {
            info!(handler = handler.name(), job_id = %job_id, fingerprint = %fingerprint, "bulk job scheduled");
            deps.events.emit(BulkActionEvent::Scheduled {
                job_id,
                fingerprint,
            });
            ProcessOutcome::Scheduled(job_id)
        }
        EnqueueResult::Duplicate(existing_job_id) => {
            info!(
                handler = handler.name(),
                existing_job_id = %existing_job_id,
                fingerprint = %fingerprint,
                "equivalent bulk job already pending"
            );
            deps.events.emit(BulkActionEvent::AlreadyPending {
                existing_job_id,
                fingerprint,
            });
            ProcessOutcome::AlreadyPending(existing_job_id)
        }
    };

    Ok(outcome)
}

/// Statuses of pending jobs that overlap a listing, or `None` when the
/// handler never hides anything from it.
fn listing_status_filter(
    handler: &dyn BulkActionHandler,
    listing_status: Option<&str>,
) -> Option<StatusFilter> {
    if !handler.listing_scope().applies_to(listing_status) {
        return None;
    }

    // A pending purge hides the listing whatever statuses it targets.
    Some(if handler.excludes_whole_listing() {
        StatusFilter::Any
    } else {
        StatusFilter::from_listing(listing_status)
    })
}

fn overlaps_listing(
    handler: &dyn BulkActionHandler,
    job: &JobDescriptor,
    post_type: &str,
    status: &StatusFilter,
) -> bool {
    handler.handles(job.kind()) && job.target_type() == post_type && status.matches(job.target_status())
}

/// Items a listing of (`post_type`, `listing_status`) must hide because
/// `handler` has a pending job touching them.
pub async fn visible_predicate(
    handler: &dyn BulkActionHandler,
    store: &dyn JobStore,
    post_type: &str,
    listing_status: Option<&str>,
) -> Result<Exclusion> {
    let Some(status) = listing_status_filter(handler, listing_status) else {
        return Ok(Exclusion::None);
    };
    let matches = |job: &JobDescriptor| overlaps_listing(handler, job, post_type, &status);

    if handler.excludes_whole_listing() {
        let blocked = index::has_pending_matching(store, matches).await?;
        debug!(handler = handler.name(), post_type, blocked, "coarse listing exclusion");
        return Ok(if blocked { Exclusion::All } else { Exclusion::None });
    }

    let ids = index::pending_target_ids_matching(store, matches).await?;
    Ok(Exclusion::from_ids(ids))
}

/// Whether `handler` has a pending job on `post_type` matching the listing.
///
/// Used for the "items hidden" warning; true exactly when
/// [`visible_predicate`] hides something.
pub async fn has_hidden_items(
    handler: &dyn BulkActionHandler,
    store: &dyn JobStore,
    post_type: &str,
    listing_status: Option<&str>,
) -> Result<bool> {
    let Some(status) = listing_status_filter(handler, listing_status) else {
        return Ok(false);
    };
    let coarse = handler.excludes_whole_listing();

    index::has_pending_matching(store, |job| {
        overlaps_listing(handler, job, post_type, &status)
            && (coarse || !job.target_ids().is_empty())
    })
    .await
}

