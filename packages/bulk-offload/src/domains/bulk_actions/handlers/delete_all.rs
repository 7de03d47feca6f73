//! Empty trash: permanently delete every trashed item of a post type.
//!
//! Unlike the other kinds the job carries no id list. Targets are looked up
//! when the job runs, and a pending purge hides the whole trash listing.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::{BulkActionHandler, HandlerMessages, ListingScope, TRASH_STATUS};
use crate::common::{PostId, RequestContext};
use crate::domains::bulk_actions::index;
use crate::domains::bulk_actions::models::{ActionKind, Fingerprint, JobDescriptor, StatusFilter};
use crate::kernel::jobs::JobStore;
use crate::kernel::OffloadDeps;

pub const NOTICE_KEY: &str = "bulk_offload_delete_all";

static MESSAGES: HandlerMessages = HandlerMessages {
    scheduled: "Success! The trash will be emptied shortly.",
    already_pending: "A request to empty the trash is already pending for this post type.",
    hidden_pending: "Items in the trash are waiting to be deleted permanently. They are hidden until the trash has been emptied.",
};

/// Capability that gates the "Empty Trash" control for `post_type`.
pub fn empty_trash_capability(post_type: &str) -> String {
    match post_type {
        "post" => "edit_others_posts".to_string(),
        "page" => "edit_others_pages".to_string(),
        other => format!("edit_others_{}s", other),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DeleteAllHandler;

impl DeleteAllHandler {
    /// Whether a purge of `post_type` is pending, whatever statuses it
    /// targets.
    pub async fn purge_pending(&self, store: &dyn JobStore, post_type: &str) -> Result<bool> {
        let fingerprint = Fingerprint::new(ActionKind::DeleteAll, post_type, StatusFilter::Any);
        index::has_pending(store, &fingerprint).await
    }

    /// Filter a capability check made while rendering a listing.
    ///
    /// Returns `false` when `capability` gates the empty-trash control on a
    /// trash listing whose purge is already pending, hiding the control.
    /// Every other check passes through as `granted`.
    pub async fn filter_capability(
        &self,
        store: &dyn JobStore,
        ctx: &RequestContext,
        capability: &str,
        granted: bool,
    ) -> Result<bool> {
        if !granted
            || !ctx.screen().is_edit_listing()
            || ctx.listing_status() != Some(TRASH_STATUS)
        {
            return Ok(granted);
        }

        let post_type = ctx.post_type();
        if capability != empty_trash_capability(post_type) {
            return Ok(granted);
        }

        let pending = self.purge_pending(store, post_type).await?;
        if pending {
            debug!(post_type, capability, "empty trash control suppressed");
        }
        Ok(!pending)
    }
}

#[async_trait]
impl BulkActionHandler for DeleteAllHandler {
    fn name(&self) -> &'static str {
        "delete_all"
    }

    fn handles(&self, kind: &ActionKind) -> bool {
        matches!(kind, ActionKind::DeleteAll)
    }

    fn notice_key(&self) -> &'static str {
        NOTICE_KEY
    }

    fn messages(&self) -> &'static HandlerMessages {
        &MESSAGES
    }

    fn listing_scope(&self) -> ListingScope {
        ListingScope::TrashOnly
    }

    /// Any pending purge of the post type blocks another one.
    fn dedup_fingerprint(&self, job: &JobDescriptor) -> Fingerprint {
        Fingerprint::new(ActionKind::DeleteAll, job.target_type(), StatusFilter::Any)
    }

    fn excludes_whole_listing(&self) -> bool {
        true
    }

    /// Re-queried at run time. A wildcard status only ever means the trash.
    async fn resolve_targets(&self, deps: &OffloadDeps, job: &JobDescriptor) -> Result<Vec<PostId>> {
        let statuses = match job.target_status() {
            StatusFilter::Any => StatusFilter::only([TRASH_STATUS]),
            statuses => statuses.clone(),
        };
        deps.content.find_ids(job.target_type(), &statuses).await
    }

    async fn mutate_one(
        &self,
        deps: &OffloadDeps,
        _job: &JobDescriptor,
        post: PostId,
    ) -> Result<bool> {
        deps.content.delete_permanently(post).await
    }
}
