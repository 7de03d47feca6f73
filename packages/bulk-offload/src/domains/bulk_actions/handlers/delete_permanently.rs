//! Bulk permanent delete of selected items.

use anyhow::Result;
use async_trait::async_trait;

use super::{BulkActionHandler, HandlerMessages, ListingScope};
use crate::common::PostId;
use crate::domains::bulk_actions::models::{ActionKind, JobDescriptor};
use crate::kernel::OffloadDeps;

pub const NOTICE_KEY: &str = "bulk_offload_delete_permanently";

static MESSAGES: HandlerMessages = HandlerMessages {
    scheduled: "Success! The selected posts will be deleted shortly.",
    already_pending: "The selected posts are already scheduled to be deleted.",
    hidden_pending: "Some items that would normally be shown here are waiting to be deleted permanently. These items are hidden until then.",
};

#[derive(Debug, Default, Clone, Copy)]
pub struct DeletePermanentlyHandler;

#[async_trait]
impl BulkActionHandler for DeletePermanentlyHandler {
    fn name(&self) -> &'static str {
        "delete_permanently"
    }

    fn handles(&self, kind: &ActionKind) -> bool {
        matches!(kind, ActionKind::Delete)
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

    async fn mutate_one(
        &self,
        deps: &OffloadDeps,
        _job: &JobDescriptor,
        post: PostId,
    ) -> Result<bool> {
        deps.content.delete_permanently(post).await
    }
}
