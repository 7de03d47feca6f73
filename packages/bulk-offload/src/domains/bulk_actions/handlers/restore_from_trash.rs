//! Bulk restore from trash.

use anyhow::Result;
use async_trait::async_trait;

use super::{BulkActionHandler, HandlerMessages, ListingScope};
use crate::common::PostId;
use crate::domains::bulk_actions::models::{ActionKind, JobDescriptor};
use crate::kernel::OffloadDeps;

pub const NOTICE_KEY: &str = "bulk_offload_restore_from_trash";

static MESSAGES: HandlerMessages = HandlerMessages {
    scheduled: "Success! The selected posts will be restored shortly.",
    already_pending: "The selected posts are already scheduled to be restored.",
    hidden_pending: "Some items that would normally be shown here are waiting to be restored from the trash. These items are hidden until they are restored.",
};

#[derive(Debug, Default, Clone, Copy)]
pub struct RestoreFromTrashHandler;

#[async_trait]
impl BulkActionHandler for RestoreFromTrashHandler {
    fn name(&self) -> &'static str {
        "restore_from_trash"
    }

    fn handles(&self, kind: &ActionKind) -> bool {
        matches!(kind, ActionKind::Untrash)
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
        deps.content.untrash(post).await
    }
}
