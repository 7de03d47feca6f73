//! Bulk move to trash.

use anyhow::Result;
use async_trait::async_trait;

use super::{BulkActionHandler, HandlerMessages, ListingScope};
use crate::common::PostId;
use crate::domains::bulk_actions::models::{ActionKind, JobDescriptor};
use crate::kernel::OffloadDeps;

pub const NOTICE_KEY: &str = "bulk_offload_move_to_trash";

static MESSAGES: HandlerMessages = HandlerMessages {
    scheduled: "Success! The selected posts will be moved to the trash shortly.",
    already_pending: "The selected posts are already scheduled to be moved to the trash.",
    hidden_pending: "Some items that would normally be shown here are waiting to be moved to the trash. These items are hidden until they are moved.",
};

#[derive(Debug, Default, Clone, Copy)]
pub struct MoveToTrashHandler;

#[async_trait]
impl BulkActionHandler for MoveToTrashHandler {
    fn name(&self) -> &'static str {
        "move_to_trash"
    }

    fn handles(&self, kind: &ActionKind) -> bool {
        matches!(kind, ActionKind::Trash)
    }

    fn notice_key(&self) -> &'static str {
        NOTICE_KEY
    }

    fn messages(&self) -> &'static HandlerMessages {
        &MESSAGES
    }

    fn listing_scope(&self) -> ListingScope {
        ListingScope::OutsideTrash
    }

    async fn mutate_one(
        &self,
        deps: &OffloadDeps,
        _job: &JobDescriptor,
        post: PostId,
    ) -> Result<bool> {
        deps.content.trash(post).await
    }
}
