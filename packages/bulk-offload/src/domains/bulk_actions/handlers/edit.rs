//! Bulk edit.

use anyhow::Result;
use async_trait::async_trait;

use super::{BulkActionHandler, HandlerMessages, ListingScope};
use crate::common::PostId;
use crate::domains::bulk_actions::models::{ActionKind, JobDescriptor};
use crate::kernel::{Capability, OffloadDeps};

pub const NOTICE_KEY: &str = "bulk_offload_edit";

static MESSAGES: HandlerMessages = HandlerMessages {
    scheduled: "Success! The selected posts will be edited shortly.",
    already_pending: "The requested edits are already pending for the chosen posts.",
    hidden_pending: "Some items that would normally be shown here are waiting to be edited. These items are hidden until they are processed.",
};

/// Applies the bulk-edit form's field changes to every selected item.
#[derive(Debug, Default, Clone, Copy)]
pub struct EditHandler;

#[async_trait]
impl BulkActionHandler for EditHandler {
    fn name(&self) -> &'static str {
        "edit"
    }

    fn handles(&self, kind: &ActionKind) -> bool {
        matches!(kind, ActionKind::Edit)
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

    fn capability(&self, _job: &JobDescriptor) -> Capability {
        Capability::EditPost
    }

    async fn mutate_one(
        &self,
        deps: &OffloadDeps,
        job: &JobDescriptor,
        post: PostId,
    ) -> Result<bool> {
        let update = job.edit().map(|fields| fields.to_update()).unwrap_or_default();
        deps.content.update_fields(post, &update).await
    }
}
