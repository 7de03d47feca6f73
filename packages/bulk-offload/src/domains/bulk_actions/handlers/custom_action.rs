//! Third-party bulk actions.
//!
//! Any action name outside the native set is captured as
//! [`ActionKind::Custom`]. It is offloaded only when a [`CustomBulkAction`]
//! is registered under that name; otherwise the request falls through to
//! the synchronous path.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::{BulkActionHandler, HandlerMessages, ListingScope};
use crate::common::{JobId, PostId};
use crate::domains::bulk_actions::models::{ActionKind, JobDescriptor, ResultRecord};
use crate::domains::bulk_actions::redirect;
use crate::kernel::events::BulkActionEvent;
use crate::kernel::{BaseContentStore, Capability, OffloadDeps};

pub const NOTICE_KEY: &str = "bulk_offload_custom";

static MESSAGES: HandlerMessages = HandlerMessages {
    scheduled: "Success! The selected posts will be processed shortly.",
    already_pending: "The requested processing is already pending for the chosen posts.",
    hidden_pending: "Some items that would normally be shown here are waiting to be processed. These items are hidden until processing completes.",
};

/// A bulk action contributed by other code.
#[async_trait]
pub trait CustomBulkAction: Send + Sync {
    /// Action name as submitted by the listing form.
    fn name(&self) -> &str;

    /// Capability checked per item.
    fn capability(&self) -> Capability {
        Capability::EditPost
    }

    /// Apply the action to one item.
    async fn apply(
        &self,
        content: &dyn BaseContentStore,
        job: &JobDescriptor,
        post: PostId,
    ) -> Result<bool>;

    /// Adjust the listing URL reported on completion.
    fn return_url(&self, listing_url: String, _job: &JobDescriptor, _record: &ResultRecord) -> String {
        listing_url
    }
}

/// Runs every registered [`CustomBulkAction`].
#[derive(Default, Clone)]
pub struct CustomActionHandler {
    actions: HashMap<String, Arc<dyn CustomBulkAction>>,
}

impl CustomActionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. A later registration under the same name
    /// replaces the earlier one.
    pub fn register(&mut self, action: Arc<dyn CustomBulkAction>) {
        self.actions.insert(action.name().to_string(), action);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn registered_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn action_for(&self, job: &JobDescriptor) -> Option<&Arc<dyn CustomBulkAction>> {
        match job.kind() {
            ActionKind::Custom(name) => self.actions.get(name),
            _ => None,
        }
    }
}

impl std::fmt::Debug for CustomActionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomActionHandler")
            .field("actions", &self.registered_names())
            .finish()
    }
}

#[async_trait]
impl BulkActionHandler for CustomActionHandler {
    fn name(&self) -> &'static str {
        "custom"
    }

    /// Every custom name shares one listing filter and notice.
    fn handles(&self, kind: &ActionKind) -> bool {
        matches!(kind, ActionKind::Custom(_))
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

    fn capability(&self, job: &JobDescriptor) -> Capability {
        self.action_for(job)
            .map(|action| action.capability())
            .unwrap_or(Capability::EditPost)
    }

    async fn mutate_one(
        &self,
        deps: &OffloadDeps,
        job: &JobDescriptor,
        post: PostId,
    ) -> Result<bool> {
        let action = self
            .action_for(job)
            .ok_or_else(|| anyhow!("no custom bulk action registered for {}", job.kind()))?;
        action.apply(deps.content.as_ref(), job, post).await
    }

    fn completion_event(
        &self,
        job_id: JobId,
        job: JobDescriptor,
        record: ResultRecord,
    ) -> BulkActionEvent {
        let listing_url = redirect::listing_url(
            job.screen().map(|screen| screen.base.as_str()).unwrap_or("edit"),
            job.target_type(),
            job.target_status(),
        );
        let return_url = match self.action_for(&job) {
            Some(action) => action.return_url(listing_url, &job, &record),
            None => listing_url,
        };

        BulkActionEvent::CustomCompleted {
            job_id,
            job,
            record,
            return_url,
        }
    }
}
