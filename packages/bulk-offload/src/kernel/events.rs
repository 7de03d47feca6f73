//! Bulk-action lifecycle events.
//!
//! Events are facts broadcast on an in-memory [`EventBus`]. Nothing inside
//! the crate consumes them; they exist so the admin surface can customize
//! post-completion messaging.
//!
//! # Guarantees
//!
//! - **At-most-once delivery**: slow receivers may miss events
//! - **In-memory only**: events are not persisted

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::common::{JobId, UserId};
use crate::domains::bulk_actions::models::{ActionKind, Fingerprint, JobDescriptor, ResultRecord};

/// Default channel capacity for the event bus.
const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BulkActionEvent {
    /// A new job was handed to the job store.
    Scheduled {
        job_id: JobId,
        fingerprint: Fingerprint,
    },

    /// An equivalent job was already pending; nothing was scheduled.
    AlreadyPending {
        existing_job_id: JobId,
        fingerprint: Fingerprint,
    },

    /// A native action arrived with no selected items.
    NoTargetsSelected {
        kind: ActionKind,
        requestor_id: UserId,
    },

    /// A job ran but had nothing to process.
    NoPosts { job_id: JobId, job: JobDescriptor },

    /// A job finished processing its targets.
    Completed {
        job_id: JobId,
        job: JobDescriptor,
        record: ResultRecord,
    },

    /// A custom action finished; carries the listing URL it would have
    /// redirected to.
    CustomCompleted {
        job_id: JobId,
        job: JobDescriptor,
        record: ResultRecord,
        return_url: String,
    },
}

/// Broadcast bus for [`BulkActionEvent`]s (fire-and-forget).
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BulkActionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event; returns how many subscribers received it.
    pub fn emit(&self, event: BulkActionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BulkActionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
