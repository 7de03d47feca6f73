//! Dependency container for the bulk-action core (using traits for testability)
//!
//! Every collaborator the core talks to sits behind a trait object, so tests
//! swap in the doubles from `test_dependencies` without touching domain code.

use std::sync::Arc;

use crate::kernel::events::EventBus;
use crate::kernel::jobs::JobStore;
use crate::kernel::{BaseContentStore, BaseRequestVerifier};

// =============================================================================
// OffloadDeps
// =============================================================================

/// Collaborators shared by the dispatcher, the handlers and the job runner.
#[derive(Clone)]
pub struct OffloadDeps {
    /// Delayed-job table bulk jobs are parked in.
    pub job_store: Arc<dyn JobStore>,
    /// Per-item capability, lock and mutation primitives.
    pub content: Arc<dyn BaseContentStore>,
    /// Authenticity check for inbound bulk requests.
    pub verifier: Arc<dyn BaseRequestVerifier>,
    /// Fire-and-forget notifications (scheduled, completed, ...).
    pub events: EventBus,
}

impl OffloadDeps {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        content: Arc<dyn BaseContentStore>,
        verifier: Arc<dyn BaseRequestVerifier>,
        events: EventBus,
    ) -> Self {
        Self {
            job_store,
            content,
            verifier,
            events,
        }
    }
}

impl std::fmt::Debug for OffloadDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OffloadDeps")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
