//! Job infrastructure for deferred bulk actions.
//!
//! This module provides the kernel-level infrastructure for job execution:
//! - [`JobStore`] - Delayed-job table interface (schedule, list, claim)
//! - [`InMemoryJobStore`] - Lock-guarded store used by tests and the demo
//! - [`JobRunner`] - Long-running service that claims and executes due jobs
//!
//! # Architecture
//!
//! ```text
//! Dispatcher
//!     │
//!     └─► JobStore.schedule_if_absent(fingerprint, job, now)
//!
//! JobRunner
//!     │
//!     ├─► JobStore.claim_due(now, limit)
//!     └─► handler + executor (per-item loop)
//! ```
//!
//! Business logic (what each bulk action does) stays in the domain; this
//! module only schedules and fires.

mod memory;
pub mod runner;
mod store;

pub use memory::InMemoryJobStore;
pub use runner::{JobRunOutcome, JobRunner, RunnerConfig};
pub use store::{EnqueueResult, JobStore, PendingJob};
