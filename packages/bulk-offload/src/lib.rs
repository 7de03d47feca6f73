// Bulk Action Offload - Core
//
// Defers expensive bulk actions on admin post listings to background jobs.
// A bulk request is captured into an immutable job descriptor, deduplicated
// against the pending jobs, scheduled once, and later executed item by item
// with batched buffer releases.
//
// Collaborators (job store, content store, request verifier) live behind
// traits in kernel/; bulk-action logic lives in domains/bulk_actions/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
