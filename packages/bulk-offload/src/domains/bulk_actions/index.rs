//! Pending-job queries.
//!
//! Every query re-reads the job store. There is no cached index to go
//! stale: a job scheduled or claimed between two calls is reflected by the
//! second one.

use std::collections::BTreeSet;

use anyhow::Result;

use super::models::{Fingerprint, JobDescriptor};
use crate::common::PostId;
use crate::kernel::jobs::JobStore;

/// Whether any pending job satisfies `matches`. Stops at the first match.
pub async fn has_pending_matching<F>(store: &dyn JobStore, matches: F) -> Result<bool>
where
    F: Fn(&JobDescriptor) -> bool + Send,
{
    let pending = store.list_pending().await?;
    Ok(pending.iter().any(|job| matches(&job.descriptor)))
}

/// Union of the target ids of every pending job satisfying `matches`.
pub async fn pending_target_ids_matching<F>(
    store: &dyn JobStore,
    matches: F,
) -> Result<BTreeSet<PostId>>
where
    F: Fn(&JobDescriptor) -> bool + Send,
{
    let pending = store.list_pending().await?;
    Ok(pending
        .iter()
        .map(|job| &job.descriptor)
        .filter(|job| matches(job))
        .flat_map(|job| job.target_ids().iter().copied())
        .collect())
}

/// Whether any pending job matches `fingerprint`.
pub async fn has_pending(store: &dyn JobStore, fingerprint: &Fingerprint) -> Result<bool> {
    has_pending_matching(store, |job| fingerprint.matches(job)).await
}

/// Union of the target ids of every pending job matching `fingerprint`.
pub async fn pending_target_ids(
    store: &dyn JobStore,
    fingerprint: &Fingerprint,
) -> Result<BTreeSet<PostId>> {
    pending_target_ids_matching(store, |job| fingerprint.matches(job)).await
}
