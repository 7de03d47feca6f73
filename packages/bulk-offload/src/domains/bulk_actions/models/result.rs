//! Result record produced by executing one job.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::job::ActionKind;
use crate::common::PostId;

/// How a single item fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOutcome {
    Succeeded,
    Locked,
    Unauthorized,
    Failed,
}

/// Partitioned outcome of one job: every target id lands in exactly one set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub kind: ActionKind,
    pub succeeded: BTreeSet<PostId>,
    pub locked: BTreeSet<PostId>,
    pub unauthorized: BTreeSet<PostId>,
    pub failed: BTreeSet<PostId>,
}

impl ResultRecord {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            succeeded: BTreeSet::new(),
            locked: BTreeSet::new(),
            unauthorized: BTreeSet::new(),
            failed: BTreeSet::new(),
        }
    }

    /// Bucket an item. Recording the same id twice moves it to the latest
    /// bucket so the sets stay disjoint.
    pub fn record(&mut self, id: PostId, outcome: ItemOutcome) {
        self.succeeded.remove(&id);
        self.locked.remove(&id);
        self.unauthorized.remove(&id);
        self.failed.remove(&id);

        let bucket = match outcome {
            ItemOutcome::Succeeded => &mut self.succeeded,
            ItemOutcome::Locked => &mut self.locked,
            ItemOutcome::Unauthorized => &mut self.unauthorized,
            ItemOutcome::Failed => &mut self.failed,
        };
        bucket.insert(id);
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.locked.len() + self.unauthorized.len() + self.failed.len()
    }

    /// Check the partition invariant against the job's target set.
    pub fn is_partition_of(&self, targets: &BTreeSet<PostId>) -> bool {
        let union: BTreeSet<PostId> = self
            .succeeded
            .iter()
            .chain(&self.locked)
            .chain(&self.unauthorized)
            .chain(&self.failed)
            .copied()
            .collect();
        union == *targets && self.total() == targets.len()
    }

    pub fn has_failures(&self) -> bool {
        !(self.locked.is_empty() && self.unauthorized.is_empty() && self.failed.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_buckets_disjoint() {
        let mut record = ResultRecord::new(ActionKind::Trash);
        record.record(PostId(1), ItemOutcome::Failed);
        record.record(PostId(1), ItemOutcome::Succeeded);
        record.record(PostId(2), ItemOutcome::Locked);

        assert_eq!(record.total(), 2);
        assert!(record.failed.is_empty());
        assert!(record.is_partition_of(&BTreeSet::from([PostId(1), PostId(2)])));
        assert!(!record.is_partition_of(&BTreeSet::from([PostId(1)])));
    }
}
