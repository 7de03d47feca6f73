//! Identifier types shared across the crate.
//!
//! Content items and users are addressed by the numeric IDs the content store
//! hands out. Jobs get a time-ordered UUID so pending lists sort naturally.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a scheduled bulk job.
pub type JobId = Uuid;

/// Creates a new job identifier (UUID v7).
pub fn new_job_id() -> JobId {
    Uuid::now_v7()
}

/// Numeric ID of a content item (post, page, custom post type entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub u64);

/// Numeric ID of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl PostId {
    /// Parse a raw request value the way the content store coerces IDs:
    /// surrounding whitespace is ignored, a leading sign is dropped and the
    /// magnitude kept, and anything unparseable is rejected.
    pub fn from_request_value(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('-')
            .or_else(|| trimmed.strip_prefix('+'))
            .unwrap_or(trimmed);
        digits.parse::<u64>().ok().filter(|id| *id > 0).map(PostId)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for PostId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(PostId)
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        PostId(id)
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        UserId(id)
    }
}
