// Trait definitions for the collaborators the bulk-action core consumes.
//
// These are INFRASTRUCTURE traits only - no business logic.
// Naming convention: Base* for trait names (e.g., BaseContentStore)

use std::fmt::{self, Display};

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{PostId, RequestContext, UserId};
use crate::domains::bulk_actions::models::{PostUpdate, StatusFilter};

// =============================================================================
// Capabilities
// =============================================================================

/// Per-item capability checked before mutating.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    EditPost,
    DeletePost,
    Named(String),
}

impl Capability {
    pub fn as_str(&self) -> &str {
        match self {
            Capability::EditPost => "edit_post",
            Capability::DeletePost => "delete_post",
            Capability::Named(name) => name,
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Content Store Trait (Infrastructure)
// =============================================================================

/// Per-item access to the content store.
///
/// Mutations must be idempotent: trashing an already-trashed item reports
/// success. `Ok(false)` means the store refused the mutation; `Err` means the
/// store itself failed. Callers bucket both as failures for that item.
#[async_trait]
pub trait BaseContentStore: Send + Sync {
    /// Whether `user` holds `capability` on `post`.
    async fn can_mutate(&self, user: UserId, post: PostId, capability: &Capability)
        -> Result<bool>;

    /// Whether `post` is locked by someone other than `user`.
    async fn is_locked(&self, post: PostId, user: UserId) -> Result<bool>;

    async fn trash(&self, post: PostId) -> Result<bool>;

    async fn untrash(&self, post: PostId) -> Result<bool>;

    async fn delete_permanently(&self, post: PostId) -> Result<bool>;

    async fn update_fields(&self, post: PostId, update: &PostUpdate) -> Result<bool>;

    /// IDs of every item of `post_type` whose status falls in `statuses`.
    async fn find_ids(&self, post_type: &str, statuses: &StatusFilter) -> Result<Vec<PostId>>;

    /// Drop accumulated query logs and object-cache buffers.
    ///
    /// Called between batches of long-running jobs. Default does nothing.
    fn release_buffers(&self) {}
}

// =============================================================================
// Request Verifier Trait (Infrastructure)
// =============================================================================

/// Validates the authenticity token of a bulk-action request.
pub trait BaseRequestVerifier: Send + Sync {
    /// Returns an error when the request must not be processed.
    fn verify_bulk_request(&self, ctx: &RequestContext) -> Result<()>;
}
