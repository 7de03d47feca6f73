//! Request and content fixtures shared by the integration tests.

use bulk_offload::common::{RequestContext, Screen, UserId};
use bulk_offload::kernel::test_dependencies::MockContentStore;

/// Acting user for every fixture request.
pub const ADMIN: UserId = UserId(1);

/// Nonce accepted by the harness verifier.
pub const NONCE: &str = "test-nonce";

/// Published posts 1..=10 and trashed posts 11..=15, all of type `post`.
pub fn seeded_content() -> MockContentStore {
    MockContentStore::new()
        .with_posts(1..=10, "post", "publish")
        .with_posts(11..=15, "post", "trash")
}

/// A verified request from the `post` listing showing `status`.
pub fn listing_request(status: Option<&str>) -> RequestContext {
    let uri = match status {
        Some(status) => format!("/wp-admin/edit.php?post_status={}", status),
        None => "/wp-admin/edit.php".to_string(),
    };
    let ctx = RequestContext::new(ADMIN, Screen::edit_listing("post"), uri)
        .with_param("_wpnonce", NONCE);
    match status {
        Some(status) => ctx.with_param("post_status", status),
        None => ctx,
    }
}

/// A bulk request for `action` over `ids`.
pub fn bulk_request(action: &str, status: Option<&str>, ids: &[u64]) -> RequestContext {
    listing_request(status)
        .with_param("action", action)
        .with_param("action2", "-1")
        .with_params("post", ids.iter().map(u64::to_string))
}

/// The "Empty Trash" button on the `post` trash listing.
pub fn empty_trash_request() -> RequestContext {
    listing_request(Some("trash")).with_param("delete_all", "Empty Trash")
}
