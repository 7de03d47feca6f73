//! Admin notices for the listing screen.
//!
//! After a dispatch the redirect carries one handler's notice key with `1`
//! (scheduled) or `0` (already pending). Without a key, a handler whose
//! pending jobs are hiding items from the current listing shows a warning.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::handlers::{self, HandlerRegistry};
use crate::common::RequestContext;
use crate::kernel::jobs::JobStore;

/// Redirect flag set when a native action was requested with nothing
/// selected.
pub const NO_POSTS_NOTICE_KEY: &str = "bulk_offload_no_posts";

const NO_POSTS_MESSAGE: &str = "No items were selected, so there was nothing to process.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Error,
    Warning,
}

/// A message to render on the next admin page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

/// Notices for the listing page `ctx` renders.
pub async fn admin_notices(
    registry: &HandlerRegistry,
    store: &dyn JobStore,
    ctx: &RequestContext,
) -> Result<Vec<Notice>> {
    let mut notices = Vec::new();

    if ctx.contains(NO_POSTS_NOTICE_KEY) {
        notices.push(Notice::new(NoticeKind::Warning, NO_POSTS_MESSAGE));
    }

    for handler in registry.handlers() {
        let messages = handler.messages();

        if let Some(flag) = ctx.get(handler.notice_key()) {
            let notice = if flag.trim() == "1" {
                Notice::new(NoticeKind::Success, messages.scheduled)
            } else {
                Notice::new(NoticeKind::Error, messages.already_pending)
            };
            notices.push(notice);
            continue;
        }

        if !ctx.screen().is_edit_listing() {
            continue;
        }

        if handlers::has_hidden_items(handler, store, ctx.post_type(), ctx.listing_status()).await? {
            notices.push(Notice::new(NoticeKind::Warning, messages.hidden_pending));
        }
    }

    Ok(notices)
}

/// Extend the list of one-time query args with every notice key, so the
/// flags are not carried into pagination and other links.
pub fn removable_query_args(registry: &HandlerRegistry, mut args: Vec<String>) -> Vec<String> {
    args.extend(
        registry
            .handlers()
            .iter()
            .map(|handler| handler.notice_key().to_string()),
    );
    args.push(NO_POSTS_NOTICE_KEY.to_string());
    args
}
