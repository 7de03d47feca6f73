//! Translate an inbound listing request into a [`JobDescriptor`].
//!
//! Every recognized field is read on its own. Absent fields and fields holding
//! the form's "unchanged" sentinel (`-1`) are left out of the descriptor.
//! Capture is pure: it reads the request and never changes it. Removing the
//! trigger parameters is the dispatcher's job (see [`CLAIMED_KEYS`]).

use std::collections::{BTreeMap, BTreeSet};

use super::error::CaptureError;
use super::handlers::TRASH_STATUS;
use super::models::{ActionKind, EditFields, JobDescriptor, StatusFilter, ANY_STATUS};
use crate::common::{PostId, RequestContext, UserId};

/// Value the bulk forms use for "no selection" / "leave unchanged".
pub const SENTINEL: &str = "-1";

/// Parameters that trigger a bulk action. Claiming a request removes these so
/// the synchronous bulk handler does not run as well.
pub const CLAIMED_KEYS: &[&str] = &["action", "action2", "delete_all", "delete_all2"];

const MAX_ACTION_NAME_LEN: usize = 128;

fn is_sentinel(value: &str) -> bool {
    value.trim() == SENTINEL || value.trim().parse::<i64>().ok() == Some(-1)
}

/// A parameter that is present, non-empty, and not the sentinel.
fn meaningful<'a>(ctx: &'a RequestContext, key: &str) -> Option<&'a str> {
    ctx.get(key)
        .map(str::trim)
        .filter(|value| !value.is_empty() && !is_sentinel(value))
}

fn is_valid_action_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_ACTION_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))
}

/// The requested action, if the request carries a bulk-action signal.
///
/// The empty-trash buttons win over the action selectors; the primary
/// selector wins over the secondary one.
pub fn requested_action(ctx: &RequestContext) -> Option<String> {
    let empty_trash = ["delete_all", "delete_all2"]
        .iter()
        .any(|key| ctx.get(key).is_some_and(|value| !value.trim().is_empty()));
    if empty_trash {
        return Some("delete_all".to_string());
    }

    meaningful(ctx, "action")
        .or_else(|| meaningful(ctx, "action2"))
        .map(str::to_string)
}

/// Selected item IDs from `post[]`, falling back to a comma-separated `ids`.
fn selected_ids(ctx: &RequestContext) -> Vec<PostId> {
    let from_list: Vec<PostId> = ctx
        .get_all("post")
        .iter()
        .filter_map(|raw| PostId::from_request_value(raw))
        .collect();
    if !from_list.is_empty() {
        return from_list;
    }

    ctx.get("ids")
        .map(|ids| ids.split(',').filter_map(PostId::from_request_value).collect())
        .unwrap_or_default()
}

/// `tax_input[taxonomy]` values. Flat taxonomies arrive as one comma-separated
/// string, hierarchical ones as a list.
fn tax_input(ctx: &RequestContext) -> BTreeMap<String, Vec<String>> {
    let mut terms = BTreeMap::new();
    for (key, values) in ctx.with_prefix("tax_input[") {
        let Some(taxonomy) = key
            .strip_prefix("tax_input[")
            .and_then(|rest| rest.strip_suffix(']'))
            .filter(|taxonomy| !taxonomy.is_empty())
        else {
            continue;
        };

        let parsed: Vec<String> = values
            .iter()
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|term| !term.is_empty() && *term != "0")
            .map(str::to_string)
            .collect();

        if !parsed.is_empty() {
            terms.insert(taxonomy.to_string(), parsed);
        }
    }
    terms
}

fn edit_fields(ctx: &RequestContext) -> EditFields {
    let post_category: BTreeSet<u64> = ctx
        .get_all("post_category")
        .iter()
        .filter_map(|raw| raw.trim().parse::<u64>().ok())
        .filter(|id| *id > 0)
        .collect();

    EditFields {
        post_author: meaningful(ctx, "post_author")
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(UserId),
        comment_status: meaningful(ctx, "comment_status").map(str::to_string),
        ping_status: meaningful(ctx, "ping_status").map(str::to_string),
        status: meaningful(ctx, "_status").map(str::to_string),
        sticky: meaningful(ctx, "sticky").map(str::to_string),
        post_format: meaningful(ctx, "post_format").map(str::to_string),
        tax_input: tax_input(ctx),
        post_category,
        post_parent: meaningful(ctx, "post_parent")
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(PostId),
        page_template: meaningful(ctx, "page_template").map(str::to_string),
        post_password: meaningful(ctx, "post_password").map(str::to_string),
        keep_private: meaningful(ctx, "keep_private").map(str::to_string),
    }
}

/// Statuses an empty-trash job deletes. Never `Any`: a missing or `all`
/// listing status purges the trash only.
fn purge_status(listing_status: Option<&str>) -> StatusFilter {
    match listing_status.map(str::trim) {
        None | Some("") | Some(ANY_STATUS) => StatusFilter::only([TRASH_STATUS]),
        Some(status) => StatusFilter::only([status]),
    }
}

/// Build the job descriptor for a bulk-action request.
pub fn capture(ctx: &RequestContext) -> Result<JobDescriptor, CaptureError> {
    let action = requested_action(ctx).ok_or(CaptureError::NotTriggered)?;
    if !is_valid_action_name(&action) {
        return Err(CaptureError::UnsupportedAction(action));
    }

    let kind = ActionKind::from_action_name(&action);

    let target_status = if kind.targets_by_filter() {
        purge_status(ctx.listing_status())
    } else {
        StatusFilter::from_listing(ctx.listing_status())
    };

    let target_ids = if kind.targets_by_filter() {
        Vec::new()
    } else {
        selected_ids(ctx)
    };

    let edit = matches!(kind, ActionKind::Edit).then(|| edit_fields(ctx));

    let builder = JobDescriptor::builder()
        .kind(kind)
        .requestor_id(ctx.user_id())
        .target_type(ctx.post_type())
        .target_ids(target_ids)
        .target_status(target_status)
        .screen(ctx.screen().clone());

    Ok(match edit {
        Some(edit) => builder.edit(edit).build(),
        None => builder.build(),
    })
}
