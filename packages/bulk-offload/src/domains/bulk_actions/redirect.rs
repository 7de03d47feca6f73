//! Redirect targets produced at the end of a dispatch.

use url::form_urlencoded;

use super::models::StatusFilter;

/// One-time arguments removed from the request URI before redirecting.
pub const STRIPPED_ARGS: &[&str] = &[
    "_wp_http_referer",
    "_wpnonce",
    "action",
    "action2",
    "delete_all",
    "delete_all2",
    "post",
];

/// `request_uri` without the bulk-action arguments, flagged with
/// `notice_key=1` (success) or `notice_key=0`.
pub fn with_notice(request_uri: &str, notice_key: &str, success: bool) -> String {
    let (path, query) = request_uri.split_once('?').unwrap_or((request_uri, ""));

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let bare = key.strip_suffix("[]").unwrap_or(&*key);
        if bare == notice_key || STRIPPED_ARGS.contains(&bare) {
            continue;
        }
        serializer.append_pair(&key, &value);
    }
    serializer.append_pair(notice_key, if success { "1" } else { "0" });

    format!("{}?{}", path, serializer.finish())
}

/// The listing a job was started from, e.g.
/// `/wp-admin/edit.php?post_type=page&post_status=draft`.
pub fn listing_url(screen_base: &str, post_type: &str, status: &StatusFilter) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("post_type", post_type)
        .append_pair("post_status", &status.to_string())
        .finish();
    format!("/wp-admin/{}.php?{}", screen_base, query)
}
