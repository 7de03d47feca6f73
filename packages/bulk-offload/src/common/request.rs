//! Explicit request context for a single admin listing request.
//!
//! The listing page's query/form parameters are captured once into a
//! [`RequestContext`]. Nothing mutates shared request state: claiming fields
//! consumes the context and hands back the residual parameters, so a
//! fallthrough path always sees either the untouched request or the fully
//! claimed one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::UserId;

/// The admin screen the request was made from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    /// Screen base, e.g. `edit` for post listings.
    pub base: String,
    /// Full screen id, e.g. `edit-post` or `edit-page`.
    pub id: String,
    /// Content type shown on the screen.
    pub post_type: String,
}

impl Screen {
    /// The standard listing screen for a post type.
    pub fn edit_listing(post_type: impl Into<String>) -> Self {
        let post_type = post_type.into();
        Self {
            base: "edit".to_string(),
            id: format!("edit-{}", post_type),
            post_type,
        }
    }

    pub fn is_edit_listing(&self) -> bool {
        self.base == "edit"
    }
}

/// Parameters of one inbound request plus the ambient identity and screen.
///
/// List parameters (`post[]=1&post[]=2`) are stored under their bare key
/// (`post`) with every value kept in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    user_id: UserId,
    screen: Screen,
    request_uri: String,
    params: BTreeMap<String, Vec<String>>,
}

/// Parameters removed from a request by [`RequestContext::claim`].
pub type ClaimedFields = BTreeMap<String, Vec<String>>;

impl RequestContext {
    pub fn new(user_id: UserId, screen: Screen, request_uri: impl Into<String>) -> Self {
        Self {
            user_id,
            screen,
            request_uri: request_uri.into(),
            params: BTreeMap::new(),
        }
    }

    /// Build a context from a raw request URI, parsing its query string.
    pub fn from_uri(user_id: UserId, screen: Screen, request_uri: &str) -> Self {
        let mut ctx = Self::new(user_id, screen, request_uri);
        if let Some((_, query)) = request_uri.split_once('?') {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                ctx.push_param(&key, value.into_owned());
            }
        }
        ctx
    }

    /// Add one parameter value (builder style).
    pub fn with_param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.push_param(key, value.into());
        self
    }

    /// Add several values for a list parameter (builder style).
    pub fn with_params<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.push_param(key, value.into());
        }
        self
    }

    fn push_param(&mut self, key: &str, value: String) {
        let key = key.strip_suffix("[]").unwrap_or(key);
        self.params.entry(key.to_string()).or_default().push(value);
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// First value of a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of a parameter, empty when absent.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Parameters whose key starts with `prefix`, e.g. `tax_input[`.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a [String])> + 'a {
        self.params
            .iter()
            .filter(move |(key, _)| key.starts_with(prefix))
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Status filter the listing was showing, if any.
    pub fn listing_status(&self) -> Option<&str> {
        self.get("post_status").filter(|status| !status.is_empty())
    }

    /// Content type the request targets: the explicit `post_type` parameter,
    /// falling back to the screen's type.
    pub fn post_type(&self) -> &str {
        self.get("post_type")
            .filter(|post_type| !post_type.is_empty())
            .unwrap_or(&self.screen.post_type)
    }

    /// Remove `keys` from the request, returning the removed values and the
    /// residual context. Keys that were absent are simply not in the claimed
    /// map.
    pub fn claim(mut self, keys: &[&str]) -> (ClaimedFields, RequestContext) {
        let mut claimed = ClaimedFields::new();
        for key in keys {
            if let Some(values) = self.params.remove(*key) {
                claimed.insert((*key).to_string(), values);
            }
        }
        (claimed, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RequestContext {
        RequestContext::new(UserId(1), Screen::edit_listing("post"), "/wp-admin/edit.php")
    }

    #[test]
    fn list_params_drop_brackets() {
        let ctx = ctx().with_params("post[]", ["3", "4"]);
        assert_eq!(ctx.get_all("post"), ["3".to_string(), "4".to_string()]);
        assert_eq!(ctx.get("post"), Some("3"));
    }

    #[test]
    fn parses_query_string_from_uri() {
        let ctx = RequestContext::from_uri(
            UserId(1),
            Screen::edit_listing("post"),
            "/wp-admin/edit.php?action=trash&post%5B%5D=10&post%5B%5D=11&post_status=draft",
        );
        assert_eq!(ctx.get("action"), Some("trash"));
        assert_eq!(ctx.get_all("post").len(), 2);
        assert_eq!(ctx.listing_status(), Some("draft"));
    }

    #[test]
    fn claim_splits_claimed_and_residual() {
        let ctx = ctx()
            .with_param("action", "trash")
            .with_param("action2", "-1")
            .with_param("paged", "2");

        let (claimed, residual) = ctx.claim(&["action", "action2", "missing"]);

        assert_eq!(claimed.len(), 2);
        assert!(!residual.contains("action"));
        assert!(!residual.contains("action2"));
        assert_eq!(residual.get("paged"), Some("2"));
    }

    #[test]
    fn post_type_falls_back_to_screen() {
        assert_eq!(ctx().post_type(), "post");
        assert_eq!(ctx().with_param("post_type", "page").post_type(), "page");
    }
}
