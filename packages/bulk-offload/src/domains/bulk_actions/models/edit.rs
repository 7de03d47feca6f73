//! Field mutations carried by an `Edit` job.
//!
//! Every field is optional: `None` means "leave unchanged", which is distinct
//! from setting an empty value.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::job::ANY_STATUS;
use crate::common::{PostId, UserId};

/// Edit fields exactly as captured from the bulk-edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditFields {
    pub post_author: Option<UserId>,
    pub comment_status: Option<String>,
    pub ping_status: Option<String>,
    /// New status (`_status`); the form's `-1` means unchanged.
    pub status: Option<String>,
    /// Raw sticky selector: `sticky`, `unsticky`, or anything else for
    /// unchanged.
    pub sticky: Option<String>,
    pub post_format: Option<String>,
    /// Terms to add, keyed by taxonomy.
    pub tax_input: BTreeMap<String, Vec<String>>,
    pub post_category: BTreeSet<u64>,
    pub post_parent: Option<PostId>,
    pub page_template: Option<String>,
    pub post_password: Option<String>,
    /// Raw "keep private" selector.
    pub keep_private: Option<String>,
}

/// Sticky flag change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sticky {
    Stick,
    Unstick,
}

/// The update applied to each item of an `Edit` job.
///
/// Produced by [`EditFields::to_update`], which reproduces the bulk-edit
/// coercions so that only fields that really participate end up here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUpdate {
    pub author: Option<UserId>,
    pub comment_status: Option<String>,
    pub ping_status: Option<String>,
    pub status: Option<String>,
    pub sticky: Option<Sticky>,
    pub format: Option<String>,
    pub terms: BTreeMap<String, Vec<String>>,
    pub categories: BTreeSet<u64>,
    pub parent: Option<PostId>,
    pub template: Option<String>,
    pub password: Option<String>,
}

impl PostUpdate {
    /// True when applying this update would change nothing.
    pub fn is_noop(&self) -> bool {
        *self == PostUpdate::default()
    }
}

impl EditFields {
    pub fn to_update(&self) -> PostUpdate {
        let status = self
            .status
            .clone()
            .filter(|status| status.as_str() != ANY_STATUS && status.as_str() != "-1");

        let sticky = match self.sticky.as_deref() {
            Some("sticky") => Some(Sticky::Stick),
            Some("unsticky") => Some(Sticky::Unstick),
            _ => None,
        };

        let mut password = self.post_password.clone();

        // Keep-private only applies when the new status is exactly private,
        // and private items cannot keep a password.
        if self.keep_private.as_deref() == Some("private") && status.as_deref() == Some("private") {
            password = Some(String::new());
        }

        PostUpdate {
            author: self.post_author,
            comment_status: self.comment_status.clone(),
            ping_status: self.ping_status.clone(),
            status,
            sticky,
            format: self.post_format.clone(),
            terms: self.tax_input.clone(),
            categories: self.post_category.clone(),
            parent: self.post_parent,
            template: self.page_template.clone(),
            password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_produce_noop_update() {
        assert!(EditFields::default().to_update().is_noop());
    }

    #[test]
    fn status_sentinels_mean_unchanged() {
        let all = EditFields {
            status: Some("all".into()),
            ..Default::default()
        };
        let minus_one = EditFields {
            status: Some("-1".into()),
            ..Default::default()
        };
        let draft = EditFields {
            status: Some("draft".into()),
            ..Default::default()
        };

        assert_eq!(all.to_update().status, None);
        assert_eq!(minus_one.to_update().status, None);
        assert_eq!(draft.to_update().status.as_deref(), Some("draft"));
    }

    #[test]
    fn sticky_selector_is_reinterpreted() {
        let update = |value: &str| {
            EditFields {
                sticky: Some(value.into()),
                ..Default::default()
            }
            .to_update()
            .sticky
        };

        assert_eq!(update("sticky"), Some(Sticky::Stick));
        assert_eq!(update("unsticky"), Some(Sticky::Unstick));
        assert_eq!(update("1"), None);
    }

    #[test]
    fn keep_private_requires_private_status() {
        let private = EditFields {
            keep_private: Some("private".into()),
            post_password: Some("secret".into()),
            status: Some("private".into()),
            ..Default::default()
        }
        .to_update();
        assert_eq!(private.status.as_deref(), Some("private"));
        assert_eq!(private.password.as_deref(), Some(""));

        let publish = EditFields {
            keep_private: Some("private".into()),
            post_password: Some("secret".into()),
            status: Some("publish".into()),
            ..Default::default()
        }
        .to_update();
        assert_eq!(publish.status.as_deref(), Some("publish"));
        assert_eq!(publish.password.as_deref(), Some("secret"));

        let unchanged = EditFields {
            keep_private: Some("private".into()),
            post_password: Some("secret".into()),
            ..Default::default()
        }
        .to_update();
        assert_eq!(unchanged.status, None);
        assert_eq!(unchanged.password.as_deref(), Some("secret"));
    }
}
