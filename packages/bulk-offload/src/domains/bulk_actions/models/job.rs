//! Job descriptor: the immutable snapshot of one bulk-action request.

use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use super::edit::EditFields;
use crate::common::{PostId, Screen, UserId};

/// Wildcard status meaning "any status".
pub const ANY_STATUS: &str = "all";

// ============================================================================
// Action kinds
// ============================================================================

/// Which bulk action a job performs.
///
/// The five native kinds have dedicated handlers. Every other action name is
/// carried as `Custom` so third-party bulk actions can be offloaded through
/// the same path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Edit,
    Trash,
    Untrash,
    Delete,
    DeleteAll,
    Custom(String),
}

impl ActionKind {
    /// Normalize a raw action name.
    pub fn from_action_name(name: &str) -> Self {
        match name {
            "edit" => ActionKind::Edit,
            "trash" => ActionKind::Trash,
            "untrash" => ActionKind::Untrash,
            "delete" => ActionKind::Delete,
            "delete_all" => ActionKind::DeleteAll,
            other => ActionKind::Custom(other.to_string()),
        }
    }

    /// The action name as it appears in requests.
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Edit => "edit",
            ActionKind::Trash => "trash",
            ActionKind::Untrash => "untrash",
            ActionKind::Delete => "delete",
            ActionKind::DeleteAll => "delete_all",
            ActionKind::Custom(name) => name,
        }
    }

    pub fn is_native(&self) -> bool {
        !matches!(self, ActionKind::Custom(_))
    }

    /// Whether the job's targets are resolved from a filter at execution time
    /// rather than listed up front.
    pub fn targets_by_filter(&self) -> bool {
        matches!(self, ActionKind::DeleteAll)
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Custom(name) => write!(f, "custom:{}", name),
            native => f.write_str(native.as_str()),
        }
    }
}

// ============================================================================
// Status filter
// ============================================================================

/// Status filter attached to a job.
///
/// For listing-driven kinds this is the status the listing was showing; for
/// `DeleteAll` it is the set of statuses to purge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    Any,
    Only(BTreeSet<String>),
}

impl StatusFilter {
    /// Interpret a listing's `post_status`; absent, empty and `all` are the
    /// wildcard.
    pub fn from_listing(status: Option<&str>) -> Self {
        match status.map(str::trim) {
            None | Some("") | Some(ANY_STATUS) => StatusFilter::Any,
            Some(status) => StatusFilter::Only(BTreeSet::from([status.to_string()])),
        }
    }

    pub fn only<I, S>(statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let statuses: BTreeSet<String> = statuses.into_iter().map(Into::into).collect();
        if statuses.is_empty() || statuses.contains(ANY_STATUS) {
            StatusFilter::Any
        } else {
            StatusFilter::Only(statuses)
        }
    }

    /// Compatibility used for dedup and visibility: equal filters match, and
    /// the wildcard on either side matches anything.
    pub fn matches(&self, other: &StatusFilter) -> bool {
        match (self, other) {
            (StatusFilter::Any, _) | (_, StatusFilter::Any) => true,
            (StatusFilter::Only(a), StatusFilter::Only(b)) => a == b,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, StatusFilter::Any)
    }

    /// Whether a concrete status falls inside this filter.
    pub fn includes(&self, status: &str) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::Only(statuses) => statuses.contains(status),
        }
    }

    pub fn statuses(&self) -> Vec<String> {
        match self {
            StatusFilter::Any => Vec::new(),
            StatusFilter::Only(statuses) => statuses.iter().cloned().collect(),
        }
    }
}

impl Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::Any => f.write_str(ANY_STATUS),
            StatusFilter::Only(statuses) => {
                let joined: Vec<&str> = statuses.iter().map(String::as_str).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

// ============================================================================
// Job descriptor
// ============================================================================

/// Snapshot of one bulk-action request, handed to the job store as payload.
///
/// Fields are private and there are no mutating methods: once built, a
/// descriptor only moves (dispatcher → job store → runner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct JobDescriptor {
    kind: ActionKind,
    requestor_id: UserId,
    #[builder(setter(into))]
    target_type: String,
    #[builder(
        default,
        setter(transform = |ids: Vec<PostId>| ids.into_iter().collect::<BTreeSet<PostId>>())
    )]
    target_ids: BTreeSet<PostId>,
    #[builder(default = StatusFilter::Any)]
    target_status: StatusFilter,
    #[builder(default, setter(strip_option))]
    screen: Option<Screen>,
    #[builder(default, setter(strip_option))]
    edit: Option<EditFields>,
}

impl JobDescriptor {
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    pub fn requestor_id(&self) -> UserId {
        self.requestor_id
    }

    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    /// Selected items, sorted and free of duplicates. Empty for `DeleteAll`.
    pub fn target_ids(&self) -> &BTreeSet<PostId> {
        &self.target_ids
    }

    pub fn target_status(&self) -> &StatusFilter {
        &self.target_status
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    pub fn edit(&self) -> Option<&EditFields> {
        self.edit.as_ref()
    }

    /// The exact (kind, target_type, target_status) fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.kind.clone(), self.target_type.clone(), self.target_status.clone())
    }
}

// ============================================================================
// Fingerprint
// ============================================================================

/// Key used to decide whether two jobs are equivalent.
///
/// Kind and target type must be equal; status uses [`StatusFilter::matches`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    pub kind: ActionKind,
    pub target_type: String,
    pub status: StatusFilter,
}

impl Fingerprint {
    pub fn new(kind: ActionKind, target_type: impl Into<String>, status: StatusFilter) -> Self {
        Self {
            kind,
            target_type: target_type.into(),
            status,
        }
    }

    pub fn matches(&self, job: &JobDescriptor) -> bool {
        self.kind == job.kind
            && self.target_type == job.target_type
            && self.status.matches(&job.target_status)
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.target_type, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trash_job(status: StatusFilter) -> JobDescriptor {
        JobDescriptor::builder()
            .kind(ActionKind::Trash)
            .requestor_id(UserId(1))
            .target_type("post")
            .target_ids(vec![PostId(3), PostId(1), PostId(3)])
            .target_status(status)
            .build()
    }

    #[test]
    fn action_names_normalize_to_kinds() {
        assert_eq!(ActionKind::from_action_name("delete_all"), ActionKind::DeleteAll);
        assert_eq!(
            ActionKind::from_action_name("mark_reviewed"),
            ActionKind::Custom("mark_reviewed".into())
        );
        assert!(!ActionKind::from_action_name("mark_reviewed").is_native());
        assert_eq!(ActionKind::Custom("x".into()).as_str(), "x");
    }

    #[test]
    fn target_ids_are_deduplicated_and_sorted() {
        let job = trash_job(StatusFilter::Any);
        let ids: Vec<u64> = job.target_ids().iter().map(|id| id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn listing_status_wildcards() {
        assert!(StatusFilter::from_listing(None).is_any());
        assert!(StatusFilter::from_listing(Some("all")).is_any());
        assert!(StatusFilter::from_listing(Some("")).is_any());
        assert!(!StatusFilter::from_listing(Some("draft")).is_any());
        assert!(StatusFilter::only(["trash", "all"]).is_any());
    }

    #[test]
    fn status_matching_is_exact_or_wildcard() {
        let draft = StatusFilter::from_listing(Some("draft"));
        let publish = StatusFilter::from_listing(Some("publish"));

        assert!(draft.matches(&draft.clone()));
        assert!(!draft.matches(&publish));
        assert!(draft.matches(&StatusFilter::Any));
        assert!(StatusFilter::Any.matches(&publish));
    }

    #[test]
    fn fingerprint_requires_kind_and_type() {
        let job = trash_job(StatusFilter::from_listing(Some("draft")));

        assert!(job.fingerprint().matches(&job));
        assert!(Fingerprint::new(ActionKind::Trash, "post", StatusFilter::Any).matches(&job));
        assert!(!Fingerprint::new(ActionKind::Untrash, "post", StatusFilter::Any).matches(&job));
        assert!(!Fingerprint::new(ActionKind::Trash, "page", StatusFilter::Any).matches(&job));
    }

    #[test]
    fn descriptor_serializes_for_the_job_store() {
        let job = trash_job(StatusFilter::Any);
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["kind"], "trash");
        assert_eq!(json["target_ids"], serde_json::json!([1, 3]));

        let back: JobDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, job);
    }
}
