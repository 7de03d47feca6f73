//! Listing filter hiding items that have a pending bulk job.
//!
//! Applies only to the main query of the admin edit listing. Exclusion is by
//! id (or by everything, for a pending purge); statuses are never rewritten.

use std::collections::BTreeSet;

use anyhow::Result;
use tracing::debug;
use typed_builder::TypedBuilder;

use super::handlers::{self, HandlerRegistry};
use crate::common::{PostId, RequestContext, Screen};
use crate::kernel::jobs::JobStore;

// =============================================================================
// Listing query
// =============================================================================

/// The parts of a listing query the filter looks at.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ListingQuery {
    #[builder(default = true)]
    pub is_admin: bool,
    /// False for side queries such as count widgets.
    #[builder(default = true)]
    pub is_main_query: bool,
    #[builder(default, setter(strip_option))]
    pub screen: Option<Screen>,
    #[builder(setter(into))]
    pub post_type: String,
    #[builder(default, setter(strip_option, into))]
    pub post_status: Option<String>,
}

impl ListingQuery {
    /// The main admin query for the listing a request was made from.
    pub fn from_request(ctx: &RequestContext) -> Self {
        Self {
            is_admin: true,
            is_main_query: true,
            screen: Some(ctx.screen().clone()),
            post_type: ctx.post_type().to_string(),
            post_status: ctx.listing_status().map(str::to_string),
        }
    }

    fn is_filterable(&self) -> bool {
        self.is_admin
            && self.is_main_query
            && self.screen.as_ref().is_some_and(Screen::is_edit_listing)
    }
}

// =============================================================================
// Exclusion
// =============================================================================

/// Rows a listing must hide.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Exclusion {
    #[default]
    None,
    Ids(BTreeSet<PostId>),
    All,
}

impl Exclusion {
    pub fn from_ids(ids: BTreeSet<PostId>) -> Self {
        if ids.is_empty() {
            Exclusion::None
        } else {
            Exclusion::Ids(ids)
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Exclusion::None)
    }

    /// Combine two exclusions; `All` absorbs everything.
    pub fn merge(self, other: Exclusion) -> Exclusion {
        match (self, other) {
            (Exclusion::All, _) | (_, Exclusion::All) => Exclusion::All,
            (Exclusion::None, other) | (other, Exclusion::None) => other,
            (Exclusion::Ids(mut a), Exclusion::Ids(b)) => {
                a.extend(b);
                Exclusion::Ids(a)
            }
        }
    }

    pub fn excludes(&self, id: PostId) -> bool {
        match self {
            Exclusion::None => false,
            Exclusion::Ids(ids) => ids.contains(&id),
            Exclusion::All => true,
        }
    }

    /// Drop excluded rows from a result set.
    pub fn retain(&self, rows: impl IntoIterator<Item = PostId>) -> Vec<PostId> {
        rows.into_iter().filter(|id| !self.excludes(*id)).collect()
    }

    /// Append the exclusion to a raw WHERE clause.
    pub fn apply_to_where(&self, where_clause: &str) -> String {
        match self {
            Exclusion::None => where_clause.to_string(),
            Exclusion::Ids(ids) => {
                let ids: Vec<String> = ids.iter().map(PostId::to_string).collect();
                format!("{} AND ID NOT IN({})", where_clause, ids.join(","))
            }
            Exclusion::All => format!("{} AND 1=0", where_clause),
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Everything a listing query must hide, across all handlers.
pub async fn exclusion_for(
    registry: &HandlerRegistry,
    store: &dyn JobStore,
    query: &ListingQuery,
) -> Result<Exclusion> {
    if !query.is_filterable() {
        return Ok(Exclusion::None);
    }

    let mut exclusion = Exclusion::None;
    for handler in registry.handlers() {
        let hidden = handlers::visible_predicate(
            handler,
            store,
            &query.post_type,
            query.post_status.as_deref(),
        )
        .await?;
        exclusion = exclusion.merge(hidden);
    }

    if !exclusion.is_none() {
        debug!(
            post_type = %query.post_type,
            post_status = ?query.post_status,
            exclusion = ?exclusion,
            "hiding items with pending bulk jobs"
        );
    }
    Ok(exclusion)
}

/// Query-modification hook: the listing's WHERE clause with pending items
/// excluded.
pub async fn filter_where(
    registry: &HandlerRegistry,
    store: &dyn JobStore,
    query: &ListingQuery,
    where_clause: &str,
) -> Result<String> {
    let exclusion = exclusion_for(registry, store, query).await?;
    Ok(exclusion.apply_to_where(where_clause))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::common::UserId;
    use crate::domains::bulk_actions::models::{ActionKind, JobDescriptor, StatusFilter};
    use crate::kernel::jobs::InMemoryJobStore;

    fn query(status: Option<&str>) -> ListingQuery {
        let query = ListingQuery::builder()
            .screen(Screen::edit_listing("post"))
            .post_type("post");
        match status {
            Some(status) => query.post_status(status).build(),
            None => query.build(),
        }
    }

    fn job(kind: ActionKind, status: Option<&str>, ids: &[u64]) -> JobDescriptor {
        JobDescriptor::builder()
            .kind(kind)
            .requestor_id(UserId(1))
            .target_type("post")
            .target_ids(ids.iter().copied().map(PostId).collect())
            .target_status(StatusFilter::from_listing(status))
            .build()
    }

    #[test]
    fn where_clause_rendering() {
        let ids = Exclusion::from_ids(BTreeSet::from([PostId(4), PostId(2)]));
        assert_eq!(ids.apply_to_where("1=1"), "1=1 AND ID NOT IN(2,4)");
        assert_eq!(Exclusion::All.apply_to_where("1=1"), "1=1 AND 1=0");
        assert_eq!(Exclusion::None.apply_to_where("1=1"), "1=1");
        assert!(Exclusion::from_ids(BTreeSet::new()).is_none());
    }

    #[test]
    fn merge_prefers_all() {
        let a = Exclusion::from_ids(BTreeSet::from([PostId(1)]));
        let b = Exclusion::from_ids(BTreeSet::from([PostId(2)]));
        assert_eq!(
            a.clone().merge(b),
            Exclusion::Ids(BTreeSet::from([PostId(1), PostId(2)]))
        );
        assert_eq!(a.merge(Exclusion::All), Exclusion::All);
    }

    #[tokio::test]
    async fn trash_jobs_hidden_outside_trash_only() {
        let store = InMemoryJobStore::new();
        let registry = HandlerRegistry::new();
        store
            .schedule(job(ActionKind::Trash, None, &[1, 2]), Utc::now())
            .await
            .unwrap();

        let all = exclusion_for(&registry, &store, &query(None)).await.unwrap();
        assert!(all.excludes(PostId(1)) && all.excludes(PostId(2)));
        assert!(!all.excludes(PostId(3)));

        let trash = exclusion_for(&registry, &store, &query(Some("trash"))).await.unwrap();
        assert!(trash.is_none());
    }

    #[tokio::test]
    async fn restore_jobs_hidden_in_trash_only() {
        let store = InMemoryJobStore::new();
        let registry = HandlerRegistry::new();
        store
            .schedule(job(ActionKind::Untrash, Some("trash"), &[7]), Utc::now())
            .await
            .unwrap();

        assert!(exclusion_for(&registry, &store, &query(None)).await.unwrap().is_none());
        assert_eq!(
            exclusion_for(&registry, &store, &query(Some("trash"))).await.unwrap(),
            Exclusion::Ids(BTreeSet::from([PostId(7)]))
        );
    }

    #[tokio::test]
    async fn side_queries_and_other_screens_untouched() {
        let store = InMemoryJobStore::new();
        let registry = HandlerRegistry::new();
        store
            .schedule(job(ActionKind::Edit, None, &[5]), Utc::now())
            .await
            .unwrap();

        let side = ListingQuery::builder()
            .is_main_query(false)
            .screen(Screen::edit_listing("post"))
            .post_type("post")
            .build();
        assert!(exclusion_for(&registry, &store, &side).await.unwrap().is_none());

        let upload = ListingQuery::builder()
            .screen(Screen {
                base: "upload".into(),
                id: "upload".into(),
                post_type: "attachment".into(),
            })
            .post_type("post")
            .build();
        assert!(exclusion_for(&registry, &store, &upload).await.unwrap().is_none());

        let front = ListingQuery::builder().is_admin(false).post_type("post").build();
        assert!(exclusion_for(&registry, &store, &front).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pending_purge_hides_whole_trash() {
        let store = InMemoryJobStore::new();
        let registry = HandlerRegistry::new();
        let purge = JobDescriptor::builder()
            .kind(ActionKind::DeleteAll)
            .requestor_id(UserId(1))
            .target_type("post")
            .target_status(StatusFilter::only(["trash"]))
            .build();
        store.schedule(purge, Utc::now()).await.unwrap();

        let trash = exclusion_for(&registry, &store, &query(Some("trash"))).await.unwrap();
        assert_eq!(trash, Exclusion::All);
        assert!(trash.retain([PostId(1), PostId(2)]).is_empty());

        assert!(exclusion_for(&registry, &store, &query(Some("draft"))).await.unwrap().is_none());
    }
}
