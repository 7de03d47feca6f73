//! Execution: dispatch, then let the runner consume the job.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::common::{bulk_request, empty_trash_request, listing_request, seeded_content, TestHarness};
use bulk_offload::common::PostId;
use bulk_offload::domains::bulk_actions::{
    ActionKind, CustomBulkAction, DispatchOutcome, HandlerRegistry, JobDescriptor, ResultRecord,
};
use bulk_offload::kernel::events::BulkActionEvent;
use bulk_offload::kernel::jobs::JobRunOutcome;
use bulk_offload::kernel::test_dependencies::{MockContentStore, MutationCall};
use bulk_offload::kernel::{BaseContentStore, Capability};
use test_context::test_context;

fn ids(values: &[u64]) -> BTreeSet<PostId> {
    values.iter().copied().map(PostId).collect()
}

fn completed(outcome: &JobRunOutcome) -> &ResultRecord {
    match outcome {
        JobRunOutcome::Completed(record) => record,
        other => panic!("expected a completed job, got {:?}", other),
    }
}

// ============================================================================
// Edit
// ============================================================================

#[tokio::test]
async fn edit_buckets_unauthorized_and_locked_items() {
    let content = MockContentStore::new()
        .with_posts([10, 20, 30], "post", "draft")
        .deny(20)
        .lock_post(30);
    let harness = TestHarness::with_content(content);
    let mut events = harness.deps.events.subscribe();

    let request = bulk_request("edit", Some("draft"), &[10, 20, 30])
        .with_param("_status", "publish")
        .with_param("post_author", "-1")
        .with_param("sticky", "-1");
    assert!(matches!(
        harness.dispatch(request).await,
        DispatchOutcome::Scheduled { .. }
    ));

    let outcomes = harness.run_due().await;
    let record = completed(&outcomes[0].1);

    assert_eq!(record.succeeded, ids(&[10]));
    assert_eq!(record.unauthorized, ids(&[20]));
    assert_eq!(record.locked, ids(&[30]));
    assert!(record.failed.is_empty());
    assert!(record.is_partition_of(&ids(&[10, 20, 30])));

    assert_eq!(harness.deps.content.status_of(10).as_deref(), Some("publish"));
    assert_eq!(harness.deps.content.status_of(20).as_deref(), Some("draft"));
    assert_eq!(harness.deps.content.status_of(30).as_deref(), Some("draft"));

    // Edit checks the edit capability, not the delete one.
    assert!(harness
        .deps
        .content
        .capability_checks()
        .iter()
        .all(|(_, _, capability)| *capability == Capability::EditPost));

    // Scheduled, then completed.
    assert!(matches!(events.recv().await.unwrap(), BulkActionEvent::Scheduled { .. }));
    match events.recv().await.unwrap() {
        BulkActionEvent::Completed { record: emitted, .. } => assert_eq!(&emitted, record),
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn edit_checks_edit_capability_and_trash_checks_delete() {
    let content = MockContentStore::new()
        .with_posts([10, 20], "post", "draft")
        .deny_capability(20, Capability::DeletePost);
    let harness = TestHarness::with_content(content);

    harness
        .dispatch(bulk_request("edit", Some("draft"), &[10, 20]).with_param("_status", "pending"))
        .await;
    let outcomes = harness.run_due().await;
    assert_eq!(completed(&outcomes[0].1).succeeded, ids(&[10, 20]));

    harness.dispatch(bulk_request("trash", Some("pending"), &[10, 20])).await;
    let outcomes = harness.run_due().await;
    let record = completed(&outcomes[0].1);
    assert_eq!(record.succeeded, ids(&[10]));
    assert_eq!(record.unauthorized, ids(&[20]));
    assert_eq!(harness.deps.content.status_of(20).as_deref(), Some("pending"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn edit_applies_sticky_and_keep_private(ctx: &TestHarness) {
    let request = bulk_request("edit", None, &[1, 2])
        .with_param("_status", "private")
        .with_param("sticky", "sticky")
        .with_param("keep_private", "private")
        .with_param("post_password", "secret");
    ctx.dispatch(request).await;
    ctx.run_due().await;

    let post = ctx.deps.content.post(1).unwrap();
    assert!(post.sticky);
    assert_eq!(post.status, "private");
    let update = post.last_update.unwrap();
    assert_eq!(update.password.as_deref(), Some(""));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn keep_private_ignored_for_other_statuses(ctx: &TestHarness) {
    let request = bulk_request("edit", None, &[3])
        .with_param("_status", "publish")
        .with_param("keep_private", "private")
        .with_param("post_password", "secret");
    ctx.dispatch(request).await;
    ctx.run_due().await;

    let post = ctx.deps.content.post(3).unwrap();
    assert_eq!(post.status, "publish");
    assert_eq!(post.last_update.unwrap().password.as_deref(), Some("secret"));
}

// ============================================================================
// Trash, restore, delete
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn trash_then_restore_round_trip(ctx: &TestHarness) {
    ctx.dispatch(bulk_request("trash", None, &[1, 2])).await;
    ctx.run_due().await;
    assert_eq!(ctx.deps.content.status_of(1).as_deref(), Some("trash"));

    ctx.dispatch(bulk_request("untrash", Some("trash"), &[1, 2])).await;
    let outcomes = ctx.run_due().await;

    assert_eq!(completed(&outcomes[0].1).succeeded, ids(&[1, 2]));
    assert_eq!(ctx.deps.content.status_of(1).as_deref(), Some("publish"));
}

#[tokio::test]
async fn rerunning_a_trash_job_is_idempotent() {
    let harness = TestHarness::with_content(seeded_content());
    let job_request = || bulk_request("trash", None, &[3]);

    harness.dispatch(job_request()).await;
    harness.run_due().await;
    harness.dispatch(job_request()).await;
    let outcomes = harness.run_due().await;

    assert_eq!(completed(&outcomes[0].1).succeeded, ids(&[3]));
    assert_eq!(harness.deps.content.status_of(3).as_deref(), Some("trash"));
}

#[tokio::test]
async fn failures_do_not_stop_the_batch() {
    let content = MockContentStore::new()
        .with_posts(1..=120, "post", "trash")
        .refuse(7)
        .error_on(60)
        .deny(99);
    let harness = TestHarness::with_content(content);
    let targets: Vec<u64> = (1..=120).collect();

    harness
        .dispatch(bulk_request("delete", Some("trash"), &targets))
        .await;
    let outcomes = harness.run_due().await;
    let record = completed(&outcomes[0].1);

    assert_eq!(record.failed, ids(&[7, 60]));
    assert_eq!(record.unauthorized, ids(&[99]));
    assert_eq!(record.succeeded.len(), 117);
    assert!(record.is_partition_of(&ids(&targets)));
    assert_eq!(harness.deps.content.release_count(), 2);
    assert!(harness.deps.content.exists(7));
    assert!(!harness.deps.content.exists(8));
}

// ============================================================================
// Empty trash
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn empty_trash_purges_items_trashed_before_it_runs(ctx: &TestHarness) {
    ctx.dispatch(empty_trash_request()).await;

    // Trashed after scheduling, before the runner fires.
    ctx.deps.content.trash(PostId(1)).await.unwrap();

    let outcomes = ctx.run_due().await;
    let record = completed(&outcomes[0].1);

    assert_eq!(record.succeeded, ids(&[1, 11, 12, 13, 14, 15]));
    assert!(!ctx.deps.content.exists(11));
    assert!(ctx.deps.content.exists(2));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn empty_trash_from_all_listing_keeps_published_posts(ctx: &TestHarness) {
    let request = listing_request(Some("all")).with_param("delete_all", "Empty Trash");
    ctx.dispatch(request).await;

    let outcomes = ctx.run_due().await;
    let record = completed(&outcomes[0].1);

    assert_eq!(record.succeeded, ids(&[11, 12, 13, 14, 15]));
    assert!((1..=10).all(|id| ctx.deps.content.exists(id)));
}

#[tokio::test]
async fn empty_trash_with_nothing_trashed_reports_no_posts() {
    let harness = TestHarness::with_content(MockContentStore::new().with_post(1, "post", "publish"));
    let mut events = harness.deps.events.subscribe();

    harness.dispatch(empty_trash_request()).await;
    let outcomes = harness.run_due().await;

    assert_eq!(outcomes[0].1, JobRunOutcome::NoPosts);
    assert!(matches!(events.recv().await.unwrap(), BulkActionEvent::Scheduled { .. }));
    assert!(matches!(events.recv().await.unwrap(), BulkActionEvent::NoPosts { .. }));
    assert!(harness.deps.content.calls().is_empty());
}

// ============================================================================
// Custom actions
// ============================================================================

struct MarkReviewed;

#[async_trait]
impl CustomBulkAction for MarkReviewed {
    fn name(&self) -> &str {
        "mark_reviewed"
    }

    fn capability(&self) -> Capability {
        Capability::Named("review_posts".to_string())
    }

    async fn apply(
        &self,
        content: &dyn BaseContentStore,
        _job: &JobDescriptor,
        post: PostId,
    ) -> Result<bool> {
        let update = bulk_offload::domains::bulk_actions::PostUpdate {
            status: Some("reviewed".to_string()),
            ..Default::default()
        };
        content.update_fields(post, &update).await
    }

    fn return_url(&self, listing_url: String, _job: &JobDescriptor, record: &ResultRecord) -> String {
        format!("{}&reviewed={}", listing_url, record.succeeded.len())
    }
}

#[tokio::test]
async fn registered_custom_action_runs_in_background() {
    let registry = HandlerRegistry::new().with_custom_action(Arc::new(MarkReviewed));
    let harness = TestHarness::with_registry(seeded_content().deny(2), registry);
    let mut events = harness.deps.events.subscribe();

    let outcome = harness
        .dispatch(bulk_request("mark_reviewed", Some("publish"), &[1, 2]))
        .await;
    assert!(outcome.redirect().unwrap().ends_with("bulk_offload_custom=1"));

    let outcomes = harness.run_due().await;
    let record = completed(&outcomes[0].1);
    assert_eq!(record.kind, ActionKind::Custom("mark_reviewed".into()));
    assert_eq!(record.succeeded, ids(&[1]));
    assert_eq!(record.unauthorized, ids(&[2]));
    assert_eq!(harness.deps.content.status_of(1).as_deref(), Some("reviewed"));
    assert_eq!(
        harness.deps.content.calls(),
        vec![MutationCall::Update(PostId(1))]
    );

    let _scheduled = events.recv().await.unwrap();
    match events.recv().await.unwrap() {
        BulkActionEvent::CustomCompleted { return_url, .. } => assert_eq!(
            return_url,
            "/wp-admin/edit.php?post_type=post&post_status=publish&reviewed=1"
        ),
        other => panic!("unexpected event {:?}", other),
    }
}
