//! Test harness wiring the dispatcher and job runner to in-memory
//! collaborators.
//!
//! Each test gets fresh collaborators; nothing is shared between tests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use test_context::AsyncTestContext;

use bulk_offload::common::RequestContext;
use bulk_offload::domains::bulk_actions::{
    visibility, DispatchOutcome, Dispatcher, Exclusion, HandlerRegistry, ListingQuery,
};
use bulk_offload::kernel::jobs::{JobRunOutcome, JobRunner, PendingJob, RunnerConfig};
use bulk_offload::kernel::test_dependencies::{MockContentStore, StaticNonceVerifier, TestDependencies};

use super::{seeded_content, NONCE};

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let outcome = ctx.dispatch(bulk_request("trash", None, &[1])).await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub deps: TestDependencies,
    pub registry: Arc<HandlerRegistry>,
    pub dispatcher: Dispatcher,
    pub runner: JobRunner,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::with_content(seeded_content())
    }

    async fn teardown(self) {
        self.runner.request_shutdown();
    }
}

impl TestHarness {
    /// Harness over the given content store.
    pub fn with_content(content: MockContentStore) -> Self {
        Self::with_registry(content, HandlerRegistry::new())
    }

    /// Harness with custom actions registered.
    pub fn with_registry(content: MockContentStore, registry: HandlerRegistry) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let deps = TestDependencies::new()
            .mock_content(content)
            .verifier(StaticNonceVerifier::new(NONCE));
        let registry = Arc::new(registry);
        let dispatcher = Dispatcher::new(deps.deps(), registry.clone());
        let config = RunnerConfig::builder()
            .pause(Duration::ZERO)
            .poll_interval(Duration::from_millis(10))
            .worker_id("test-runner")
            .build();
        let runner = JobRunner::new(deps.deps(), registry.clone(), config);

        Self {
            deps,
            registry,
            dispatcher,
            runner,
        }
    }

    /// Dispatch a request, panicking on verification or store errors.
    pub async fn dispatch(&self, ctx: RequestContext) -> DispatchOutcome {
        self.dispatcher
            .dispatch(ctx)
            .await
            .expect("dispatch failed")
    }

    /// Run every due job.
    pub async fn run_due(&self) -> Vec<(PendingJob, JobRunOutcome)> {
        self.runner.run_due().await.expect("run_due failed")
    }

    /// What the main listing query for `ctx`'s listing would hide.
    pub async fn exclusion(&self, ctx: &RequestContext) -> Result<Exclusion> {
        visibility::exclusion_for(
            &self.registry,
            self.deps.job_store.as_ref(),
            &ListingQuery::from_request(ctx),
        )
        .await
    }

    pub fn pending_count(&self) -> usize {
        self.deps.job_store.len()
    }
}
