//! Job runner service for processing due bulk jobs.
//!
//! The `JobRunner` is the cron side of the offload:
//! - Polls the job store for due jobs (claiming removes them from pending)
//! - Looks up the handler for each job's kind
//! - Executes the job through the shared per-item loop
//!
//! # Architecture
//!
//! ```text
//! JobRunner
//!     │
//!     ├─► claim_due(now, claim_limit)
//!     ├─► HandlerRegistry::handler_for(kind)
//!     └─► executor::execute (batches, pauses, result record, event)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let runner = JobRunner::new(deps, registry, RunnerConfig::default());
//! let shutdown = runner.shutdown_handle();
//!
//! // Spawn as background task
//! tokio::spawn(runner.run());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{debug, error, info, warn};
use typed_builder::TypedBuilder;
use uuid::Uuid;

use super::store::PendingJob;
use crate::domains::bulk_actions::executor::{self, ExecutionSettings, DEFAULT_BATCH_SIZE, DEFAULT_PAUSE};
use crate::domains::bulk_actions::handlers::SharedHandlerRegistry;
use crate::domains::bulk_actions::models::ResultRecord;
use crate::kernel::OffloadDeps;

fn default_worker_id() -> String {
    format!("runner-{}", Uuid::new_v4())
}

/// Configuration for the job runner.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RunnerConfig {
    /// Items processed between buffer releases
    #[builder(default = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,
    /// Pause after each batch of items
    #[builder(default = DEFAULT_PAUSE)]
    pub pause: Duration,
    /// How long to wait when no jobs are due
    #[builder(default = Duration::from_secs(5))]
    pub poll_interval: Duration,
    /// Maximum number of jobs to claim at once
    #[builder(default = 10)]
    pub claim_limit: usize,
    /// Worker ID for this instance
    #[builder(default = default_worker_id(), setter(into))]
    pub worker_id: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RunnerConfig {
    pub fn execution_settings(&self) -> ExecutionSettings {
        ExecutionSettings::builder()
            .batch_size(self.batch_size)
            .pause(self.pause)
            .build()
    }
}

/// Result of running one claimed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRunOutcome {
    Completed(ResultRecord),
    /// Nothing to process (no selected items, or an empty trash).
    NoPosts,
    /// No handler for the job's kind; the job is dropped.
    Unhandled,
    /// Targets could not be resolved.
    Failed(String),
}

/// Background service that executes due bulk jobs.
pub struct JobRunner {
    deps: OffloadDeps,
    registry: SharedHandlerRegistry,
    config: RunnerConfig,
    shutdown: Arc<AtomicBool>,
}

impl JobRunner {
    pub fn new(deps: OffloadDeps, registry: SharedHandlerRegistry, config: RunnerConfig) -> Self {
        Self {
            deps,
            registry,
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Get a shutdown handle for graceful shutdown.
    ///
    /// Call `store(true, Ordering::SeqCst)` on the returned Arc to signal shutdown.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Request shutdown of the runner.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Claim every job due now and execute them one after another.
    ///
    /// Returns the outcome per claimed job, in claim order.
    pub async fn run_due(&self) -> Result<Vec<(PendingJob, JobRunOutcome)>> {
        let jobs = self
            .deps
            .job_store
            .claim_due(Utc::now(), self.config.claim_limit)
            .await?;

        if !jobs.is_empty() {
            debug!(count = jobs.len(), worker_id = %self.config.worker_id, "claimed bulk jobs");
        }

        let mut outcomes = Vec::with_capacity(jobs.len());
        for job in jobs {
            let outcome = self.run_one(&job).await;
            outcomes.push((job, outcome));
        }
        Ok(outcomes)
    }

    async fn run_one(&self, job: &PendingJob) -> JobRunOutcome {
        let kind = job.descriptor.kind();
        let Some(handler) = self.registry.handler_for(kind) else {
            warn!(job_id = %job.id, kind = %kind, "no handler for bulk job, dropping");
            return JobRunOutcome::Unhandled;
        };

        debug!(job_id = %job.id, handler = handler.name(), "executing bulk job");

        let settings = self.config.execution_settings();
        match executor::execute(handler, &self.deps, job.id, job.descriptor.clone(), &settings).await {
            Ok(Some(record)) => JobRunOutcome::Completed(record),
            Ok(None) => JobRunOutcome::NoPosts,
            Err(e) => {
                error!(job_id = %job.id, handler = handler.name(), error = %e, "bulk job failed");
                JobRunOutcome::Failed(e.to_string())
            }
        }
    }

    /// Run the job runner until shutdown is requested.
    pub async fn run(self) -> Result<()> {
        info!(
            worker_id = %self.config.worker_id,
            claim_limit = self.config.claim_limit,
            batch_size = self.config.batch_size,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "job runner starting"
        );

        loop {
            if self.is_shutdown_requested() {
                break;
            }

            match self.run_due().await {
                Ok(outcomes) if !outcomes.is_empty() => continue,
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "failed to claim bulk jobs");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
            }

            // Sleep until the next job is due, bounded by the poll interval.
            let sleep_for = match self.deps.job_store.next_run_time().await {
                Ok(Some(next)) => (next - Utc::now())
                    .to_std()
                    .unwrap_or(Duration::ZERO)
                    .min(self.config.poll_interval),
                Ok(None) => self.config.poll_interval,
                Err(e) => {
                    warn!(error = %e, "failed to read next run time");
                    self.config.poll_interval
                }
            };
            tokio::time::sleep(sleep_for).await;
        }

        info!(worker_id = %self.config.worker_id, "job runner stopped");
        Ok(())
    }

    /// Run until a shutdown signal is received.
    ///
    /// Convenience method that listens for Ctrl+C.
    pub async fn run_until_shutdown(self) -> Result<()> {
        let shutdown = self.shutdown_handle();

        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("received shutdown signal");
            shutdown.store(true, Ordering::SeqCst);
        });

        self.run().await
    }
}
