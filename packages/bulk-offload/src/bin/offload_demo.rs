//! Demo of the bulk-action offload against an in-memory site
//!
//! Seeds a content store, dispatches one bulk request, shows what the
//! listing hides while the job is pending, then runs the due jobs and prints
//! the result record as JSON.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bulk_offload::common::{RequestContext, Screen, UserId};
use bulk_offload::config::Config;
use bulk_offload::domains::bulk_actions::{
    visibility, DispatchOutcome, Dispatcher, HandlerRegistry, ListingQuery, ResultRecord,
};
use bulk_offload::kernel::jobs::{JobRunOutcome, JobRunner};
use bulk_offload::kernel::test_dependencies::{MockContentStore, StaticNonceVerifier, TestDependencies};

const DEMO_NONCE: &str = "demo-nonce";

#[derive(Parser)]
#[command(name = "offload_demo")]
#[command(about = "Dispatch a bulk action and run it in the background")]
struct Cli {
    /// Number of published posts to seed
    #[arg(long, default_value_t = 120)]
    posts: u64,

    /// Number of trashed posts to seed (ids follow the published ones)
    #[arg(long, default_value_t = 20)]
    trashed: u64,

    /// Acting user
    #[arg(long, default_value_t = 1)]
    user: u64,

    /// Send the request twice to show deduplication
    #[arg(long)]
    repeat: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move posts to the trash
    Trash { ids: Vec<u64> },

    /// Restore posts from the trash
    Untrash { ids: Vec<u64> },

    /// Delete trashed posts permanently
    Delete { ids: Vec<u64> },

    /// Empty the trash
    EmptyTrash,

    /// Bulk edit posts
    Edit {
        ids: Vec<u64>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        sticky: bool,
    },
}

// ============================================================================
// JSON Output Types
// ============================================================================

#[derive(Serialize)]
struct DispatchReport {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect: Option<String>,
}

#[derive(Serialize)]
struct RunReport {
    job_id: String,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<ResultRecord>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("failed to encode output")?);
    Ok(())
}

fn id_params(ids: &[u64]) -> Vec<String> {
    ids.iter().map(u64::to_string).collect()
}

fn build_request(command: &Commands, user: UserId) -> RequestContext {
    let listing = |status: Option<&str>| {
        let ctx = RequestContext::new(user, Screen::edit_listing("post"), "/wp-admin/edit.php")
            .with_param("_wpnonce", DEMO_NONCE)
            .with_param("post_type", "post");
        match status {
            Some(status) => ctx.with_param("post_status", status),
            None => ctx,
        }
    };

    match command {
        Commands::Trash { ids: selected } => listing(None)
            .with_param("action", "trash")
            .with_params("post", id_params(selected)),
        Commands::Untrash { ids: selected } => listing(Some("trash"))
            .with_param("action", "untrash")
            .with_params("post", id_params(selected)),
        Commands::Delete { ids: selected } => listing(Some("trash"))
            .with_param("action", "delete")
            .with_params("post", id_params(selected)),
        Commands::EmptyTrash => listing(Some("trash")).with_param("delete_all", "Empty Trash"),
        Commands::Edit {
            ids: selected,
            status,
            sticky,
        } => {
            let ctx = listing(None)
                .with_param("action", "edit")
                .with_params("post", id_params(selected))
                .with_param("sticky", if *sticky { "sticky" } else { "-1" });
            match status {
                Some(status) => ctx.with_param("_status", status.as_str()),
                None => ctx.with_param("_status", "-1"),
            }
        }
    }
}

fn describe(outcome: &DispatchOutcome) -> DispatchReport {
    let name = match outcome {
        DispatchOutcome::ShortCircuited { .. } => "short_circuited",
        DispatchOutcome::Scheduled { .. } => "scheduled",
        DispatchOutcome::AlreadyPending { .. } => "already_pending",
        DispatchOutcome::Unhandled(_) => "unhandled",
    };
    DispatchReport {
        outcome: name,
        redirect: outcome.redirect().map(str::to_string),
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bulk_offload=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let content = MockContentStore::new()
        .with_posts(1..=cli.posts, "post", "publish")
        .with_posts(cli.posts + 1..=cli.posts + cli.trashed, "post", "trash");
    let test = TestDependencies::new()
        .mock_content(content)
        .verifier(StaticNonceVerifier::new(DEMO_NONCE));
    let deps = test.deps();
    let registry = Arc::new(HandlerRegistry::new());

    let dispatcher = Dispatcher::new(deps.clone(), registry.clone());
    let request = build_request(&cli.command, UserId(cli.user));
    let listing = ListingQuery::from_request(&request);

    let outcome = dispatcher.dispatch(request.clone()).await?;
    print_json(&describe(&outcome))?;

    if cli.repeat {
        let again = dispatcher.dispatch(request).await?;
        print_json(&describe(&again))?;
    }

    let hidden = visibility::filter_where(&registry, deps.job_store.as_ref(), &listing, "1=1").await?;
    tracing::info!(where_clause = %hidden, "listing filter while pending");

    let runner = JobRunner::new(deps, registry, config.runner_config());
    for (job, outcome) in runner.run_due().await? {
        let (name, record) = match outcome {
            JobRunOutcome::Completed(record) => ("completed", Some(record)),
            JobRunOutcome::NoPosts => ("no_posts", None),
            JobRunOutcome::Unhandled => ("unhandled", None),
            JobRunOutcome::Failed(_) => ("failed", None),
        };
        print_json(&RunReport {
            job_id: job.id.to_string(),
            outcome: name,
            record,
        })?;
    }

    Ok(())
}
