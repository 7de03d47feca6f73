use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::kernel::jobs::RunnerConfig;

/// Runner configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub batch_size: usize,
    pub pause_ms: u64,
    pub poll_interval_ms: u64,
    pub claim_limit: usize,
    pub worker_id: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            batch_size: lookup("BULK_OFFLOAD_BATCH_SIZE")
                .unwrap_or_else(|| "50".to_string())
                .parse()
                .context("BULK_OFFLOAD_BATCH_SIZE must be a valid number")?,
            pause_ms: lookup("BULK_OFFLOAD_PAUSE_MS")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("BULK_OFFLOAD_PAUSE_MS must be a valid number")?,
            poll_interval_ms: lookup("BULK_OFFLOAD_POLL_INTERVAL_MS")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .context("BULK_OFFLOAD_POLL_INTERVAL_MS must be a valid number")?,
            claim_limit: lookup("BULK_OFFLOAD_CLAIM_LIMIT")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("BULK_OFFLOAD_CLAIM_LIMIT must be a valid number")?,
            worker_id: lookup("BULK_OFFLOAD_WORKER_ID").filter(|id| !id.is_empty()),
        })
    }

    pub fn runner_config(&self) -> RunnerConfig {
        let config = RunnerConfig::builder()
            .batch_size(self.batch_size)
            .pause(Duration::from_millis(self.pause_ms))
            .poll_interval(Duration::from_millis(self.poll_interval_ms))
            .claim_limit(self.claim_limit);

        match &self.worker_id {
            Some(worker_id) => config.worker_id(worker_id.clone()).build(),
            None => config.build(),
        }
    }
}
