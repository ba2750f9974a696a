//! Runner configuration: where prices come from, where rows go, and how the
//! batch is chunked and retried.
//!
//! ```toml
//! price_dir = "data/prices"
//! output_dir = "data/out"
//! dates_per_chunk = 20
//! threads = 8
//!
//! [retry]
//! max_retries = 3
//! base_delay_ms = 200
//!
//! [compute]
//! rsi_period = 14
//! weekly_boundary = "Sun-Thu"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use screenlab_core::config::{ComputeConfig, ConfigError};

use crate::retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Root of the Parquet price store.
    pub price_dir: PathBuf,
    /// Root of the row store (indicator rows, RS rows, checkpoint).
    pub output_dir: PathBuf,
    /// Trading dates persisted per chunk.
    pub dates_per_chunk: usize,
    /// Worker threads for the per-symbol fan-out; `None` = one per core.
    pub threads: Option<usize>,
    pub retry: RetryPolicy,
    pub compute: ComputeConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            price_dir: PathBuf::from("data/prices"),
            output_dir: PathBuf::from("data/out"),
            dates_per_chunk: 20,
            threads: None,
            retry: RetryPolicy::default(),
            compute: ComputeConfig::default(),
        }
    }
}

impl RunnerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dates_per_chunk == 0 {
            return Err(ConfigError::Invalid("dates_per_chunk must be >= 1".into()));
        }
        if self.threads == Some(0) {
            return Err(ConfigError::Invalid("threads must be >= 1 when set".into()));
        }
        self.retry.validate()?;
        self.compute.validate()
    }
}
