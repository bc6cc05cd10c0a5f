//! Pipeline configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Files are JSON and are validated on load.

use crate::aggregator::{DEFAULT_CAP_PER_GROUP, DEFAULT_TOP_N};
use crate::committer::DEFAULT_INSERT_STATEMENT;
use crate::error::ConfigError;
use crate::fs::read_json;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;

fn default_batch_size() -> usize {
    21
}

fn default_max_retries() -> u32 {
    3
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_cap_per_group() -> usize {
    DEFAULT_CAP_PER_GROUP
}

fn default_statement() -> String {
    DEFAULT_INSERT_STATEMENT.to_string()
}

/// Failure injection settings for the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultConfig {
    /// Probability that a single statement fails (0.0 to 1.0).
    pub failure_rate: f64,
    /// Seed for reproducible failure sequences.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Records per transaction.
    #[serde(default = "default_batch_size")]
    batch_size: usize,
    /// Attempts per batch before it is abandoned.
    #[serde(default = "default_max_retries")]
    max_retries: u32,
    /// Instruments reported per direction.
    #[serde(default = "default_top_n")]
    top_n: usize,
    /// Records summed per instrument.
    #[serde(default = "default_cap_per_group")]
    cap_per_group: usize,
    #[serde(default = "default_statement")]
    statement: String,
    #[serde(default)]
    fault: Option<FaultConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            top_n: default_top_n(),
            cap_per_group: default_cap_per_group(),
            statement: default_statement(),
            fault: None,
        }
    }
}

impl PipelineConfig {
    /// Loads and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = read_json(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        if self.cap_per_group == 0 {
            return Err(ConfigError::ZeroCapPerGroup);
        }
        if self.statement.trim().is_empty() {
            return Err(ConfigError::EmptyStatement);
        }
        if let Some(fault) = &self.fault {
            if !(0.0..=1.0).contains(&fault.failure_rate) {
                return Err(ConfigError::InvalidFailureRate(fault.failure_rate));
            }
        }
        Ok(())
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_cap_per_group(mut self, cap_per_group: usize) -> Self {
        self.cap_per_group = cap_per_group;
        self
    }

    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = statement.into();
        self
    }

    pub fn with_fault(mut self, fault: FaultConfig) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Batch size as a partition width, if valid.
    pub fn partition_size(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.batch_size).ok_or(ConfigError::ZeroBatchSize)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn cap_per_group(&self) -> usize {
        self.cap_per_group
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn fault(&self) -> Option<&FaultConfig> {
        self.fault.as_ref()
    }
}
