//! # Trading Core Library
//!
//! Persists trade lists in fixed-size batches with bounded per-batch retries
//! and produces the best-trades report per direction.
//!
//! ## Modules
//! - `batcher`: Lazy, order-preserving partitioning into batches.
//! - `committer`: Retrying batch committer and its per-batch state machine.
//! - `aggregator`: Top-N bounded-sum ranking per instrument.
//! - `sink`: In-memory, journal-file and fault-injecting sink adapters.
//! - `pipeline`: Commit-then-report orchestration with phase timings.
//! - `config`: JSON pipeline configuration.
//! - `fs`: Data directory layout and JSON persistence.
//! - `args`: Command-line arguments shared by the CLI subcommands.
//! - `generator`: Synthetic trade lists.

pub mod aggregator;
pub mod args;
pub mod batcher;
pub mod committer;
pub mod config;
pub mod error;
pub mod fs;
pub mod generator;
pub mod pipeline;
pub mod sink;
pub mod timing;

pub use aggregator::{top_n, BestOrder, RankOrder, TopNQuery};
pub use batcher::{batches, partition};
pub use committer::{BatchOutcome, BatchState, CommitReport, RetryingCommitter};
pub use config::{FaultConfig, PipelineConfig};
pub use error::ConfigError;
pub use pipeline::{Pipeline, PipelineSummary};
