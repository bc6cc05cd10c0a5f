use clap::{Parser, Subcommand};
use std::path::PathBuf;
use trading_core::args::CommonArgs;

/// Batched trade loader CLI.
#[derive(Parser, Debug)]
#[command(name = "trade-loader")]
#[command(about = "Loads trade lists in retried batches and reports the best trades", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a synthetic trade list.
    Generate {
        #[command(flatten)]
        common: CommonArgs,

        /// Number of trades to generate.
        #[arg(short, long, default_value_t = 1000)]
        count: usize,

        /// Seed for a reproducible list.
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (default: <data-dir>/TradesList.json).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Commit a trade list to the journal and print the best trades.
    Run {
        #[command(flatten)]
        common: CommonArgs,

        /// Trade list to load (default: <data-dir>/TradesList.json).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Journal file (default: <data-dir>/trades.journal.jsonl).
        #[arg(long)]
        journal: Option<PathBuf>,

        /// Records per transaction.
        #[arg(long)]
        batch_size: Option<usize>,

        /// Attempts per batch before it is abandoned.
        #[arg(long)]
        max_retries: Option<u32>,

        /// Probability that a single insert fails (0.0 to 1.0).
        #[arg(long)]
        failure_rate: Option<f64>,

        /// Seed for the injected failures.
        #[arg(long)]
        seed: Option<u64>,
    },
}
