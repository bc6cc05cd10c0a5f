//! End-to-end run: commit every trade in batches, then report the best
//! trades per direction.
//!
//! The record slice is traversed twice (once by the committer, once per
//! report) so callers materialize it once up front.

use crate::aggregator::{BestOrder, TopNQuery};
use crate::batcher::batches;
use crate::committer::{CommitReport, RetryingCommitter};
use crate::config::PipelineConfig;
use crate::error::ConfigError;
use crate::timing::measure;
use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use trading::{BestTradesReport, Direction, TradeRecord, TransactionalSink};

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub trade_count: usize,
    pub commit: CommitReport,
    pub best_buys: BestTradesReport,
    pub best_sells: BestTradesReport,
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Committed {}/{} batches of {} trades ({} retries)",
            self.commit.committed_batches(),
            self.commit.total_batches(),
            self.trade_count,
            self.commit.total_retries()
        )?;
        for index in self.commit.uncompleted_batch_indices() {
            writeln!(f, "Uncompleted transaction no {}.", index)?;
        }
        write!(f, "{}", self.best_buys)?;
        write!(f, "{}", self.best_sells)
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    batch_size: NonZeroUsize,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let batch_size = config.partition_size()?;
        Ok(Self { config, batch_size })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Commits `trades` into `sink`, then builds both reports.
    pub fn run<S: TransactionalSink>(&self, trades: &[TradeRecord], sink: S) -> PipelineSummary {
        info!(
            "Processing {} trades in batches of {} (max {} retries)",
            trades.len(),
            self.batch_size,
            self.config.max_retries()
        );
        let commit = measure("Process database", || self.commit(trades, sink));
        let best_buys = measure("Best buys / from lower", || {
            self.best_trades(trades, Direction::Buy)
        });
        let best_sells = measure("Best sells / from higher", || {
            self.best_trades(trades, Direction::Sell)
        });

        PipelineSummary {
            trade_count: trades.len(),
            commit,
            best_buys,
            best_sells,
        }
    }

    /// Partitions `trades` and commits the batches in order.
    pub fn commit<S: TransactionalSink>(&self, trades: &[TradeRecord], sink: S) -> CommitReport {
        let mut committer = RetryingCommitter::new(sink, self.config.max_retries())
            .with_statement(self.config.statement());
        committer.commit_all(batches(trades.iter(), self.batch_size))
    }

    /// Ranked best trades for one side.
    pub fn best_trades(&self, trades: &[TradeRecord], direction: Direction) -> BestTradesReport {
        TopNQuery {
            direction,
            n: self.config.top_n(),
            cap_per_group: self.config.cap_per_group(),
            order: direction.best_order(),
        }
        .report(trades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::InMemorySink;
    use trading::Decimal;

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PipelineConfig::default().with_batch_size(0);
        assert!(matches!(Pipeline::new(config), Err(ConfigError::ZeroBatchSize)));
    }

    #[test]
    fn test_summary_rendering() {
        let trades = vec![
            TradeRecord::new(Direction::Buy, "X", Decimal::ONE, Decimal::from(10)),
            TradeRecord::new(Direction::Buy, "X", Decimal::ONE, Decimal::from(5)),
            TradeRecord::new(Direction::Buy, "Y", Decimal::ONE, Decimal::from(7)),
            TradeRecord::new(Direction::Sell, "Z", Decimal::ONE, Decimal::from(3)),
        ];
        let pipeline = Pipeline::new(PipelineConfig::default().with_batch_size(3)).unwrap();
        let summary = pipeline.run(&trades, InMemorySink::new());

        assert_eq!(
            summary.to_string(),
            "Committed 2/2 batches of 4 trades (0 retries)\n\
             Best BUYS\nY: 7/1\nX: 15/2\n\
             Best SELLS\nZ: 3/1\n"
        );
    }
}
