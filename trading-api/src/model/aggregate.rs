//! Per-instrument aggregates produced by the best-trades report.

use crate::model::trade::Direction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade count and bounded price sum for one instrument on one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateEntry {
    instrument_id: String,
    /// Number of matching records, not capped.
    trade_count: usize,
    /// Sum of price over the first `cap_per_group` records after ordering.
    bounded_sum: Decimal,
}

impl AggregateEntry {
    pub fn new(instrument_id: impl Into<String>, trade_count: usize, bounded_sum: Decimal) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            trade_count,
            bounded_sum,
        }
    }

    pub fn instrument_id(&self) -> &str {
        &self.instrument_id
    }

    pub fn trade_count(&self) -> usize {
        self.trade_count
    }

    pub fn bounded_sum(&self) -> Decimal {
        self.bounded_sum
    }
}

impl fmt::Display for AggregateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{}",
            self.instrument_id, self.bounded_sum, self.trade_count
        )
    }
}

/// Ranked aggregates for one trade direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestTradesReport {
    direction: Direction,
    entries: Vec<AggregateEntry>,
}

impl BestTradesReport {
    pub fn new(direction: Direction, entries: Vec<AggregateEntry>) -> Self {
        Self { direction, entries }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn entries(&self) -> &[AggregateEntry] {
        &self.entries
    }

    /// One rendered line per entry, best first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for BestTradesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Best {}S", self.direction)?;
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
