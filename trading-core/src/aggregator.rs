//! Best-trades aggregation.
//!
//! For one direction, records are grouped per instrument, each group is
//! reduced to its full trade count and the price sum of its best
//! `cap_per_group` records, and the groups are ranked by that sum.
//!
//! "Best" depends on the side: buys rank lowest prices first, sells highest
//! prices first. The same order applies inside a group and across groups.
//! Equal sums are ordered by instrument identifier, ascending, so the output
//! never depends on hash map iteration order.
//!
//! A sum that leaves the decimal range saturates at `Decimal::MAX` (or
//! `Decimal::MIN`) and is logged; the group stays in the ranking.

use log::warn;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashMap;
use trading::{AggregateEntry, BestTradesReport, Decimal, Direction, TradeRecord};

/// Default number of records summed per instrument.
pub const DEFAULT_CAP_PER_GROUP: usize = 10;

/// Default number of instruments reported per direction.
pub const DEFAULT_TOP_N: usize = 3;

/// Sort order for prices and for bounded sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    Ascending,
    Descending,
}

impl RankOrder {
    pub fn compare(&self, a: &Decimal, b: &Decimal) -> Ordering {
        match self {
            RankOrder::Ascending => a.cmp(b),
            RankOrder::Descending => b.cmp(a),
        }
    }
}

/// Ranking used for a side's "best" trades.
pub trait BestOrder {
    fn best_order(&self) -> RankOrder;
}

impl BestOrder for Direction {
    fn best_order(&self) -> RankOrder {
        match self {
            Direction::Buy => RankOrder::Ascending,
            Direction::Sell => RankOrder::Descending,
        }
    }
}

/// Parameters of one top-N query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopNQuery {
    pub direction: Direction,
    pub n: usize,
    pub cap_per_group: usize,
    pub order: RankOrder,
}

impl TopNQuery {
    /// The standard report for `direction`: top 3, 10 records per instrument.
    pub fn best(direction: Direction) -> Self {
        Self {
            direction,
            n: DEFAULT_TOP_N,
            cap_per_group: DEFAULT_CAP_PER_GROUP,
            order: direction.best_order(),
        }
    }

    pub fn with_n(mut self, n: usize) -> Self {
        self.n = n;
        self
    }

    pub fn with_cap_per_group(mut self, cap_per_group: usize) -> Self {
        self.cap_per_group = cap_per_group;
        self
    }

    /// Runs the query and wraps the result for display.
    pub fn report<I, R>(&self, records: I) -> BestTradesReport
    where
        I: IntoIterator<Item = R>,
        R: Borrow<TradeRecord>,
    {
        BestTradesReport::new(self.direction, top_n(records, self))
    }
}

/// Top `query.n` instruments of `query.direction` by bounded price sum.
///
/// Records with a blank instrument identifier are skipped. A direction with no
/// matching records yields an empty result.
pub fn top_n<I, R>(records: I, query: &TopNQuery) -> Vec<AggregateEntry>
where
    I: IntoIterator<Item = R>,
    R: Borrow<TradeRecord>,
{
    let mut groups: HashMap<String, Vec<Decimal>> = HashMap::new();
    for record in records {
        let record = record.borrow();
        if record.direction() != query.direction {
            continue;
        }
        if let Some(key) = record.grouping_key() {
            groups
                .entry(key.to_string())
                .or_default()
                .push(record.price());
        }
    }

    let mut entries: Vec<AggregateEntry> = groups
        .into_iter()
        .map(|(instrument_id, mut prices)| {
            let trade_count = prices.len();
            prices.sort_unstable_by(|a, b| query.order.compare(a, b));
            let bounded_sum =
                saturating_sum(&instrument_id, prices.iter().take(query.cap_per_group));
            AggregateEntry::new(instrument_id, trade_count, bounded_sum)
        })
        .collect();

    entries.sort_by(|a, b| {
        query
            .order
            .compare(&a.bounded_sum(), &b.bounded_sum())
            .then_with(|| a.instrument_id().cmp(b.instrument_id()))
    });
    entries.truncate(query.n);
    entries
}

fn saturating_sum<'a>(
    instrument_id: &str,
    prices: impl Iterator<Item = &'a Decimal>,
) -> Decimal {
    let mut overflowed = false;
    let mut sum = Decimal::ZERO;
    for price in prices {
        sum = match sum.checked_add(*price) {
            Some(next) => next,
            None => {
                overflowed = true;
                sum.saturating_add(*price)
            }
        };
    }
    if overflowed {
        warn!("Price sum of {} overflowed, saturated to {}", instrument_id, sum);
    }
    sum
}
