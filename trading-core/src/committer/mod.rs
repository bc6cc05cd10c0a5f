//! Persists batches through a `TransactionalSink` with bounded retries.
//!
//! Each batch runs through a small state machine:
//!
//! ```text
//! Attempting{retry} --success--> Committed
//!        |  ^
//!   failure (rollback, retry += 1)
//!        v  |
//!   retry < max_retries ? Attempting : Abandoned
//! ```
//!
//! Batches are handled strictly in index order and a later batch is never
//! started before the previous one reached a terminal state. An abandoned
//! batch is recorded in the report and the run moves on.

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use trading::{Batch, Operation, SinkError, TradeRecord, TransactionalSink};

/// Statement submitted once per record.
pub const DEFAULT_INSERT_STATEMENT: &str =
    "INSERT INTO dbo.Trades(ISIN, Quantity, Price, Direction) VALUES(@1, @2, @3, @4);";

/// Where a batch currently is in its commit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Next attempt is pending; `retry` failures so far.
    Attempting { retry: u32 },
    Committed { retries: u32 },
    Abandoned { retries: u32 },
}

impl BatchState {
    pub fn initial() -> Self {
        BatchState::Attempting { retry: 0 }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BatchState::Attempting { .. })
    }

    /// Transition after the attempt committed.
    pub fn on_success(self) -> Self {
        match self {
            BatchState::Attempting { retry } => BatchState::Committed { retries: retry },
            terminal => terminal,
        }
    }

    /// Transition after the attempt failed and was rolled back.
    pub fn on_failure(self, max_retries: u32) -> Self {
        match self {
            BatchState::Attempting { retry } => {
                let retry = retry + 1;
                if retry >= max_retries {
                    BatchState::Abandoned { retries: retry }
                } else {
                    BatchState::Attempting { retry }
                }
            }
            terminal => terminal,
        }
    }
}

/// Terminal result for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchOutcome {
    Committed { index: usize, retries: u32 },
    Abandoned { index: usize, retries: u32 },
}

impl BatchOutcome {
    pub fn index(&self) -> usize {
        match self {
            BatchOutcome::Committed { index, .. } | BatchOutcome::Abandoned { index, .. } => *index,
        }
    }

    pub fn retries(&self) -> u32 {
        match self {
            BatchOutcome::Committed { retries, .. } | BatchOutcome::Abandoned { retries, .. } => {
                *retries
            }
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, BatchOutcome::Committed { .. })
    }
}

/// Counters for a whole commit run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    total_batches: usize,
    total_retries: u64,
    uncompleted_batch_indices: Vec<usize>,
    outcomes: Vec<BatchOutcome>,
}

impl CommitReport {
    fn record(&mut self, outcome: BatchOutcome) {
        self.total_batches += 1;
        self.total_retries += u64::from(outcome.retries());
        if !outcome.is_committed() {
            self.uncompleted_batch_indices.push(outcome.index());
        }
        self.outcomes.push(outcome);
    }

    pub fn total_batches(&self) -> usize {
        self.total_batches
    }

    /// Sum of per-batch retries across the run.
    pub fn total_retries(&self) -> u64 {
        self.total_retries
    }

    /// Indices of abandoned batches, ascending.
    pub fn uncompleted_batch_indices(&self) -> &[usize] {
        &self.uncompleted_batch_indices
    }

    pub fn outcomes(&self) -> &[BatchOutcome] {
        &self.outcomes
    }

    pub fn committed_batches(&self) -> usize {
        self.total_batches - self.uncompleted_batch_indices.len()
    }

    pub fn is_complete(&self) -> bool {
        self.uncompleted_batch_indices.is_empty()
    }
}

/// Commits batches one after another, retrying each up to `max_retries`
/// attempts.
pub struct RetryingCommitter<S> {
    sink: S,
    max_retries: u32,
    statement: String,
}

impl<S: TransactionalSink> RetryingCommitter<S> {
    pub fn new(sink: S, max_retries: u32) -> Self {
        Self {
            sink,
            max_retries,
            statement: DEFAULT_INSERT_STATEMENT.to_string(),
        }
    }

    pub fn with_statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = statement.into();
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Commits every batch in order and returns the run's counters.
    ///
    /// Never fails: batch failures are absorbed into the report.
    pub fn commit_all<I, R>(&mut self, batches: I) -> CommitReport
    where
        I: IntoIterator<Item = Batch<R>>,
        R: Borrow<TradeRecord>,
    {
        let mut report = CommitReport::default();
        for batch in batches {
            let outcome = self.commit_batch(&batch);
            report.record(outcome);
        }
        report
    }

    /// Drives one batch to a terminal state.
    pub fn commit_batch<R: Borrow<TradeRecord>>(&mut self, batch: &Batch<R>) -> BatchOutcome {
        let name = batch.transaction_name();
        let mut state = BatchState::initial();

        while let BatchState::Attempting { retry } = state {
            state = match self.attempt(&name, batch) {
                Ok(()) => state.on_success(),
                Err(e) => {
                    debug!("Error '{}' in transaction {}/{}", e, name, retry);
                    if let Err(rollback_err) = self.sink.rollback_transaction(&name) {
                        error!("Rollback of transaction {} failed: {}", name, rollback_err);
                    }
                    state.on_failure(self.max_retries)
                }
            };
        }

        match state {
            BatchState::Committed { retries: 0 } => {
                info!("Successful transaction {}.", name);
                BatchOutcome::Committed {
                    index: batch.index(),
                    retries: 0,
                }
            }
            BatchState::Committed { retries } => {
                info!("Successful transaction {} after {} retries.", name, retries);
                BatchOutcome::Committed {
                    index: batch.index(),
                    retries,
                }
            }
            BatchState::Abandoned { retries } | BatchState::Attempting { retry: retries } => {
                warn!(
                    "Uncompleted transaction {} abandoned after {} retries.",
                    name, retries
                );
                BatchOutcome::Abandoned {
                    index: batch.index(),
                    retries,
                }
            }
        }
    }

    /// One full pass over the batch: begin, one insert per record, commit.
    fn attempt<R: Borrow<TradeRecord>>(
        &mut self,
        name: &str,
        batch: &Batch<R>,
    ) -> Result<(), SinkError> {
        self.sink.begin_transaction(name)?;
        for record in batch.records() {
            let params = record.borrow().insert_params();
            self.sink
                .process(Operation::Insert, &self.statement, &params)?;
        }
        self.sink.commit_transaction(name)
    }
}
