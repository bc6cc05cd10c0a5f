//! Concrete `TransactionalSink` adapters.
//!
//! - [`memory`]: keeps committed rows in a vector, with a call log.
//! - [`journal`]: appends committed rows to a JSON-lines file.
//! - [`fault`]: wraps another sink and injects statement failures.
//!
//! The in-memory and journal adapters share the same staging discipline:
//! statements accumulate in the single open transaction and only become
//! visible on commit.

pub mod fault;
pub mod journal;
pub mod memory;

pub use fault::FaultInjectingSink;
pub use journal::{JournalEntry, JournalSink};
pub use memory::{CommittedRow, InMemorySink, SinkCall};

use crate::config::FaultConfig;
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use trading::{Operation, Param, SinkError, TransactionalSink};

/// Opens the journal at `path`, wrapped in a fault injector when `fault` is
/// set.
pub fn open_journal(
    path: &Path,
    fault: Option<&FaultConfig>,
) -> Result<Box<dyn TransactionalSink>> {
    let journal = JournalSink::open(path)?;
    match fault {
        Some(fault) if fault.failure_rate > 0.0 => {
            info!(
                "Injecting sink failures at rate {:.2} (seed {:?})",
                fault.failure_rate, fault.seed
            );
            Ok(Box::new(
                FaultInjectingSink::new(journal).with_random_failures(fault.failure_rate, fault.seed),
            ))
        }
        _ => Ok(Box::new(journal)),
    }
}

/// A statement accepted into a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedRow {
    pub operation: Operation,
    pub statement: String,
    pub params: Vec<Param>,
}

#[derive(Debug)]
pub(crate) struct OpenTransaction {
    pub(crate) name: String,
    pub(crate) rows: Vec<StagedRow>,
}

/// Single-slot transaction staging area.
#[derive(Debug, Default)]
pub(crate) struct Staging {
    open: Option<OpenTransaction>,
}

impl Staging {
    pub(crate) fn open_name(&self) -> Option<&str> {
        self.open.as_ref().map(|tx| tx.name.as_str())
    }

    pub(crate) fn begin(&mut self, name: &str) -> Result<(), SinkError> {
        if let Some(tx) = &self.open {
            return Err(SinkError::TransactionInProgress(tx.name.clone()));
        }
        self.open = Some(OpenTransaction {
            name: name.to_string(),
            rows: Vec::new(),
        });
        Ok(())
    }

    pub(crate) fn push(&mut self, row: StagedRow) -> Result<(), SinkError> {
        let tx = self.open.as_mut().ok_or(SinkError::NoOpenTransaction)?;
        tx.rows.push(row);
        Ok(())
    }

    /// The open transaction, if it is the one named.
    pub(crate) fn get(&self, name: &str) -> Result<&OpenTransaction, SinkError> {
        let tx = self.open.as_ref().ok_or(SinkError::NoOpenTransaction)?;
        if tx.name != name {
            return Err(SinkError::TransactionMismatch {
                open: tx.name.clone(),
                requested: name.to_string(),
            });
        }
        Ok(tx)
    }

    /// Closes the named transaction and hands back its rows.
    pub(crate) fn take(&mut self, name: &str) -> Result<OpenTransaction, SinkError> {
        self.get(name)?;
        self.open.take().ok_or(SinkError::NoOpenTransaction)
    }

    /// Drops the named transaction. Rolling back with nothing open is a no-op.
    pub(crate) fn discard(&mut self, name: &str) -> Result<usize, SinkError> {
        if self.open.is_none() {
            return Ok(0);
        }
        Ok(self.take(name)?.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> StagedRow {
        StagedRow {
            operation: Operation::Insert,
            statement: "INSERT".into(),
            params: vec![Param::Text("X".into())],
        }
    }

    #[test]
    fn test_only_one_open_transaction() {
        let mut staging = Staging::default();
        staging.begin("no 0").unwrap();
        assert!(matches!(
            staging.begin("no 1"),
            Err(SinkError::TransactionInProgress(name)) if name == "no 0"
        ));
    }

    #[test]
    fn test_take_checks_the_name() {
        let mut staging = Staging::default();
        staging.begin("no 0").unwrap();
        staging.push(row()).unwrap();
        assert!(matches!(
            staging.take("no 1"),
            Err(SinkError::TransactionMismatch { .. })
        ));
        let tx = staging.take("no 0").unwrap();
        assert_eq!(tx.rows.len(), 1);
        assert_eq!(staging.open_name(), None);
    }

    #[test]
    fn test_discard_without_open_transaction_is_noop() {
        let mut staging = Staging::default();
        assert_eq!(staging.discard("no 3").unwrap(), 0);
        assert!(matches!(staging.push(row()), Err(SinkError::NoOpenTransaction)));
    }
}
