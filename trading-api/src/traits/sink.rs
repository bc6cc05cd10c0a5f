//! Defines the `TransactionalSink` trait, the persistence boundary.
//!
//! The committer only ever talks to storage through these four calls. Any
//! backing store (a journal file, an in-memory table, a real database client)
//! plugs in by implementing the trait. Implementations hold at most one open
//! transaction at a time.

use crate::model::trade::Param;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of statement submitted inside a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Insert,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert => write!(f, "INSERT"),
        }
    }
}

/// Failure reported by a sink adapter.
///
/// The committer does not distinguish between variants: every error aborts
/// the current attempt.
#[derive(Error, Debug)]
pub enum SinkError {
    /// `begin_transaction` was called while another transaction is open.
    #[error("Transaction '{0}' is already in progress")]
    TransactionInProgress(String),

    /// A statement or commit arrived with no open transaction.
    #[error("No open transaction")]
    NoOpenTransaction,

    /// Commit/rollback named a transaction other than the open one.
    #[error("Open transaction is '{open}', not '{requested}'")]
    TransactionMismatch { open: String, requested: String },

    /// The adapter refused the statement.
    #[error("Statement rejected in transaction '{transaction}': {reason}")]
    Rejected { transaction: String, reason: String },

    /// Underlying IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode a row for storage.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Any other adapter-specific failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A store that accepts statements inside named transactions.
pub trait TransactionalSink {
    /// Opens a transaction under `name`.
    fn begin_transaction(&mut self, name: &str) -> Result<(), SinkError>;

    /// Submits one statement to the open transaction.
    ///
    /// # Arguments
    ///
    /// * `operation` - The statement kind.
    /// * `statement` - The statement template, e.g. `INSERT ... VALUES(@1, @2)`.
    /// * `params` - Values bound to the template placeholders, in order.
    fn process(
        &mut self,
        operation: Operation,
        statement: &str,
        params: &[Param],
    ) -> Result<(), SinkError>;

    /// Makes every statement of the open transaction durable.
    fn commit_transaction(&mut self, name: &str) -> Result<(), SinkError>;

    /// Discards every statement of the open transaction.
    fn rollback_transaction(&mut self, name: &str) -> Result<(), SinkError>;
}

impl TransactionalSink for Box<dyn TransactionalSink> {
    fn begin_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        (**self).begin_transaction(name)
    }

    fn process(
        &mut self,
        operation: Operation,
        statement: &str,
        params: &[Param],
    ) -> Result<(), SinkError> {
        (**self).process(operation, statement, params)
    }

    fn commit_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        (**self).commit_transaction(name)
    }

    fn rollback_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        (**self).rollback_transaction(name)
    }
}

impl<S: TransactionalSink + ?Sized> TransactionalSink for &mut S {
    fn begin_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        (**self).begin_transaction(name)
    }

    fn process(
        &mut self,
        operation: Operation,
        statement: &str,
        params: &[Param],
    ) -> Result<(), SinkError> {
        (**self).process(operation, statement, params)
    }

    fn commit_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        (**self).commit_transaction(name)
    }

    fn rollback_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        (**self).rollback_transaction(name)
    }
}
