use super::{StagedRow, Staging};
use trading::{Operation, Param, SinkError, TransactionalSink};

/// One call received by an [`InMemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Begin(String),
    Process(String),
    Commit(String),
    Rollback(String),
}

/// A committed row together with the transaction that carried it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedRow {
    pub transaction: String,
    pub row: StagedRow,
}

/// Volatile sink that keeps committed rows in memory.
///
/// Useful for tests and dry runs: `calls()` exposes the exact sequence of
/// begin/process/commit/rollback calls it received.
#[derive(Debug, Default)]
pub struct InMemorySink {
    staging: Staging,
    committed: Vec<CommittedRow>,
    calls: Vec<SinkCall>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> &[CommittedRow] {
        &self.committed
    }

    pub fn calls(&self) -> &[SinkCall] {
        &self.calls
    }

    pub fn open_transaction(&self) -> Option<&str> {
        self.staging.open_name()
    }

    /// Number of `begin_transaction` calls for `name`.
    pub fn attempts(&self, name: &str) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, SinkCall::Begin(n) if n == name))
            .count()
    }
}

impl TransactionalSink for InMemorySink {
    fn begin_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        self.calls.push(SinkCall::Begin(name.to_string()));
        self.staging.begin(name)
    }

    fn process(
        &mut self,
        operation: Operation,
        statement: &str,
        params: &[Param],
    ) -> Result<(), SinkError> {
        let open = self.staging.open_name().unwrap_or_default().to_string();
        self.calls.push(SinkCall::Process(open));
        self.staging.push(StagedRow {
            operation,
            statement: statement.to_string(),
            params: params.to_vec(),
        })
    }

    fn commit_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        self.calls.push(SinkCall::Commit(name.to_string()));
        let tx = self.staging.take(name)?;
        self.committed
            .extend(tx.rows.into_iter().map(|row| CommittedRow {
                transaction: tx.name.clone(),
                row,
            }));
        Ok(())
    }

    fn rollback_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        self.calls.push(SinkCall::Rollback(name.to_string()));
        self.staging.discard(name).map(|_| ())
    }
}
