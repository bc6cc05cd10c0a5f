use crate::model::trade::TradeRecord;

/// An ordered group of records committed together in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<T = TradeRecord> {
    index: usize,
    records: Vec<T>,
}

impl<T> Batch<T> {
    pub fn new(index: usize, records: Vec<T>) -> Self {
        Self { index, records }
    }

    /// Position of this batch in the overall partition.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Name of the sink transaction that carries this batch.
    ///
    /// Every attempt at the same batch reuses the same name.
    pub fn transaction_name(&self) -> String {
        format!("no {}", self.index)
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

impl<T> From<(usize, Vec<T>)> for Batch<T> {
    fn from((index, records): (usize, Vec<T>)) -> Self {
        Self::new(index, records)
    }
}
