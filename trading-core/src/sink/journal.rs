use super::{StagedRow, Staging};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use trading::{Operation, Param, SinkError, TransactionalSink};

/// One committed statement as stored in the journal file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub transaction: String,
    pub committed_at: DateTime<Utc>,
    pub operation: Operation,
    pub statement: String,
    pub params: Vec<Param>,
}

/// File-backed sink writing committed statements as JSON lines.
///
/// Rows are staged in memory until commit. A commit encodes the whole
/// transaction into one buffer, appends it with a single write and syncs the
/// file before returning, so a rolled back transaction never touches disk.
/// A failed append is cut back to the previous file length, so a commit
/// error leaves no partial transaction behind.
pub struct JournalSink {
    file_path: PathBuf,
    staging: Staging,
    committed_rows: usize,
}

impl JournalSink {
    /// Creates a sink appending to `file_path`. The parent directory is
    /// created if missing; existing journal content is kept.
    pub fn open(file_path: impl Into<PathBuf>) -> Result<Self> {
        let file_path = file_path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create journal directory")?;
            }
        }
        Ok(Self {
            file_path,
            staging: Staging::default(),
            committed_rows: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Rows committed through this instance.
    pub fn committed_rows(&self) -> usize {
        self.committed_rows
    }

    /// Reads every entry of a journal file, in commit order.
    pub fn read_entries(path: &Path) -> Result<Vec<JournalEntry>> {
        let file = std::fs::File::open(path).context("Failed to open journal file")?;
        let mut entries = Vec::new();
        for (n, line) in BufReader::new(file).lines().enumerate() {
            let line = line.context("Failed to read journal line")?;
            if line.trim().is_empty() {
                continue;
            }
            let entry = serde_json::from_str(&line)
                .with_context(|| format!("Malformed journal entry at line {}", n + 1))?;
            entries.push(entry);
        }
        Ok(entries)
    }

    fn encode(name: &str, rows: &[StagedRow]) -> Result<String, SinkError> {
        let committed_at = Utc::now();
        let mut buffer = String::new();
        for row in rows {
            let entry = JournalEntry {
                transaction: name.to_string(),
                committed_at,
                operation: row.operation,
                statement: row.statement.clone(),
                params: row.params.clone(),
            };
            let line = serde_json::to_string(&entry)
                .map_err(|e| SinkError::Serialization(e.to_string()))?;
            buffer.push_str(&line);
            buffer.push('\n');
        }
        Ok(buffer)
    }
}

/// Append target that can be cut back to an earlier length.
trait JournalFile: Write {
    fn current_len(&self) -> io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl JournalFile for File {
    fn current_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Appends `buffer` and syncs; on failure the file is restored to its length
/// before the call.
fn append_whole<F: JournalFile>(file: &mut F, buffer: &[u8]) -> io::Result<()> {
    let original_len = file.current_len()?;
    let result = file.write_all(buffer).and_then(|()| file.sync());
    if let Err(e) = result {
        if let Err(truncate_err) = file.truncate_to(original_len) {
            error!(
                "Could not restore journal to {} bytes after failed append: {}",
                original_len, truncate_err
            );
        }
        return Err(e);
    }
    Ok(())
}

impl TransactionalSink for JournalSink {
    fn begin_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        self.staging.begin(name)
    }

    fn process(
        &mut self,
        operation: Operation,
        statement: &str,
        params: &[Param],
    ) -> Result<(), SinkError> {
        self.staging.push(StagedRow {
            operation,
            statement: statement.to_string(),
            params: params.to_vec(),
        })
    }

    fn commit_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        // The transaction stays open on failure so the caller can roll back.
        let tx = self.staging.get(name)?;
        let buffer = Self::encode(&tx.name, &tx.rows)?;
        let rows = tx.rows.len();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        append_whole(&mut file, buffer.as_bytes())?;

        self.staging.take(name)?;
        self.committed_rows += rows;
        debug!("Journaled {} rows for transaction {}", rows, name);
        Ok(())
    }

    fn rollback_transaction(&mut self, name: &str) -> Result<(), SinkError> {
        self.staging.discard(name).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trading::Decimal;

    fn insert(sink: &mut JournalSink, isin: &str, price: i64) {
        sink.process(
            Operation::Insert,
            "INSERT",
            &[Param::Text(isin.into()), Param::Decimal(Decimal::new(price, 2))],
        )
        .unwrap();
    }

    #[test]
    fn test_commit_appends_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal").join("trades.jsonl");
        let mut sink = JournalSink::open(&path).unwrap();

        sink.begin_transaction("no 0").unwrap();
        insert(&mut sink, "A", 1050);
        insert(&mut sink, "B", 990);
        sink.commit_transaction("no 0").unwrap();

        sink.begin_transaction("no 1").unwrap();
        insert(&mut sink, "C", 100);
        sink.commit_transaction("no 1").unwrap();

        let entries = JournalSink::read_entries(&path).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].transaction, "no 0");
        assert_eq!(entries[1].params[1], Param::Decimal(Decimal::new(990, 2)));
        assert_eq!(entries[2].transaction, "no 1");
        assert_eq!(sink.committed_rows(), 3);
    }

    #[test]
    fn test_rolled_back_rows_never_reach_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.jsonl");
        let mut sink = JournalSink::open(&path).unwrap();

        sink.begin_transaction("no 0").unwrap();
        insert(&mut sink, "A", 1);
        sink.rollback_transaction("no 0").unwrap();

        assert!(!path.exists());

        sink.begin_transaction("no 0").unwrap();
        insert(&mut sink, "A", 1);
        sink.commit_transaction("no 0").unwrap();
        assert_eq!(JournalSink::read_entries(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_commit_of_wrong_transaction_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JournalSink::open(dir.path().join("trades.jsonl")).unwrap();
        sink.begin_transaction("no 2").unwrap();
        let err = sink.commit_transaction("no 3").unwrap_err();
        assert!(matches!(err, SinkError::TransactionMismatch { .. }));
    }

    /// In-memory file accepting at most `capacity` bytes per append.
    struct ShortFile {
        data: Vec<u8>,
        capacity: usize,
        written: usize,
        fail_sync: bool,
    }

    impl ShortFile {
        fn new(existing: &[u8], capacity: usize, fail_sync: bool) -> Self {
            Self {
                data: existing.to_vec(),
                capacity,
                written: 0,
                fail_sync,
            }
        }
    }

    impl Write for ShortFile {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.capacity - self.written;
            if room == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
            }
            let n = room.min(buf.len());
            self.data.extend_from_slice(&buf[..n]);
            self.written += n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl JournalFile for ShortFile {
        fn current_len(&self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn truncate_to(&mut self, len: u64) -> io::Result<()> {
            self.data.truncate(len as usize);
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            if self.fail_sync {
                return Err(io::Error::new(io::ErrorKind::Other, "sync failed"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_short_write_leaves_previous_content() {
        let mut file = ShortFile::new(b"{\"kept\":1}\n", 5, false);
        let err = append_whole(&mut file, b"{\"row\":2}\n{\"row\":3}\n").unwrap_err();
        assert_eq!(err.to_string(), "no space left");
        assert_eq!(file.data, b"{\"kept\":1}\n");
    }

    #[test]
    fn test_failed_sync_removes_the_appended_rows() {
        let mut file = ShortFile::new(b"", usize::MAX, true);
        assert!(append_whole(&mut file, b"{\"row\":1}\n").is_err());
        assert!(file.data.is_empty());

        file.fail_sync = false;
        append_whole(&mut file, b"{\"row\":1}\n").unwrap();
        assert_eq!(file.data, b"{\"row\":1}\n");
    }
}
