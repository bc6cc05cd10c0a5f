use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use trading::{TradeList, TradeRecord};

/// Writes `value` as pretty JSON, atomically.
///
/// The document goes to a uniquely named temp file in the target's
/// directory, is synced, then persisted over the target. Concurrent writers
/// never share a temp file and the temp file is removed on any failure.
///
/// # Arguments
///
/// * `path` - The target file path. Missing parent directories are created.
/// * `value` - The object to serialize.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut temp = NamedTempFile::new_in(dir).context("Failed to create temp file")?;
    {
        let mut writer = BufWriter::new(&mut temp);
        serde_json::to_writer_pretty(&mut writer, value)
            .context("Failed to serialize document")?;
        writer.flush().context("Failed to write temp file")?;
    }
    temp.as_file().sync_all().context("Failed to sync temp file")?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Reads a JSON document from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = std::io::BufReader::new(file);
    let value = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize {}", path.display()))?;
    Ok(value)
}

/// Loads the records of a serialized trade list.
pub fn load_trade_list(path: &Path) -> Result<Vec<TradeRecord>> {
    let list: TradeList = read_json(path)?;
    Ok(list.into_trades())
}

/// Persists `trades` as a trade-list document.
pub fn write_trade_list(path: &Path, trades: Vec<TradeRecord>) -> Result<()> {
    write_json(path, &TradeList::new(trades))
}

#[cfg(test)]
mod tests {
    use super::*;
    use trading::{Decimal, Direction};

    #[test]
    fn test_trade_list_survives_a_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("TradesList.json");
        let trades = vec![
            TradeRecord::new(Direction::Buy, "CZ0003", Decimal::from(4), Decimal::new(12345, 2)),
            TradeRecord::new(Direction::Sell, "CZ0005", Decimal::from(1), Decimal::new(99, 1)),
        ];

        write_trade_list(&path, trades.clone()).unwrap();
        assert_eq!(load_trade_list(&path).unwrap(), trades);
    }

    #[test]
    fn test_concurrent_writers_leave_one_complete_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");

        std::thread::scope(|scope| {
            for writer in 0..8u64 {
                let path = &path;
                scope.spawn(move || {
                    let values: Vec<u64> = (0..500).map(|i| i * writer).collect();
                    write_json(path, &values).unwrap();
                });
            }
        });

        let values: Vec<u64> = read_json(&path).unwrap();
        assert_eq!(values.len(), 500);
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("summary.json")]);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_json::<TradeList>(Path::new("/nonexistent/trades.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/trades.json"));
    }
}
