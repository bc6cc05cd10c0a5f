use std::path::{Path, PathBuf};

/// Default file names inside the data directory.
pub const TRADE_LIST_FILE: &str = "TradesList.json";
pub const JOURNAL_FILE: &str = "trades.journal.jsonl";
pub const SUMMARY_FILE: &str = "summary.json";

/// Resolves the standard files of a run relative to one data directory.
#[derive(Debug, Clone)]
pub struct PathManager {
    data_dir: PathBuf,
}

impl PathManager {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Creates a PathManager from the common arguments.
    pub fn from_args(args: &crate::args::CommonArgs) -> Self {
        Self::new(args.get_data_dir())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Generated or supplied trade list.
    pub fn trade_list(&self) -> PathBuf {
        self.data_dir.join(TRADE_LIST_FILE)
    }

    /// Journal written by the file sink.
    pub fn journal(&self) -> PathBuf {
        self.data_dir.join(JOURNAL_FILE)
    }

    /// Run summary written after a pipeline run.
    pub fn summary(&self) -> PathBuf {
        self.data_dir.join(SUMMARY_FILE)
    }

    /// Summary file stored in the same directory as `journal`.
    pub fn summary_beside(journal: &Path) -> PathBuf {
        match journal.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(SUMMARY_FILE),
            _ => PathBuf::from(SUMMARY_FILE),
        }
    }

    /// Ensures the data directory exists.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}
