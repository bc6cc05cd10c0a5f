//! Command-line arguments shared by every trade-loader subcommand.
//!
//! Flattened into each subcommand so that `--config` and `--data-dir` behave
//! the same everywhere.

use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct CommonArgs {
    /// Path to a JSON pipeline configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the trade list, journal and run summary
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,
}

impl CommonArgs {
    pub fn new(config: Option<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            data_dir: data_dir.into(),
        }
    }

    /// Returns the configuration file, if one was given.
    pub fn get_config_file(&self) -> Option<PathBuf> {
        self.config.clone()
    }

    /// Returns the path to the data directory.
    pub fn get_data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Harness {
        #[command(flatten)]
        common: CommonArgs,
    }

    #[test]
    fn test_defaults_and_overrides() {
        let harness = Harness::parse_from(["test"]);
        assert_eq!(harness.common.get_data_dir(), PathBuf::from("./data"));
        assert!(harness.common.get_config_file().is_none());

        let harness =
            Harness::parse_from(["test", "--config", "cfg.json", "--data-dir", "/tmp/run"]);
        assert_eq!(harness.common.get_config_file(), Some(PathBuf::from("cfg.json")));
        assert_eq!(harness.common.get_data_dir(), PathBuf::from("/tmp/run"));
    }
}
