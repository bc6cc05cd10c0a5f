use crate::error::{LoaderError, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use trading_core::fs::{load_trade_list, write_json, PathManager};
use trading_core::sink::open_journal;
use trading_core::timing::measure;
use trading_core::{FaultConfig, Pipeline, PipelineConfig, PipelineSummary};

/// CLI values that override the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub batch_size: Option<usize>,
    pub max_retries: Option<u32>,
    pub failure_rate: Option<f64>,
    pub seed: Option<u64>,
}

/// Applies command-line overrides on top of a loaded configuration.
pub fn resolve_config(base: PipelineConfig, overrides: &Overrides) -> Result<PipelineConfig> {
    let mut config = base;
    if let Some(batch_size) = overrides.batch_size {
        config = config.with_batch_size(batch_size);
    }
    if let Some(max_retries) = overrides.max_retries {
        config = config.with_max_retries(max_retries);
    }
    if overrides.failure_rate.is_some() || overrides.seed.is_some() {
        let current = config.fault().cloned();
        let failure_rate = overrides
            .failure_rate
            .or(current.as_ref().map(|f| f.failure_rate))
            .unwrap_or(0.0);
        let seed = overrides.seed.or(current.and_then(|f| f.seed));
        config = config.with_fault(FaultConfig { failure_rate, seed });
    }
    config.validate()?;
    Ok(config)
}

/// Loads the trade list, commits it to the journal and writes the summary
/// beside the journal.
pub fn run_pipeline(
    paths: &PathManager,
    config: PipelineConfig,
    input: Option<&Path>,
    journal: Option<&Path>,
) -> Result<PipelineSummary> {
    let input = input.map(Path::to_path_buf).unwrap_or_else(|| paths.trade_list());
    if !input.exists() {
        return Err(LoaderError::TradeListNotFound(input));
    }
    let journal: PathBuf = journal
        .map(Path::to_path_buf)
        .unwrap_or_else(|| paths.journal());

    let trades = measure("Reading trade list", || load_trade_list(&input))?;
    info!("Loaded {} trades from {}", trades.len(), input.display());

    let pipeline = Pipeline::new(config)?;
    let sink = open_journal(&journal, pipeline.config().fault())?;
    let summary = pipeline.run(&trades, sink);

    if !summary.commit.is_complete() {
        warn!(
            "{} of {} batches were abandoned",
            summary.commit.uncompleted_batch_indices().len(),
            summary.commit.total_batches()
        );
    }

    let summary_path = PathManager::summary_beside(&journal);
    write_json(&summary_path, &summary)?;
    info!("Summary written to {}", summary_path.display());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::generate_trade_list;
    use trading_core::sink::JournalSink;

    #[test]
    fn test_overrides_replace_config_values() {
        let overrides = Overrides {
            batch_size: Some(9),
            max_retries: Some(10),
            failure_rate: Some(0.3),
            seed: None,
        };
        let config = resolve_config(PipelineConfig::default(), &overrides).unwrap();
        assert_eq!(config.batch_size(), 9);
        assert_eq!(config.max_retries(), 10);
        assert_eq!(
            config.fault(),
            Some(&FaultConfig {
                failure_rate: 0.3,
                seed: None
            })
        );
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let overrides = Overrides {
            batch_size: Some(0),
            ..Default::default()
        };
        let err = resolve_config(PipelineConfig::default(), &overrides).unwrap_err();
        assert!(matches!(err, LoaderError::Config(_)));
    }

    #[test]
    fn test_missing_trade_list() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::new(dir.path());
        let err = run_pipeline(&paths, PipelineConfig::default(), None, None).unwrap_err();
        assert!(matches!(err, LoaderError::TradeListNotFound(_)));
    }

    #[test]
    fn test_generate_then_run() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::new(dir.path());
        generate_trade_list(&paths, 100, Some(5), None).unwrap();

        let summary = run_pipeline(&paths, PipelineConfig::default(), None, None).unwrap();
        assert_eq!(summary.trade_count, 100);
        assert!(summary.commit.is_complete());
        assert_eq!(JournalSink::read_entries(&paths.journal()).unwrap().len(), 100);
        assert!(paths.summary().exists());
    }

    #[test]
    fn test_summary_is_written_beside_a_custom_journal() {
        let data = tempfile::tempdir().unwrap();
        let audit = tempfile::tempdir().unwrap();
        let paths = PathManager::new(data.path());
        generate_trade_list(&paths, 10, Some(1), None).unwrap();

        let journal = audit.path().join("nightly").join("run.jsonl");
        run_pipeline(&paths, PipelineConfig::default(), None, Some(&journal)).unwrap();

        assert!(journal.exists());
        assert!(audit.path().join("nightly").join("summary.json").exists());
        assert!(!paths.summary().exists());
    }
}
