use clap::Parser;
use log::{error, info};
use trading_core::fs::PathManager;
use trading_core::PipelineConfig;

pub mod args;
pub mod error;
pub mod generate;
pub mod run;

use args::{Cli, Commands};
use error::LoaderError;
use run::Overrides;

fn load_config(common: &trading_core::args::CommonArgs) -> Result<PipelineConfig, LoaderError> {
    match common.get_config_file() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Ok(PipelineConfig::load(&path)?)
        }
        None => Ok(PipelineConfig::default()),
    }
}

fn main() -> Result<(), LoaderError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate {
            common,
            count,
            seed,
            output,
        } => {
            let paths = PathManager::from_args(common);
            match generate::generate_trade_list(&paths, *count, *seed, output.as_deref()) {
                Ok(path) => info!("Trade list written to {}", path.display()),
                Err(e) => {
                    error!("Generation failed: {}", e);
                    return Err(e);
                }
            }
        }
        Commands::Run {
            common,
            input,
            journal,
            batch_size,
            max_retries,
            failure_rate,
            seed,
        } => {
            let paths = PathManager::from_args(common);
            let overrides = Overrides {
                batch_size: *batch_size,
                max_retries: *max_retries,
                failure_rate: *failure_rate,
                seed: *seed,
            };
            let config = run::resolve_config(load_config(common)?, &overrides)?;
            match run::run_pipeline(&paths, config, input.as_deref(), journal.as_deref()) {
                Ok(summary) => print!("{}", summary),
                Err(e) => {
                    error!("Run failed: {}", e);
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
