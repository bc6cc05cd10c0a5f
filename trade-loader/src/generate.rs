use crate::error::Result;
use log::info;
use std::path::{Path, PathBuf};
use trading_core::fs::{write_trade_list, PathManager};
use trading_core::generator::generate_seeded;

/// Writes `count` synthetic trades and returns the file path.
///
/// # Arguments
///
/// * `paths` - Data directory layout; used when `output` is not given.
/// * `count` - Number of trades.
/// * `seed` - Optional seed for a reproducible list.
/// * `output` - Explicit target file.
pub fn generate_trade_list(
    paths: &PathManager,
    count: usize,
    seed: Option<u64>,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let target = output.map(Path::to_path_buf).unwrap_or_else(|| paths.trade_list());
    let trades = generate_seeded(count, seed);
    info!("Creating test file of {} trades at {}", count, target.display());
    write_trade_list(&target, trades)?;
    Ok(target)
}
