use std::path::PathBuf;
use thiserror::Error;
use trading_core::ConfigError;

/// Global error type for the trade loader.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The trade list to load does not exist.
    #[error("Trade list not found at {0}. Run `trade-loader generate` first?")]
    TradeListNotFound(PathBuf),

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Underlying IO failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reading or writing a data file.
    #[error(transparent)]
    Data(#[from] anyhow::Error),
}

/// A specialized Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;
