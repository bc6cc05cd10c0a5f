use thiserror::Error;

/// Rejected pipeline configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("batch_size must be at least 1")]
    ZeroBatchSize,

    #[error("top_n must be at least 1")]
    ZeroTopN,

    #[error("cap_per_group must be at least 1")]
    ZeroCapPerGroup,

    #[error("failure_rate {0} is outside [0, 1]")]
    InvalidFailureRate(f64),

    #[error("Insert statement is empty")]
    EmptyStatement,
}
