use thiserror::Error;

/// Errors raised at the boundaries of the pipeline.
///
/// The scoring functions themselves never fail: degenerate input produces
/// zero-valued results. Only configuration, input-length checks and the
/// canon/config loaders return these.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("{name} must be a positive integer, got {value}")]
    InvalidWindow { name: &'static str, value: i64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("text too long: {len} characters (maximum {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("unknown module '{0}'")]
    UnknownModule(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
