use std::path::PathBuf;

use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0}")]
    Engine(#[from] EngineError),
    #[error("failed to read {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid setting: {0}")]
    Setting(String),
    #[error("invalid input: {0}")]
    Input(String),
}

impl AppError {
    /// Process exit code: a bad exchange rate is told apart from every other
    /// failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Engine(EngineError::InvalidRate(_)) => 2,
            _ => 1,
        }
    }
}
