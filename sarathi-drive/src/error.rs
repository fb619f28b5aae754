//! Error types for SarathiDrive

use thiserror::Error;

/// SarathiDrive error type
#[derive(Error, Debug)]
pub enum SarathiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Thread error: {0}")]
    Thread(String),
}

impl From<toml::de::Error> for SarathiError {
    fn from(e: toml::de::Error) -> Self {
        SarathiError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SarathiError>;
