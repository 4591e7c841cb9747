use std::fmt::Display;

use thiserror::Error;

/// Unified error type for the domain, service and storage layers.
#[derive(Error, Debug)]
pub enum FinanceError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FinanceError>;

impl FinanceError {
    pub fn validation(message: impl Into<String>) -> Self {
        FinanceError::Validation(message.into())
    }

    /// Wraps a lower-level failure as a storage error carrying both the
    /// operation context and the underlying cause.
    pub fn storage(context: impl Display, cause: impl Display) -> Self {
        FinanceError::Storage(format!("{context}: {cause}"))
    }
}

impl From<std::io::Error> for FinanceError {
    fn from(err: std::io::Error) -> Self {
        FinanceError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for FinanceError {
    fn from(err: serde_json::Error) -> Self {
        FinanceError::Storage(err.to_string())
    }
}

impl From<csv::Error> for FinanceError {
    fn from(err: csv::Error) -> Self {
        FinanceError::Storage(err.to_string())
    }
}
