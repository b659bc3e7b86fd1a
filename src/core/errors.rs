use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for period resolution, progress computation, config and storage.
#[derive(Error, Debug)]
pub enum ControlError {
    #[error("Invalid period type: {0}")]
    InvalidPeriodType(String),
    #[error("Invalid reset day {0}: expected a day between 1 and 31")]
    InvalidResetDay(u32),
    #[error("Invalid reset weekday {0}: expected 0 (Sunday) through 6 (Saturday)")]
    InvalidResetWeekday(u32),
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),
    #[error("Control not found: {0}")]
    ControlNotFound(String),
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Persistence error: {0}")]
    StorageError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = StdResult<T, ControlError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] ControlError),
    #[error("Invalid input: {0}")]
    Input(String),
}

impl From<std::io::Error> for ControlError {
    fn from(err: std::io::Error) -> Self {
        ControlError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for ControlError {
    fn from(err: serde_json::Error) -> Self {
        ControlError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Core(ControlError::from(err))
    }
}
