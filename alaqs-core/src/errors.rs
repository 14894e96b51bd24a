use thiserror::Error;

/// Error type for the emissions engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlaqsError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid flight mode '{0}'. Expected one of TX, AP, CO, TO")]
    InvalidMode(String),
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid temporal profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },
    #[error("Invalid interval: end {end} is not after start {start}")]
    InvalidInterval { start: String, end: String },
    #[error("Module '{module}' cannot {operation} while {state}")]
    InvalidState {
        module: String,
        operation: String,
        state: String,
    },
}

/// Convenience type for `Result<T, AlaqsError>`.
pub type AlaqsResult<T> = Result<T, AlaqsError>;
