//! Error types for filters

use thiserror::Error;

/// Filter errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown dataset kind: {0}")]
    UnknownKind(String),

    #[error("Invalid kind assignment '{0}': expected FILE=KIND")]
    InvalidAssignment(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for filter operations
pub type Result<T> = std::result::Result<T, Error>;
