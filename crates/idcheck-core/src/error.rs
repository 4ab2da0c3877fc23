//! Error types for report generation

use thiserror::Error;

/// Hard failures that abort report generation.
///
/// Schema problems inside a single record are not errors; they are collected
/// as [`crate::extract::Warning`] values instead.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("You should log in before start using idchecker.\nPlease run `idchecker --help` for instructions")]
    NotSignedIn,

    #[error("{0}")]
    CommandFailed(String),

    #[error("Vault CLI still failing after {attempts} attempts: {message}")]
    RetriesExhausted { attempts: u32, message: String },

    #[error("Failed to start vault CLI: {0}")]
    Spawn(std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidOutputDir(String),
}

pub type CheckResult<T> = Result<T, CheckError>;
