//! Error type for table I/O and CLI boundary checks.
//!
//! Algorithmic outcomes (non-invertible primes, missing table entries) are
//! never errors; they are carried in the prediction result.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SplitLiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse order table {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid order table entry in {path}: {key} => {value}")]
    InvalidEntry {
        path: PathBuf,
        key: String,
        value: String,
    },

    #[error("Modulus must be a positive integer, got {0}")]
    InvalidModulus(String),

    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SplitLiftError>;
