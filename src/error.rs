//! Error handling for state merge operations.
//!
//! Provides error types with context for traversal, station file reading,
//! and per-state output failures. Only startup errors are fatal; the flush
//! engine logs and counts everything else.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Data directory not found at path: {path}")]
    DatasetNotFound { path: PathBuf },

    #[error("Stations file not found at path: {path}")]
    StationsFileNotFound { path: PathBuf },

    #[error("Cannot read station file: {path} - {source}")]
    StationFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write state output: {path} - {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Directory traversal error: {0}")]
    Traversal(#[from] walkdir::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl MergeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MergeError>;
