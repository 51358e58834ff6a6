//! Configuration management and validation.
//!
//! Provides the merge configuration, including the policy that decides what
//! happens when two stations of one state report the same date.

use crate::constants::STATION_FILE_PATTERN;
use crate::error::{MergeError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// What to do with a reading whose date was already recorded for the state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Only the first station to report a date is kept for that date;
    /// readings from later stations are dropped. Reproduces the historical
    /// output files.
    #[default]
    FirstWins,
    /// Every station's reading is kept in the date's row
    Merge,
}

/// Global configuration for a merge run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Duplicate-date handling
    pub merge_policy: MergePolicy,

    /// Glob selecting station files, matched case-insensitively
    pub file_pattern: String,

    /// Write every `<STATE>.CSV` here instead of next to the state's data
    pub output_dir: Option<PathBuf>,

    /// Visit directory entries in name order instead of listing order
    pub sort_entries: bool,

    /// Station metadata file
    pub stations_path: Option<PathBuf>,

    /// Show a progress spinner while walking the tree
    pub show_progress: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::FirstWins,
            file_pattern: STATION_FILE_PATTERN.to_string(),
            output_dir: None,
            sort_entries: false,
            stations_path: None,
            show_progress: true,
        }
    }
}

impl MergeConfig {
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = pattern.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = Some(output_dir);
        self
    }

    /// Enable name-ordered traversal for reproducible row and column order
    pub fn with_sorted_entries(mut self) -> Self {
        self.sort_entries = true;
        self
    }

    pub fn with_stations_path(mut self, path: PathBuf) -> Self {
        self.stations_path = Some(path);
        self
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Check the configuration for values the merger cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.file_pattern.trim().is_empty() {
            return Err(MergeError::configuration("file pattern must not be empty"));
        }

        if let Some(output_dir) = &self.output_dir {
            if output_dir.exists() && !output_dir.is_dir() {
                return Err(MergeError::configuration(format!(
                    "Output path is not a directory: {}",
                    output_dir.display()
                )));
            }
        }

        debug!(
            "Configuration validated: policy={:?}, pattern={}, sorted={}",
            self.merge_policy, self.file_pattern, self.sort_entries
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = MergeConfig::default();
        assert_eq!(config.merge_policy, MergePolicy::FirstWins);
        assert_eq!(config.file_pattern, "TMAX*.CSV");
        assert!(config.output_dir.is_none());
        assert!(!config.sort_entries);
        assert!(config.show_progress);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = MergeConfig::default()
            .with_merge_policy(MergePolicy::Merge)
            .with_file_pattern("tmax_*.csv")
            .with_sorted_entries()
            .without_progress();

        assert_eq!(config.merge_policy, MergePolicy::Merge);
        assert_eq!(config.file_pattern, "tmax_*.csv");
        assert!(config.sort_entries);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let config = MergeConfig::default().with_file_pattern("  ");
        assert!(matches!(
            config.validate(),
            Err(MergeError::Configuration { .. })
        ));
    }

    #[test]
    fn test_output_dir_must_be_directory() {
        let file = NamedTempFile::new().unwrap();
        let config = MergeConfig::default().with_output_dir(file.path().to_path_buf());
        assert!(config.validate().is_err());
    }
}
