//! Command-line interface components.

use crate::config::{MergeConfig, MergePolicy};
use crate::constants::{DEFAULT_STATIONS_FILE, STATION_FILE_PATTERN};
use crate::error::{MergeError, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

/// CLI arguments for the state merger
///
/// Reads every TMAX*.CSV station file below DATA_PATH and writes one
/// combined <STATE>.CSV per state directory.
#[derive(Parser, Debug, Clone)]
#[command(name = "tmax_merge")]
#[command(about = "Merge daily maximum temperature station files into one CSV per state")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Folder containing the state folders with TMAX*.CSV station files
    #[arg(value_name = "DATA_PATH")]
    pub data_path: PathBuf,

    /// Station metadata file (defaults to stations.txt when present)
    #[arg(value_name = "STATIONS_FILE")]
    pub stations_file: Option<PathBuf>,

    /// How to treat a date already reported by another station of the state
    #[arg(long, value_enum, default_value_t = MergePolicy::FirstWins)]
    pub merge_policy: MergePolicy,

    /// Write all state files here instead of into each state folder
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Station file pattern, matched case-insensitively
    #[arg(long, default_value = STATION_FILE_PATTERN)]
    pub pattern: String,

    /// Visit folders and files in name order for reproducible column order
    #[arg(long)]
    pub sorted: bool,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress and the summary (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Validate paths before any processing starts
    pub fn validate(&self) -> Result<()> {
        if !self.data_path.is_dir() {
            return Err(MergeError::DatasetNotFound {
                path: self.data_path.clone(),
            });
        }

        if let Some(stations_file) = &self.stations_file {
            if !stations_file.is_file() {
                return Err(MergeError::StationsFileNotFound {
                    path: stations_file.clone(),
                });
            }
        }

        Ok(())
    }

    /// Stations file to load: the named one, or the default when it exists
    pub fn resolve_stations_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.stations_file {
            return Some(path.clone());
        }

        let default_path = PathBuf::from(DEFAULT_STATIONS_FILE);
        if default_path.is_file() {
            Some(default_path)
        } else {
            warn!(
                "No {} found; continuing without station metadata",
                DEFAULT_STATIONS_FILE
            );
            None
        }
    }

    /// Build the merge configuration from the arguments
    pub fn to_config(&self) -> MergeConfig {
        let mut config = MergeConfig::default()
            .with_merge_policy(self.merge_policy)
            .with_file_pattern(self.pattern.clone());

        if let Some(output_dir) = &self.output_dir {
            config = config.with_output_dir(output_dir.clone());
        }
        if self.sorted {
            config = config.with_sorted_entries();
        }
        if let Some(stations_path) = self.resolve_stations_path() {
            config = config.with_stations_path(stations_path);
        }
        if !self.show_progress() {
            config = config.without_progress();
        }

        config
    }
}
