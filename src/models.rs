//! Core data structures and types for state merging.
//!
//! Defines reference records, per-file and per-state summaries, and the
//! run statistics reported at the end of a merge.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One row of the fixed US state reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsState {
    pub code: String,
    pub postal: String,
    pub name: String,
}

/// Station metadata from the stations file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationMetadata {
    /// Full network identifier, e.g. `USH00011084`
    pub id: String,
    /// Six-character code matching the station file name
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub state: String,
    pub name: String,
}

/// Result of folding one station file into the matrix
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseSummary {
    pub lines_read: usize,
    pub readings_stored: usize,
    pub readings_dropped: usize,
    pub header_seen: bool,
}

/// Result of writing one state's matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushSummary {
    pub state: String,
    pub output_path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Processing statistics
#[derive(Debug, Default, Clone, Serialize)]
pub struct ProcessingStats {
    pub directories_visited: usize,
    pub files_parsed: usize,
    pub files_failed: usize,
    pub readings_stored: usize,
    pub readings_dropped: usize,
    pub states_flushed: usize,
    pub rows_written: usize,
    pub flush_failures: usize,
    pub walk_errors: usize,
    pub stations_without_metadata: usize,
    pub output_files: Vec<PathBuf>,
    pub processing_time_ms: u128,
}

impl ProcessingStats {
    /// Fold one parsed station file into the totals
    pub fn record_parse(&mut self, summary: &ParseSummary) {
        self.files_parsed += 1;
        self.readings_stored += summary.readings_stored;
        self.readings_dropped += summary.readings_dropped;
    }

    /// Fold one written state file into the totals
    pub fn record_flush(&mut self, summary: FlushSummary) {
        self.states_flushed += 1;
        self.rows_written += summary.rows;
        self.output_files.push(summary.output_path);
    }

    /// Whether any file or state was skipped because of an error
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0 || self.flush_failures > 0 || self.walk_errors > 0
    }
}
