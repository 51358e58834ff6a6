//! State flush engine.
//!
//! Consumes [`TraversalEvent`]s and decides when the current state's matrix
//! is complete. The rule is simple: whenever the walk reaches a directory,
//! or a station file, whose state name differs from the current cursor, the
//! pending matrix is flushed and reset before anything else happens. The
//! end of the walk is the final boundary.
//!
//! The engine is generic over where readings come from ([`StationSource`])
//! and where finished states go ([`StateSink`]), so the boundary rule can be
//! driven with synthetic events and in-memory collaborators.

use super::discovery::TraversalEvent;
use crate::config::MergePolicy;
use crate::error::Result;
use crate::matrix::DateStationMatrix;
use crate::models::{FlushSummary, ParseSummary, ProcessingStats};
use crate::parser::parse_station_file;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Supplies station readings to the matrix
pub trait StationSource {
    fn load(
        &mut self,
        path: &Path,
        station: &str,
        matrix: &mut DateStationMatrix,
    ) -> Result<ParseSummary>;
}

/// Receives a completed state matrix
pub trait StateSink {
    fn flush(
        &mut self,
        state: &str,
        state_dir: &Path,
        matrix: &DateStationMatrix,
    ) -> Result<FlushSummary>;
}

/// Reads station files from disk
#[derive(Debug, Default, Clone, Copy)]
pub struct FileStationSource;

impl StationSource for FileStationSource {
    fn load(
        &mut self,
        path: &Path,
        station: &str,
        matrix: &mut DateStationMatrix,
    ) -> Result<ParseSummary> {
        parse_station_file(path, station, matrix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineState {
    /// No state cursor yet, or the walk has finished
    Idle,
    /// Collecting readings for `state`, whose data lives in `state_dir`
    Accumulating { state: String, state_dir: PathBuf },
}

pub struct StateFlushEngine<S, W> {
    source: S,
    sink: W,
    matrix: DateStationMatrix,
    state: EngineState,
    stats: ProcessingStats,
}

impl<S: StationSource, W: StateSink> StateFlushEngine<S, W> {
    pub fn new(source: S, sink: W, policy: MergePolicy) -> Self {
        Self {
            source,
            sink,
            matrix: DateStationMatrix::new(policy),
            state: EngineState::Idle,
            stats: ProcessingStats::default(),
        }
    }

    pub fn handle(&mut self, event: TraversalEvent) {
        match event {
            TraversalEvent::Directory { name, path } => self.enter_directory(&name, &path),
            TraversalEvent::StationFile {
                path,
                state,
                state_dir,
                station,
            } => self.station_file(&path, &state, &state_dir, &station),
        }
    }

    /// A directory was entered; a new name is a state boundary
    pub fn enter_directory(&mut self, name: &str, path: &Path) {
        self.stats.directories_visited += 1;
        if !self.is_current(name) {
            self.change_state(name, path);
        }
    }

    /// A station file was found under `state_dir`
    pub fn station_file(&mut self, path: &Path, state: &str, state_dir: &Path, station: &str) {
        if !self.is_current(state) {
            self.change_state(state, state_dir);
        }

        match self.source.load(path, station, &mut self.matrix) {
            Ok(summary) => self.stats.record_parse(&summary),
            Err(error) => {
                warn!("Skipping station file {}: {}", path.display(), error);
                self.stats.files_failed += 1;
            }
        }
    }

    /// Final boundary: flush whatever is pending and return the run totals
    pub fn finish(&mut self) -> ProcessingStats {
        self.flush_pending();
        self.state = EngineState::Idle;
        std::mem::take(&mut self.stats)
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn matrix(&self) -> &DateStationMatrix {
        &self.matrix
    }

    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    fn is_current(&self, name: &str) -> bool {
        matches!(&self.state, EngineState::Accumulating { state, .. } if state == name)
    }

    fn change_state(&mut self, name: &str, dir: &Path) {
        if let EngineState::Accumulating { state, .. } = &self.state {
            info!("State changed from {} to {}", state, name);
        }
        self.flush_pending();
        self.state = EngineState::Accumulating {
            state: name.to_string(),
            state_dir: dir.to_path_buf(),
        };
    }

    /// Write the matrix if it holds any date, then reset it unconditionally
    fn flush_pending(&mut self) {
        if let EngineState::Accumulating { state, state_dir } = &self.state {
            if self.matrix.is_empty() {
                if self.matrix.station_count() > 0 {
                    debug!(
                        "State {} has {} stations but no dates; nothing written",
                        state,
                        self.matrix.station_count()
                    );
                }
            } else {
                match self.sink.flush(state, state_dir, &self.matrix) {
                    Ok(summary) => {
                        info!(
                            "Wrote {} ({} dates x {} stations)",
                            summary.output_path.display(),
                            summary.rows,
                            summary.columns
                        );
                        self.stats.record_flush(summary);
                    }
                    Err(error) => {
                        warn!("Failed to write state {}: {}", state, error);
                        self.stats.flush_failures += 1;
                    }
                }
            }
        }
        self.matrix.reset();
    }
}
