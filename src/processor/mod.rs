//! Main processing engine with modular architecture.
//!
//! Orchestrates a complete merge run using specialized modules for file
//! discovery, the state flush engine, and CSV output. Reference data
//! (state table, station registry) only enriches logging and statistics.

pub mod discovery;
pub mod engine;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::{FileDiscovery, TraversalEvent};
use self::engine::{FileStationSource, StateFlushEngine};
use self::writer::CsvStateWriter;

use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use crate::models::ProcessingStats;
use crate::reference::{StateTable, StationRegistry};

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Main processor for merging a data tree into per-state files
#[derive(Debug)]
pub struct StateMerger {
    data_path: PathBuf,
    config: MergeConfig,
    states: StateTable,
    stations: StationRegistry,
}

impl StateMerger {
    /// Create a new merger over `data_path`.
    ///
    /// Fails if the data directory is missing, the configuration is invalid,
    /// or a configured stations file cannot be loaded.
    pub fn new(data_path: PathBuf, config: MergeConfig) -> Result<Self> {
        if !data_path.is_dir() {
            return Err(MergeError::DatasetNotFound { path: data_path });
        }

        config.validate()?;

        let stations = match &config.stations_path {
            Some(path) => StationRegistry::load(path)?,
            None => StationRegistry::new(),
        };

        Ok(Self {
            data_path,
            config,
            states: StateTable::new(),
            stations,
        })
    }

    pub fn station_registry(&self) -> &StationRegistry {
        &self.stations
    }

    /// Main processing entry point
    pub fn run(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        if self.config.show_progress {
            println!("{}", "Starting state merge".bright_green().bold());
            println!("  {} {}", "Data:".bright_cyan(), self.data_path.display());
            println!(
                "  {} {:?}",
                "Merge policy:".bright_cyan(),
                self.config.merge_policy
            );
        }

        let discovery = FileDiscovery::new(
            self.data_path.clone(),
            &self.config.file_pattern,
            self.config.sort_entries,
        )?;
        let sink = CsvStateWriter::new(self.config.output_dir.clone());
        let mut engine = StateFlushEngine::new(FileStationSource, sink, self.config.merge_policy);

        let progress = self.progress_bar();
        let mut walk_errors = 0usize;
        let mut without_metadata: HashSet<String> = HashSet::new();

        for event in discovery.events() {
            match event {
                Ok(event) => {
                    self.inspect(&event, &mut without_metadata);
                    let station = match &event {
                        TraversalEvent::StationFile { station, .. } => Some(station.clone()),
                        TraversalEvent::Directory { .. } => None,
                    };
                    engine.handle(event);
                    if let Some(station) = station {
                        progress.set_message(format!(
                            "Station {} ({} files parsed)",
                            station,
                            engine.stats().files_parsed
                        ));
                    }
                    progress.inc(1);
                }
                Err(error) => {
                    warn!("Skipping unreadable entry: {}", error);
                    walk_errors += 1;
                }
            }
        }

        let mut stats = engine.finish();
        stats.walk_errors = walk_errors;
        stats.stations_without_metadata = without_metadata.len();
        stats.processing_time_ms = start_time.elapsed().as_millis();

        progress.finish_and_clear();
        info!(
            "Merged {} station files into {} state files in {}ms",
            stats.files_parsed, stats.states_flushed, stats.processing_time_ms
        );

        Ok(stats)
    }

    /// Log reference data for an event and note stations lacking metadata
    fn inspect(&self, event: &TraversalEvent, without_metadata: &mut HashSet<String>) {
        match event {
            TraversalEvent::Directory { name, .. } => match self.states.resolve(name) {
                Some(state) => info!("Entering {} ({})", state.name, state.postal),
                None => warn!("Directory {} is not a known state", name),
            },
            TraversalEvent::StationFile { station, .. } => {
                if self.stations.is_empty() {
                    return;
                }
                match self.stations.get(station) {
                    Some(metadata) => debug!("Station {} is {}", station, metadata.name),
                    None => {
                        if without_metadata.insert(station.clone()) {
                            debug!("Station {} has no metadata entry", station);
                        }
                    }
                }
            }
        }
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) =
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {pos} entries {msg}")
        {
            pb.set_style(style);
        }
        pb
    }
}

/// Print the end-of-run summary
pub fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Merge Summary".bright_green().bold());
    if stats.has_failures() {
        println!(
            "  {} {}",
            "Status:".bright_cyan(),
            "completed with skipped files or states".bright_yellow()
        );
    } else {
        println!("  {} {}", "Status:".bright_cyan(), "complete".bright_green());
    }
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Station files parsed:".bright_cyan(),
        stats.files_parsed.to_string().bright_white()
    );
    if stats.files_failed > 0 {
        println!(
            "  {} {}",
            "Station files failed:".bright_red(),
            stats.files_failed.to_string().bright_red().bold()
        );
    }
    println!(
        "  {} {} stored, {} dropped",
        "Readings:".bright_cyan(),
        stats.readings_stored.to_string().bright_white(),
        stats.readings_dropped.to_string().bright_white()
    );
    println!(
        "  {} {} ({} rows)",
        "State files written:".bright_cyan(),
        stats.states_flushed.to_string().bright_white().bold(),
        stats.rows_written
    );
    if stats.flush_failures > 0 {
        println!(
            "  {} {}",
            "State files failed:".bright_red(),
            stats.flush_failures.to_string().bright_red().bold()
        );
    }
    if stats.walk_errors > 0 {
        println!(
            "  {} {}",
            "Unreadable entries:".bright_red(),
            stats.walk_errors.to_string().bright_red()
        );
    }
    if stats.stations_without_metadata > 0 {
        println!(
            "  {} {}",
            "Stations without metadata:".bright_yellow(),
            stats.stations_without_metadata
        );
    }
    for path in &stats.output_files {
        println!("    {}", path.display().to_string().bright_black());
    }
}
