//! File discovery module for station data trees
//!
//! Walks the data directory depth-first and turns what it finds into
//! [`TraversalEvent`]s for the flush engine. Expected layout:
//! ```text
//! data/
//!   AL/
//!     TMAX_011084.CSV
//!     TMAX_012813.CSV
//!   AZ/
//!     TMAX_021026.CSV
//! ```
//! Entries are yielded in the order the directory listing returns them
//! unless sorting is enabled, and that order decides the row and column
//! order of every output file.

use crate::constants::STATION_CODE_LEN;
use crate::error::{MergeError, Result};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

/// One step of the directory walk, as seen by the flush engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalEvent {
    /// A directory was entered
    Directory { name: String, path: PathBuf },
    /// A qualifying station file was found
    StationFile {
        path: PathBuf,
        /// Name of the directory holding the file
        state: String,
        state_dir: PathBuf,
        station: String,
    },
}

const CASE_INSENSITIVE: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// File discovery component for station data trees
#[derive(Debug)]
pub struct FileDiscovery {
    root: PathBuf,
    pattern: Pattern,
    sort_entries: bool,
}

impl FileDiscovery {
    /// Create a discovery over `root` selecting files that match `file_pattern`
    pub fn new(root: PathBuf, file_pattern: &str, sort_entries: bool) -> Result<Self> {
        let pattern = Pattern::new(file_pattern).map_err(|source| MergeError::InvalidPattern {
            pattern: file_pattern.to_string(),
            source,
        })?;

        Ok(Self {
            root,
            pattern,
            sort_entries,
        })
    }

    /// Whether a file name selects a station file (case-insensitive)
    pub fn is_station_file(&self, file_name: &str) -> bool {
        self.pattern.matches_with(file_name, CASE_INSENSITIVE)
    }

    /// Lazily walk the tree. The root itself produces no event.
    pub fn events(&self) -> impl Iterator<Item = Result<TraversalEvent>> + '_ {
        let mut walker = WalkDir::new(&self.root).min_depth(1);
        if self.sort_entries {
            walker = walker.sort_by_file_name();
        }

        walker.into_iter().filter_map(move |entry| match entry {
            Err(error) => Some(Err(MergeError::Traversal(error))),
            Ok(entry) => {
                let name = entry.file_name().to_string_lossy().to_string();
                let is_dir = entry.file_type().is_dir();
                let path = entry.into_path();

                if is_dir {
                    return Some(Ok(TraversalEvent::Directory { name, path }));
                }

                if !self.is_station_file(&name) {
                    trace!("Ignoring {}", path.display());
                    return None;
                }

                let state_dir = path.parent().unwrap_or(self.root.as_path()).to_path_buf();
                let state = state_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let station = station_code_from_path(&path)?;

                Some(Ok(TraversalEvent::StationFile {
                    path,
                    state,
                    state_dir,
                    station,
                }))
            }
        })
    }
}

/// Station code of a station file: the last six characters of its stem,
/// upper-cased. Shorter stems are used whole.
pub fn station_code_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_string_lossy();
    let chars: Vec<char> = stem.chars().collect();
    if chars.is_empty() {
        return None;
    }

    let start = chars.len().saturating_sub(STATION_CODE_LEN);
    Some(chars[start..].iter().collect::<String>().to_ascii_uppercase())
}
