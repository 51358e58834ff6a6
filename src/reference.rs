//! Read-only reference data: the US state table and station metadata.
//!
//! Both lookups are backed by [`OrderedMap`] and are only consulted for
//! existence checks and log enrichment. Nothing in the merge itself depends
//! on their contents.

use crate::constants::{STATES, STATION_CODE_LEN};
use crate::error::{MergeError, Result};
use crate::models::{StationMetadata, UsState};
use crate::ordered_map::OrderedMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, trace};

/// US states by postal code, with a two-digit code cross reference
#[derive(Debug, Clone)]
pub struct StateTable {
    states: OrderedMap<String, UsState>,
    codes: OrderedMap<String, String>,
}

impl StateTable {
    /// Build the table of the 48 contiguous states
    pub fn new() -> Self {
        let mut states = OrderedMap::new();
        let mut codes = OrderedMap::new();

        for &(code, postal, name) in STATES {
            states.insert(
                postal.to_string(),
                UsState {
                    code: code.to_string(),
                    postal: postal.to_string(),
                    name: name.to_string(),
                },
            );
            codes.insert(code.to_string(), postal.to_string());
        }

        Self { states, codes }
    }

    /// Look up a state by postal code, ignoring case
    pub fn by_postal(&self, postal: &str) -> Option<&UsState> {
        self.states.get(postal.to_ascii_uppercase().as_str())
    }

    /// Look up a state by its two-digit code
    pub fn by_code(&self, code: &str) -> Option<&UsState> {
        self.codes
            .get(code)
            .and_then(|postal| self.states.get(postal.as_str()))
    }

    /// Resolve a state directory name: postal code, two-digit code, or full name
    pub fn resolve(&self, directory_name: &str) -> Option<&UsState> {
        self.by_postal(directory_name)
            .or_else(|| self.by_code(directory_name))
            .or_else(|| {
                self.states
                    .values()
                    .find(|state| state.name.eq_ignore_ascii_case(directory_name))
            })
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for StateTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Station metadata indexed by six-character station code
#[derive(Debug, Clone, Default)]
pub struct StationRegistry {
    stations: OrderedMap<String, StationMetadata>,
    lines_skipped: usize,
}

impl StationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a stations file. A missing file is an error; bad lines are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MergeError::StationsFileNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;
        let registry = Self::from_reader(BufReader::new(file))?;

        info!(
            "Loaded {} stations from {} ({} lines skipped)",
            registry.len(),
            path.display(),
            registry.lines_skipped
        );
        Ok(registry)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut registry = Self::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            match parse_station_line(&line) {
                Some(station) => {
                    if !registry.stations.insert(station.code.clone(), station) {
                        debug!("Duplicate station code on line {}", number + 1);
                    }
                }
                None => {
                    trace!("Skipping unparseable station line {}", number + 1);
                    registry.lines_skipped += 1;
                }
            }
        }

        Ok(registry)
    }

    pub fn get(&self, code: &str) -> Option<&StationMetadata> {
        self.stations.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.stations.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn lines_skipped(&self) -> usize {
        self.lines_skipped
    }
}

/// Parse one stations file line.
///
/// Expected layout (whitespace separated):
/// ```text
/// USH00011084  31.0581  -87.0547   25.9 AL BREWTON 3 SSE    ------ ------ ------ +6
/// ```
/// The name runs until the first trailing component (`------`, a six-digit
/// coop id) or UTC offset token.
fn parse_station_line(line: &str) -> Option<StationMetadata> {
    let mut tokens = line.split_whitespace();

    let id = tokens.next()?;
    let latitude: f64 = tokens.next()?.parse().ok()?;
    let longitude: f64 = tokens.next()?.parse().ok()?;
    let elevation: f64 = tokens.next()?.parse().ok()?;
    let state = tokens.next()?;

    let name = tokens
        .take_while(|token| !is_trailing_field(token))
        .collect::<Vec<_>>()
        .join(" ");

    let code = station_code(id)?;

    Some(StationMetadata {
        id: id.to_string(),
        code,
        latitude,
        longitude,
        elevation,
        state: state.to_string(),
        name,
    })
}

fn is_trailing_field(token: &str) -> bool {
    let is_coop_id = token.len() == STATION_CODE_LEN && token.bytes().all(|b| b.is_ascii_digit());
    let is_utc_offset = token.len() > 1
        && matches!(token.as_bytes()[0], b'+' | b'-')
        && token[1..].bytes().all(|b| b.is_ascii_digit());
    token == "------" || is_coop_id || is_utc_offset
}

/// Last six characters of a network id
fn station_code(id: &str) -> Option<String> {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() < STATION_CODE_LEN {
        return None;
    }
    Some(
        chars[chars.len() - STATION_CODE_LEN..]
            .iter()
            .collect::<String>()
            .to_ascii_uppercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const STATIONS: &str = "\
USH00011084  31.0581  -87.0547   25.9 AL BREWTON 3 SSE                  ------ ------ ------ +6
USH00012813  30.5467  -87.8808    7.0 AL FAIRHOPE 2 NE                  ------ ------ ------ +6
not a station line
USH00021026  34.5750 -111.8461 1057.7 AZ CAMP VERDE                     ------ ------ ------ +7
";

    #[test]
    fn test_state_table_lookups() {
        let table = StateTable::new();
        assert_eq!(table.len(), 48);

        assert_eq!(table.by_postal("AL").unwrap().name, "Alabama");
        assert_eq!(table.by_postal("tx").unwrap().code, "41");
        assert_eq!(table.by_code("48").unwrap().postal, "WY");
        assert!(table.by_postal("HI").is_none());
        assert!(table.by_code("49").is_none());
    }

    #[test]
    fn test_state_table_resolves_directory_names() {
        let table = StateTable::new();
        assert_eq!(table.resolve("AZ").unwrap().postal, "AZ");
        assert_eq!(table.resolve("05").unwrap().postal, "CO");
        assert_eq!(table.resolve("new york").unwrap().postal, "NY");
        assert!(table.resolve("qcv-1").is_none());
    }

    #[test]
    fn test_state_table_keeps_reference_order() {
        let table = StateTable::new();
        let first: Vec<&str> = table
            .states
            .keys()
            .take(3)
            .map(String::as_str)
            .collect();
        assert_eq!(first, vec!["AL", "AZ", "AR"]);
    }

    #[test]
    fn test_registry_parses_station_lines() {
        let registry = StationRegistry::from_reader(STATIONS.as_bytes()).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.lines_skipped(), 1);

        let brewton = registry.get("011084").unwrap();
        assert_eq!(brewton.id, "USH00011084");
        assert_eq!(brewton.state, "AL");
        assert_eq!(brewton.name, "BREWTON 3 SSE");
        assert!((brewton.latitude - 31.0581).abs() < 1e-9);
        assert!((brewton.elevation - 25.9).abs() < 1e-9);

        assert_eq!(registry.get("021026").unwrap().name, "CAMP VERDE");
        assert!(registry.contains("012813"));
        assert!(!registry.contains("999999"));
    }

    #[test]
    fn test_registry_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stations.txt");

        match StationRegistry::load(&path) {
            Err(MergeError::StationsFileNotFound { path: missing }) => assert_eq!(missing, path),
            other => panic!("Expected StationsFileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_registry_load_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stations.txt");
        fs::write(&path, STATIONS).unwrap();

        let registry = StationRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 3);
    }
}
