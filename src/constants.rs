//! Application constants for the state merger
//!
//! File naming conventions, output format values, and the fixed US state
//! reference data used throughout the application.

// =============================================================================
// Input and Output File Conventions
// =============================================================================

/// Glob pattern selecting station files (matched case-insensitively)
pub const STATION_FILE_PATTERN: &str = "TMAX*.CSV";

/// Number of trailing file-stem characters that form the station code
pub const STATION_CODE_LEN: usize = 6;

/// Date field value that marks a station file header line
pub const HEADER_DATE_TOKEN: &str = "Date";

/// Extension of the combined per-state output file
pub const OUTPUT_EXTENSION: &str = "CSV";

/// Default station metadata file, resolved against the working directory
pub const DEFAULT_STATIONS_FILE: &str = "stations.txt";

// =============================================================================
// Output Format
// =============================================================================

/// Cell value written when a station has no reading for a date
pub const MISSING_READING: f32 = -9999.0;

/// Fractional digits used for every temperature cell
pub const TEMPERATURE_PRECISION: usize = 6;

/// Field delimiter for input and output files
pub const FIELD_DELIMITER: u8 = b',';

// =============================================================================
// State Reference Data
// =============================================================================

/// Two-digit state code, postal abbreviation and name for the 48 contiguous states
pub const STATES: &[(&str, &str, &str)] = &[
    ("01", "AL", "Alabama"),
    ("02", "AZ", "Arizona"),
    ("03", "AR", "Arkansas"),
    ("04", "CA", "California"),
    ("05", "CO", "Colorado"),
    ("06", "CT", "Connecticut"),
    ("07", "DE", "Delaware"),
    ("08", "FL", "Florida"),
    ("09", "GA", "Georgia"),
    ("10", "ID", "Idaho"),
    ("11", "IL", "Illinois"),
    ("12", "IN", "Indiana"),
    ("13", "IA", "Iowa"),
    ("14", "KS", "Kansas"),
    ("15", "KY", "Kentucky"),
    ("16", "LA", "Louisiana"),
    ("17", "ME", "Maine"),
    ("18", "MD", "Maryland"),
    ("19", "MA", "Massachusetts"),
    ("20", "MI", "Michigan"),
    ("21", "MN", "Minnesota"),
    ("22", "MS", "Mississippi"),
    ("23", "MO", "Missouri"),
    ("24", "MT", "Montana"),
    ("25", "NE", "Nebraska"),
    ("26", "NV", "Nevada"),
    ("27", "NH", "New Hampshire"),
    ("28", "NJ", "New Jersey"),
    ("29", "NM", "New Mexico"),
    ("30", "NY", "New York"),
    ("31", "NC", "North Carolina"),
    ("32", "ND", "North Dakota"),
    ("33", "OH", "Ohio"),
    ("34", "OK", "Oklahoma"),
    ("35", "OR", "Oregon"),
    ("36", "PA", "Pennsylvania"),
    ("37", "RI", "Rhode Island"),
    ("38", "SC", "South Carolina"),
    ("39", "SD", "South Dakota"),
    ("40", "TN", "Tennessee"),
    ("41", "TX", "Texas"),
    ("42", "UT", "Utah"),
    ("43", "VT", "Vermont"),
    ("44", "VA", "Virginia"),
    ("45", "WA", "Washington"),
    ("46", "WV", "West Virginia"),
    ("47", "WI", "Wisconsin"),
    ("48", "WY", "Wyoming"),
];
