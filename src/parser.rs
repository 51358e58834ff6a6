//! Station file parsing.
//!
//! A station file is a small comma-separated text file with an optional
//! `Date,...` header followed by `<date>,<temperature>` lines. Parsing is
//! best-effort: bad numbers become `0.0`, bytes that are not UTF-8 are
//! replaced, and odd lines never abort the file.

use crate::constants::{FIELD_DELIMITER, HEADER_DATE_TOKEN};
use crate::error::{MergeError, Result};
use crate::matrix::DateStationMatrix;
use crate::models::ParseSummary;
use csv::{ByteRecord, ReaderBuilder, Trim};
use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

/// Open `path` and fold its readings into `matrix` under `station`.
///
/// The station becomes a column once the file has been read, so a file that
/// holds only a header still shows up in the state's header row. A file that
/// fails to open or fails mid-read leaves `matrix` untouched.
pub fn parse_station_file(
    path: &Path,
    station: &str,
    matrix: &mut DateStationMatrix,
) -> Result<ParseSummary> {
    let unreadable = |source: std::io::Error| MergeError::StationFileUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(unreadable)?;
    let summary = parse_station_reader(file, station, matrix).map_err(|error| match error {
        MergeError::Io(source) => unreadable(source),
        MergeError::Csv(source) => unreadable(source.into()),
        other => other,
    })?;

    debug!(
        "Parsed {} ({}): {} lines, {} stored, {} dropped",
        path.display(),
        station,
        summary.lines_read,
        summary.readings_stored,
        summary.readings_dropped
    );
    Ok(summary)
}

/// Fold readings from any byte source into `matrix`.
///
/// Every record is read before the matrix is touched, so a read error
/// produces no column and no readings.
pub fn parse_station_reader<R: Read>(
    reader: R,
    station: &str,
    matrix: &mut DateStationMatrix,
) -> Result<ParseSummary> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .delimiter(FIELD_DELIMITER)
        .from_reader(reader);

    let mut summary = ParseSummary::default();
    let mut readings = Vec::new();
    let mut record = ByteRecord::new();

    while reader.read_byte_record(&mut record)? {
        summary.lines_read += 1;

        let date = field(&record, 0);
        let temperature = field(&record, 1);
        if date.is_empty() && temperature.is_empty() {
            trace!("Skipping blank line {} for {}", summary.lines_read, station);
            continue;
        }

        if date == HEADER_DATE_TOKEN {
            summary.header_seen = true;
            continue;
        }

        readings.push((date.into_owned(), parse_temperature(&temperature)));
    }

    matrix.record_station(station);
    for (date, temperature) in readings {
        if matrix.record_reading(&date, station, temperature).is_stored() {
            summary.readings_stored += 1;
        } else {
            summary.readings_dropped += 1;
        }
    }

    Ok(summary)
}

/// Field `index` as text, or empty when the record is shorter
fn field(record: &ByteRecord, index: usize) -> Cow<'_, str> {
    String::from_utf8_lossy(record.get(index).unwrap_or_default())
}

/// Parse the longest numeric prefix of `text`, or `0.0` if there is none.
///
/// `"75.5"` -> 75.5, `"75.5F"` -> 75.5, `"-3e1x"` -> -30.0, `"M"` -> 0.0.
pub fn parse_temperature(text: &str) -> f32 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return 0.0;
    }

    // Exponent only counts when at least one exponent digit follows
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f32>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MergePolicy;
    use std::fs;
    use tempfile::TempDir;

    fn parse(content: &str, station: &str, matrix: &mut DateStationMatrix) -> ParseSummary {
        parse_station_reader(content.as_bytes(), station, matrix).unwrap()
    }

    #[test]
    fn test_header_line_is_skipped() {
        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        let summary = parse("Date,Temp\n20230101,75.5\n20230102,80.0\n", "000001", &mut matrix);

        assert!(summary.header_seen);
        assert_eq!(summary.lines_read, 3);
        assert_eq!(summary.readings_stored, 2);
        assert!(!matrix.dates().contains_key("Date"));
        assert_eq!(
            matrix.dates().get("20230102").unwrap().get("000001"),
            Some(&80.0)
        );
    }

    #[test]
    fn test_header_only_file_registers_station() {
        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        let summary = parse("Date,Temp\n", "000007", &mut matrix);

        assert_eq!(summary.readings_stored, 0);
        assert!(matrix.is_empty());
        assert!(matrix.stations().contains_key("000007"));
    }

    #[test]
    fn test_second_station_dropped_under_first_wins() {
        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        parse("Date,Temp\n20230101,75.5\n", "000001", &mut matrix);
        let summary = parse("20230101,70.0\n20230104,66.0\n", "000002", &mut matrix);

        assert_eq!(summary.readings_stored, 1);
        assert_eq!(summary.readings_dropped, 1);
        assert!(matrix.dates().get("20230101").unwrap().get("000002").is_none());
    }

    #[test]
    fn test_second_station_kept_under_merge() {
        let mut matrix = DateStationMatrix::new(MergePolicy::Merge);
        parse("20230101,75.5\n", "000001", &mut matrix);
        let summary = parse("20230101,70.0\n", "000002", &mut matrix);

        assert_eq!(summary.readings_stored, 1);
        assert_eq!(
            matrix.dates().get("20230101").unwrap().get("000002"),
            Some(&70.0)
        );
    }

    #[test]
    fn test_malformed_values_become_zero() {
        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        parse("20230101,abc\n20230102\n20230103,\n", "000001", &mut matrix);

        for date in ["20230101", "20230102", "20230103"] {
            assert_eq!(
                matrix.dates().get(date).unwrap().get("000001"),
                Some(&0.0),
                "date {date}"
            );
        }
    }

    #[test]
    fn test_blank_and_crlf_lines() {
        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        let summary = parse("Date,Temp\r\n\r\n20230101,75.5\r\n\n", "000001", &mut matrix);

        assert!(summary.header_seen);
        assert_eq!(summary.readings_stored, 1);
        assert_eq!(matrix.date_count(), 1);
        assert_eq!(
            matrix.dates().get("20230101").unwrap().get("000001"),
            Some(&75.5)
        );
    }

    #[test]
    fn test_extra_columns_ignored() {
        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        parse("20230101, 75.5 ,Q,extra\n", "000001", &mut matrix);
        assert_eq!(
            matrix.dates().get("20230101").unwrap().get("000001"),
            Some(&75.5)
        );
    }

    #[test]
    fn test_invalid_utf8_does_not_stop_the_file() {
        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        let content: &[u8] = b"Date,Temp\n20230101,75.5\n20230102,80\xb0F\n20230103,81.0\n";
        let summary = parse_station_reader(content, "000001", &mut matrix).unwrap();

        assert_eq!(summary.readings_stored, 3);
        let dates: Vec<&String> = matrix.dates().keys().collect();
        assert_eq!(dates, ["20230101", "20230102", "20230103"]);
        assert_eq!(
            matrix.dates().get("20230102").unwrap().get("000001"),
            Some(&80.0)
        );
        assert_eq!(
            matrix.dates().get("20230103").unwrap().get("000001"),
            Some(&81.0)
        );
    }

    /// Hands out its bytes once, then fails every read
    struct BrokenReader<'a> {
        data: &'a [u8],
    }

    impl Read for BrokenReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.data.is_empty() {
                return Err(std::io::Error::other("device went away"));
            }
            let count = self.data.len().min(buf.len());
            buf[..count].copy_from_slice(&self.data[..count]);
            self.data = &self.data[count..];
            Ok(count)
        }
    }

    #[test]
    fn test_read_failure_leaves_matrix_untouched() {
        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        let reader = BrokenReader {
            data: b"Date,Temp\n20230101,75.5\n20230102,80.0\n",
        };

        let result = parse_station_reader(reader, "000001", &mut matrix);

        assert!(result.is_err());
        assert!(matrix.is_empty());
        assert_eq!(matrix.station_count(), 0);
    }

    #[test]
    fn test_parse_temperature_prefixes() {
        assert_eq!(parse_temperature("75.5"), 75.5);
        assert_eq!(parse_temperature("  -12"), -12.0);
        assert_eq!(parse_temperature("+8.25"), 8.25);
        assert_eq!(parse_temperature("75.5F"), 75.5);
        assert_eq!(parse_temperature(".5"), 0.5);
        assert_eq!(parse_temperature("7."), 7.0);
        assert_eq!(parse_temperature("-3e1x"), -30.0);
        assert_eq!(parse_temperature("4e"), 4.0);
        assert_eq!(parse_temperature("M"), 0.0);
        assert_eq!(parse_temperature("-"), 0.0);
        assert_eq!(parse_temperature("."), 0.0);
        assert_eq!(parse_temperature(""), 0.0);
    }

    #[test]
    fn test_parse_station_file_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("TMAX_000001.CSV");
        fs::write(&path, "Date,Temp\n20230101,75.5\n").unwrap();

        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        let summary = parse_station_file(&path, "000001", &mut matrix).unwrap();
        assert_eq!(summary.readings_stored, 1);
    }

    #[test]
    fn test_missing_file_produces_no_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("TMAX_404404.CSV");

        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        let result = parse_station_file(&path, "404404", &mut matrix);

        match result {
            Err(MergeError::StationFileUnreadable { path: failed, .. }) => {
                assert_eq!(failed, path);
            }
            other => panic!("Expected StationFileUnreadable, got {other:?}"),
        }
        assert!(matrix.is_empty());
        assert_eq!(matrix.station_count(), 0);
    }
}
