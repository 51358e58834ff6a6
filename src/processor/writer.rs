//! CSV rendering and per-state output files
//!
//! Turns a completed [`DateStationMatrix`] into the combined state file:
//! a `Date,<station>,...` header followed by one line per date, in the order
//! dates were first seen. Missing cells get the `-9999.000000` sentinel.

use super::engine::StateSink;
use crate::constants::{
    FIELD_DELIMITER, HEADER_DATE_TOKEN, MISSING_READING, OUTPUT_EXTENSION, TEMPERATURE_PRECISION,
};
use crate::error::{MergeError, Result};
use crate::matrix::{DateStationMatrix, StationReadings};
use crate::models::FlushSummary;
use crate::ordered_map::OrderedMap;
use csv::{StringRecord, Terminator, WriterBuilder};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header record: `Date` followed by the station codes in column order
pub fn header_record(stations: &OrderedMap<String, ()>) -> StringRecord {
    let mut record = StringRecord::with_capacity(0, stations.len() + 1);
    record.push_field(HEADER_DATE_TOKEN);
    for station in stations.keys() {
        record.push_field(station);
    }
    record
}

/// One data record: the date and a cell per station in column order
pub fn row_record(
    date: &str,
    readings: &StationReadings,
    stations: &OrderedMap<String, ()>,
) -> StringRecord {
    let mut record = StringRecord::with_capacity(0, stations.len() + 1);
    record.push_field(date);
    for station in stations.keys() {
        let temperature = readings.get(station).copied().unwrap_or(MISSING_READING);
        record.push_field(&format_temperature(temperature));
    }
    record
}

pub fn format_temperature(temperature: f32) -> String {
    format!("{:.*}", TEMPERATURE_PRECISION, temperature)
}

/// Write the header and every row, in date insertion order, to `output`
pub fn write_matrix<W: Write>(output: W, matrix: &DateStationMatrix) -> csv::Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .delimiter(FIELD_DELIMITER)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(output);

    writer.write_record(&header_record(matrix.stations()))?;
    for (date, readings) in matrix.dates() {
        writer.write_record(&row_record(date, readings, matrix.stations()))?;
    }
    writer.flush()?;
    Ok(())
}

/// The complete state file as text
pub fn render_matrix(matrix: &DateStationMatrix) -> Result<String> {
    let mut buffer = Vec::new();
    write_matrix(&mut buffer, matrix)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Output file name for a state: `<STATE>.CSV`
pub fn output_file_name(state: &str) -> String {
    format!("{}.{}", state.to_ascii_uppercase(), OUTPUT_EXTENSION)
}

/// Writes each flushed state to `<dir>/<STATE>.CSV`
#[derive(Debug, Clone, Default)]
pub struct CsvStateWriter {
    output_dir: Option<PathBuf>,
}

impl CsvStateWriter {
    /// Write into `output_dir`, or next to each state's data when `None`
    pub fn new(output_dir: Option<PathBuf>) -> Self {
        Self { output_dir }
    }

    pub fn output_path(&self, state: &str, state_dir: &Path) -> PathBuf {
        self.output_dir
            .as_deref()
            .unwrap_or(state_dir)
            .join(output_file_name(state))
    }

    fn write_file(&self, path: &Path, matrix: &DateStationMatrix) -> csv::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        write_matrix(File::create(path)?, matrix)
    }
}

impl StateSink for CsvStateWriter {
    fn flush(
        &mut self,
        state: &str,
        state_dir: &Path,
        matrix: &DateStationMatrix,
    ) -> Result<FlushSummary> {
        let output_path = self.output_path(state, state_dir);
        debug!("Writing state {} to {}", state, output_path.display());

        self.write_file(&output_path, matrix)
            .map_err(|error| MergeError::OutputWriteFailed {
                path: output_path.clone(),
                source: error.into(),
            })?;

        Ok(FlushSummary {
            state: state.to_string(),
            output_path,
            rows: matrix.date_count(),
            columns: matrix.station_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MergePolicy;
    use tempfile::TempDir;

    fn stations(codes: &[&str]) -> OrderedMap<String, ()> {
        codes.iter().map(|code| (code.to_string(), ())).collect()
    }

    fn fields(record: &StringRecord) -> Vec<&str> {
        record.iter().collect()
    }

    #[test]
    fn test_header_keeps_column_order() {
        let header = header_record(&stations(&["000002", "000001"]));
        assert_eq!(fields(&header), ["Date", "000002", "000001"]);
    }

    #[test]
    fn test_header_without_stations() {
        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        assert_eq!(render_matrix(&matrix).unwrap(), "Date\n");

        matrix.record_station("000001");
        assert_eq!(render_matrix(&matrix).unwrap(), "Date,000001\n");
    }

    #[test]
    fn test_row_fills_missing_cells_with_sentinel() {
        let mut readings = StationReadings::new();
        readings.insert("000002".to_string(), 70.0);

        let row = row_record("20230101", &readings, &stations(&["000001", "000002", "000003"]));
        assert_eq!(
            fields(&row),
            ["20230101", "-9999.000000", "70.000000", "-9999.000000"]
        );
    }

    #[test]
    fn test_row_uses_six_fraction_digits() {
        let mut readings = StationReadings::new();
        readings.insert("A".to_string(), -12.25);
        readings.insert("B".to_string(), 0.0);

        let row = row_record("d", &readings, &stations(&["A", "B"]));
        assert_eq!(fields(&row), ["d", "-12.250000", "0.000000"]);
        assert_eq!(format_temperature(62.1), "62.099998");
    }

    #[test]
    fn test_every_cell_is_recorded_value_or_sentinel() {
        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        matrix.record_reading("d1", "A", 1.5);
        matrix.record_reading("d2", "B", 2.5);
        matrix.record_reading("d1", "B", 9.0);

        let rendered = render_matrix(&matrix).unwrap();
        let mut lines = rendered.lines();
        assert_eq!(lines.next(), Some("Date,A,B"));
        for line in lines {
            let mut fields = line.split(',');
            let date = fields.next().unwrap();
            let readings = matrix.dates().get(date).unwrap();
            for (cell, station) in fields.zip(matrix.stations().keys()) {
                let expected = readings.get(station).copied().unwrap_or(MISSING_READING);
                assert_eq!(cell, format!("{expected:.6}"));
            }
        }
    }

    #[test]
    fn test_output_file_name_is_upper_case() {
        assert_eq!(output_file_name("al"), "AL.CSV");
        assert_eq!(output_file_name("AZ"), "AZ.CSV");
    }

    #[test]
    fn test_writer_places_file_in_state_directory() {
        let temp_dir = TempDir::new().unwrap();
        let state_dir = temp_dir.path().join("AL");
        fs::create_dir_all(&state_dir).unwrap();

        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        matrix.record_reading("20230101", "000001", 75.5);

        let mut writer = CsvStateWriter::new(None);
        let summary = writer.flush("AL", &state_dir, &matrix).unwrap();

        assert_eq!(summary.output_path, state_dir.join("AL.CSV"));
        assert_eq!(summary.rows, 1);
        assert_eq!(summary.columns, 1);
        assert_eq!(
            fs::read_to_string(&summary.output_path).unwrap(),
            "Date,000001\n20230101,75.500000\n"
        );
    }

    #[test]
    fn test_writer_honours_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("combined");

        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        matrix.record_reading("20230101", "000001", 75.5);

        let mut writer = CsvStateWriter::new(Some(output_dir.clone()));
        let summary = writer
            .flush("AZ", &temp_dir.path().join("AZ"), &matrix)
            .unwrap();

        assert_eq!(summary.output_path, output_dir.join("AZ.CSV"));
        assert!(summary.output_path.exists());
    }

    #[test]
    fn test_writer_reports_unwritable_destination() {
        let temp_dir = TempDir::new().unwrap();
        // A regular file where the output directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let mut matrix = DateStationMatrix::new(MergePolicy::FirstWins);
        matrix.record_reading("20230101", "000001", 75.5);

        let mut writer = CsvStateWriter::new(Some(blocker.join("out")));
        let result = writer.flush("AL", temp_dir.path(), &matrix);
        assert!(matches!(result, Err(MergeError::OutputWriteFailed { .. })));
    }
}
