//! Per-state date x station aggregation.
//!
//! A [`DateStationMatrix`] collects the readings of every station file under
//! one state directory. Rows are keyed by the date token exactly as it appears
//! in the source files; columns are the stations in the order they were first
//! seen. The matrix is reused across states: the flush engine renders it and
//! then calls [`DateStationMatrix::reset`].

use crate::config::MergePolicy;
use crate::ordered_map::OrderedMap;

/// Temperatures of one date, keyed by station code
pub type StationReadings = OrderedMap<String, f32>;

/// What `record_reading` did with a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingOutcome {
    /// First reading for this date; a new row was started
    NewDate,
    /// Added to an existing row (merge policy only)
    Merged,
    /// Discarded because the row or cell already existed
    Dropped,
}

impl ReadingOutcome {
    pub fn is_stored(&self) -> bool {
        !matches!(self, ReadingOutcome::Dropped)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DateStationMatrix {
    policy: MergePolicy,
    dates: OrderedMap<String, StationReadings>,
    stations_seen: OrderedMap<String, ()>,
}

impl DateStationMatrix {
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            policy,
            dates: OrderedMap::new(),
            stations_seen: OrderedMap::new(),
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Add a station column. Idempotent; first-seen order is kept.
    pub fn record_station(&mut self, station: &str) {
        if !self.stations_seen.contains_key(station) {
            self.stations_seen.insert(station.to_string(), ());
        }
    }

    /// Store one reading according to the merge policy.
    ///
    /// The station is always registered as a column, even when the reading
    /// itself is dropped.
    pub fn record_reading(&mut self, date: &str, station: &str, temperature: f32) -> ReadingOutcome {
        self.record_station(station);

        match self.dates.get_mut(date) {
            None => {
                let mut readings = StationReadings::new();
                readings.insert(station.to_string(), temperature);
                self.dates.insert(date.to_string(), readings);
                ReadingOutcome::NewDate
            }
            Some(readings) => match self.policy {
                MergePolicy::FirstWins => ReadingOutcome::Dropped,
                MergePolicy::Merge => {
                    if readings.insert(station.to_string(), temperature) {
                        ReadingOutcome::Merged
                    } else {
                        ReadingOutcome::Dropped
                    }
                }
            },
        }
    }

    /// True iff no date has been recorded
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Clear dates and stations for the next state
    pub fn reset(&mut self) {
        self.dates.clear();
        self.stations_seen.clear();
    }

    pub fn dates(&self) -> &OrderedMap<String, StationReadings> {
        &self.dates
    }

    pub fn stations(&self) -> &OrderedMap<String, ()> {
        &self.stations_seen
    }

    pub fn date_count(&self) -> usize {
        self.dates.len()
    }

    pub fn station_count(&self) -> usize {
        self.stations_seen.len()
    }
}
