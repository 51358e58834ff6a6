//! TMAX State Merger Library
//!
//! Merges per-station daily maximum temperature files, laid out as
//! `<data>/<STATE>/TMAX_<station>.CSV`, into one combined `<STATE>.CSV` per
//! state: one row per date, one column per station, `-9999.000000` where a
//! station has no reading.
//!
//! This library provides:
//! - An insertion-ordered map that fixes row and column order
//! - The per-state date x station matrix with a selectable merge policy
//! - A lenient station file parser
//! - A flush engine that writes a state whenever the walk crosses into another
//! - Reference data for US states and station metadata

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod matrix;
pub mod models;
pub mod ordered_map;
pub mod parser;
pub mod processor;
pub mod reference;

pub use config::{MergeConfig, MergePolicy};
pub use error::{MergeError, Result};
pub use matrix::DateStationMatrix;
pub use ordered_map::OrderedMap;
pub use processor::StateMerger;
