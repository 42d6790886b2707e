//! Report emission for snapstat.
//!
//! Renders benchmark summaries and snapshot reports as CSV files whose header
//! row is taken from the first record and written exactly once, or as pretty
//! JSON for `--format json`.

pub mod csv;
pub mod json;

pub use csv::{write_csv, CsvWriter, Record};
pub use json::to_json;
