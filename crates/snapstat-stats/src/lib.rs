//! Benchmark statistics: confidence intervals and grouped aggregation.
//!
//! Reads benchmark samples grouped by software version and summarizes each
//! version with per-metric means and Student-t confidence half-widths.

pub mod aggregate;
pub mod bench;
pub mod interval;

pub use aggregate::{aggregate, ColumnSummary, GroupSummary, GroupedAggregator, SampleRow, TailPolicy};
pub use bench::{summary_record, BenchmarkReader, VersionLabeler};
pub use interval::{confidence_interval, mean, standard_error, student_t_quantile};
