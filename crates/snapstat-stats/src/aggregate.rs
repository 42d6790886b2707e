//! Streaming group-by-key aggregation over pre-grouped rows.
//!
//! Rows sharing a key must be contiguous; the aggregator never re-sorts. One
//! group is open at a time and is closed when the key changes or the input
//! ends, producing a [`GroupSummary`] with the mean and confidence-interval
//! half-width of every metric column.

use std::iter::Peekable;

use serde::Serialize;
use snapstat_core::{Result, SnapstatError};

use crate::interval::{confidence_interval, mean};

/// One input row: a group key and its metric values.
///
/// # Examples
///
/// ```
/// use snapstat_stats::aggregate::SampleRow;
///
/// let row = SampleRow::new("v0.21", vec![1.0, 2.0]);
/// assert_eq!(row.key, "v0.21");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    /// Group key, e.g. a version label.
    pub key: String,
    /// Metric values, one per column.
    pub values: Vec<f64>,
}

impl SampleRow {
    /// Build a row from a key and its values.
    pub fn new(key: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            key: key.into(),
            values,
        }
    }
}

/// Mean and confidence half-width of one metric column within a group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummary {
    /// Sample mean.
    pub mean: f64,
    /// Confidence-interval half-width; `None` when the group has fewer than
    /// two samples.
    pub ci: Option<f64>,
}

/// Summary of one closed group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    /// Group key as it appeared in the input.
    pub key: String,
    /// Number of rows in the group.
    pub samples: usize,
    /// Per-column statistics, in input column order.
    pub columns: Vec<ColumnSummary>,
}

/// What to do with a one-row group formed by the very last input row.
///
/// Historically such a group was dropped: the final row only got buffered
/// when it continued the open group. `DropTrailingSingleton` keeps that
/// behavior; `Emit` reports the row as its own group without a CI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TailPolicy {
    /// Drop a final group consisting only of the last row.
    #[default]
    DropTrailingSingleton,
    /// Emit every group, including a final singleton.
    Emit,
}

/// Aggregate pre-grouped rows into one summary per group, lazily.
///
/// # Errors
///
/// Returns [`SnapstatError::InvalidConfidence`] unless `0 < confidence < 1`.
///
/// # Examples
///
/// ```
/// use snapstat_stats::aggregate::{aggregate, SampleRow, TailPolicy};
///
/// let rows = vec![
///     SampleRow::new("A", vec![1.0]),
///     SampleRow::new("A", vec![3.0]),
///     SampleRow::new("B", vec![5.0]),
///     SampleRow::new("B", vec![7.0]),
/// ];
/// let summaries: Vec<_> = aggregate(rows, 0.95, TailPolicy::default()).unwrap().collect();
/// assert_eq!(summaries.len(), 2);
/// assert_eq!(summaries[0].columns[0].mean, 2.0);
/// assert_eq!(summaries[1].columns[0].mean, 6.0);
/// ```
pub fn aggregate<I>(
    rows: I,
    confidence: f64,
    policy: TailPolicy,
) -> Result<GroupedAggregator<I::IntoIter>>
where
    I: IntoIterator<Item = SampleRow>,
{
    if confidence.is_nan() || confidence <= 0.0 || confidence >= 1.0 {
        return Err(SnapstatError::InvalidConfidence(confidence));
    }
    Ok(GroupedAggregator {
        rows: rows.into_iter().peekable(),
        confidence,
        policy,
        open: None,
    })
}

/// Iterator returned by [`aggregate`].
pub struct GroupedAggregator<I: Iterator<Item = SampleRow>> {
    rows: Peekable<I>,
    confidence: f64,
    policy: TailPolicy,
    open: Option<OpenGroup>,
}

struct OpenGroup {
    key: String,
    rows: usize,
    columns: Vec<Vec<f64>>,
}

impl OpenGroup {
    fn start(row: SampleRow) -> Self {
        Self {
            key: row.key,
            rows: 1,
            columns: row.values.into_iter().map(|v| vec![v]).collect(),
        }
    }

    fn push(&mut self, values: Vec<f64>) {
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(value);
        }
        self.rows += 1;
    }

    fn close(self, confidence: f64) -> GroupSummary {
        let columns = self
            .columns
            .iter()
            .filter_map(|sample| {
                let m = mean(sample).ok()?;
                Some(ColumnSummary {
                    mean: m,
                    ci: confidence_interval(sample, confidence).ok(),
                })
            })
            .collect();
        GroupSummary {
            key: self.key,
            samples: self.rows,
            columns,
        }
    }
}

impl<I: Iterator<Item = SampleRow>> Iterator for GroupedAggregator<I> {
    type Item = GroupSummary;

    fn next(&mut self) -> Option<GroupSummary> {
        let confidence = self.confidence;
        loop {
            let Some(row) = self.rows.next() else {
                return self.open.take().map(|g| g.close(confidence));
            };

            match self.open.as_ref().map(|g| g.key == row.key) {
                Some(true) => {
                    if let Some(group) = self.open.as_mut() {
                        group.push(row.values);
                    }
                }
                Some(false) => {
                    let closed = self.open.take().map(|g| g.close(confidence));
                    let is_last = self.rows.peek().is_none();
                    if is_last && self.policy == TailPolicy::DropTrailingSingleton {
                        tracing::debug!(key = %row.key, "dropping trailing single-row group");
                    } else {
                        self.open = Some(OpenGroup::start(row));
                    }
                    return closed;
                }
                None => self.open = Some(OpenGroup::start(row)),
            }
        }
    }
}
