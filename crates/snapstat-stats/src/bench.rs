//! Benchmark CSV input and per-version output rows.
//!
//! Input rows are `version, metric_1, ..., metric_n` after a header line that
//! is ignored. Output rows pair every metric mean with its confidence
//! half-width.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use regex::Regex;
use snapstat_core::{format_float, Result, SnapstatError, NOT_APPLICABLE};
use snapstat_report::Record;

use crate::aggregate::{GroupSummary, SampleRow};

/// Streams [`SampleRow`]s out of a benchmark CSV.
///
/// NUL bytes are stripped, blank lines skipped, fields trimmed and unquoted.
/// Fields beyond the configured metric count are ignored.
///
/// # Examples
///
/// ```
/// use snapstat_stats::bench::BenchmarkReader;
///
/// let csv = "version,a,b\nv1,1.0,2.0\nv1,3.0,4.0\n";
/// let rows: Vec<_> = BenchmarkReader::new(csv.as_bytes(), 2)
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].values, vec![3.0, 4.0]);
/// ```
pub struct BenchmarkReader<R: BufRead> {
    lines: std::io::Lines<R>,
    columns: usize,
    line_number: usize,
}

impl<R: BufRead> BenchmarkReader<R> {
    /// Read rows with `columns` metric values after the version field.
    pub fn new(input: R, columns: usize) -> Self {
        Self {
            lines: input.lines(),
            columns,
            line_number: 0,
        }
    }

    fn parse_line(&self, line: &str) -> Result<SampleRow> {
        let fields: Vec<&str> = line.split(',').map(clean_field).collect();
        if fields.len() < self.columns + 1 {
            return Err(SnapstatError::Parse(format!(
                "line {}: expected {} fields, found {}",
                self.line_number,
                self.columns + 1,
                fields.len()
            )));
        }
        let values = fields[1..=self.columns]
            .iter()
            .map(|field| {
                field.parse::<f64>().map_err(|_| {
                    SnapstatError::Parse(format!(
                        "line {}: '{field}' is not a number",
                        self.line_number
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SampleRow::new(fields[0], values))
    }
}

fn clean_field(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

impl<R: BufRead> Iterator for BenchmarkReader<R> {
    type Item = Result<SampleRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_number += 1;
            if self.line_number == 1 {
                continue;
            }
            let line = line.replace('\0', "");
            if line.trim().is_empty() {
                continue;
            }
            return Some(self.parse_line(&line));
        }
    }
}

/// Maps raw version keys (often paths like `../bitcoin-0.21.0/src`) to
/// output labels.
///
/// # Examples
///
/// ```
/// use snapstat_stats::bench::VersionLabeler;
///
/// let labeler = VersionLabeler::new(Some(r".*bitcoin-([^/]+)"), "v").unwrap();
/// assert_eq!(labeler.label("../bitcoin-0.21.0/src"), "v0.21.0");
/// assert_eq!(labeler.label("other"), "other");
/// ```
#[derive(Debug, Clone)]
pub struct VersionLabeler {
    pattern: Option<Regex>,
    prefix: String,
}

impl VersionLabeler {
    /// Build a labeler from an optional regex with one capture group.
    ///
    /// # Errors
    ///
    /// Returns [`SnapstatError::Config`] if the pattern does not compile.
    pub fn new(pattern: Option<&str>, prefix: &str) -> Result<Self> {
        let pattern = pattern
            .map(Regex::new)
            .transpose()
            .map_err(|e| SnapstatError::Config(format!("invalid version pattern: {e}")))?;
        Ok(Self {
            pattern,
            prefix: prefix.to_string(),
        })
    }

    /// Label for `key`: prefix plus the first capture group when the pattern
    /// matches, the raw key otherwise.
    pub fn label(&self, key: &str) -> String {
        let captured = self
            .pattern
            .as_ref()
            .and_then(|re| re.captures(key))
            .and_then(|caps| caps.get(1));
        match captured {
            Some(m) => format!("{}{}", self.prefix, m.as_str()),
            None => key.to_string(),
        }
    }
}

/// Output row for one benchmark group.
///
/// Columns: `Version`, then `<name>` and `CI <name>` for each metric. A
/// missing CI is written as `N/A`.
pub fn summary_record(summary: &GroupSummary, columns: &[String], labeler: &VersionLabeler) -> Record {
    let mut record = Record::new().field("Version", labeler.label(&summary.key));
    for (name, column) in columns.iter().zip(&summary.columns) {
        record.push(name.as_str(), format_float(column.mean));
        let ci = column
            .ci
            .map(format_float)
            .unwrap_or_else(|| NOT_APPLICABLE.to_string());
        record.push(format!("CI {name}"), ci);
    }
    record
}

/// Files directly inside `dir` whose names match the glob `pattern`, sorted.
///
/// # Errors
///
/// Returns [`SnapstatError::Config`] for an invalid pattern or
/// [`SnapstatError::Io`] if `dir` cannot be read.
pub fn find_inputs(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = glob::Pattern::new(pattern)
        .map_err(|e| SnapstatError::Config(format!("invalid input pattern: {e}")))?;
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if pattern.matches(&entry.file_name().to_string_lossy()) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}
