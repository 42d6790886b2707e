//! Quoted CSV output with a header taken from the first record.
//!
//! Every field is wrapped in double quotes and followed by a comma, including
//! the last one on a line. Embedded quotes are written as is; callers are
//! expected to keep them out of values.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use snapstat_core::Result;

/// One output row: named fields in column order.
///
/// Duplicate names are allowed; the separator columns of the snapshot report
/// are all called `*`.
///
/// # Examples
///
/// ```
/// use snapstat_report::csv::Record;
///
/// let record = Record::new().field("Version", "v1").field("Files", 3);
/// assert_eq!(record.names().collect::<Vec<_>>(), vec!["Version", "Files"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, builder style.
    pub fn field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.push(name, value);
        self
    }

    /// Append a field.
    pub fn push(&mut self, name: impl Into<String>, value: impl ToString) {
        self.fields.push((name.into(), value.to_string()));
    }

    /// Field names in column order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Field values in column order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    /// Look up the first field called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Incremental CSV writer.
///
/// The header is emitted once, from the names of the first record written.
///
/// # Examples
///
/// ```
/// use snapstat_report::csv::{CsvWriter, Record};
///
/// let mut writer = CsvWriter::new(Vec::new());
/// writer.write_record(&Record::new().field("Version", "v1")).unwrap();
/// writer.write_record(&Record::new().field("Version", "v2")).unwrap();
/// let bytes = writer.finish().unwrap();
/// assert_eq!(String::from_utf8(bytes).unwrap(), "\"Version\",\n\"v1\",\n\"v2\",\n");
/// ```
pub struct CsvWriter<W: Write> {
    inner: W,
    header_written: bool,
    rows: usize,
}

impl CsvWriter<BufWriter<File>> {
    /// Create (or truncate) `path` and wrap it in a writer.
    ///
    /// The file stays open until the writer is finished or dropped, so it is
    /// closed even when a later write fails.
    ///
    /// # Errors
    ///
    /// Returns [`SnapstatError::Io`](snapstat_core::SnapstatError::Io) if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        tracing::debug!(path = %path.display(), "opened CSV output");
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> CsvWriter<W> {
    /// Wrap any writer.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            header_written: false,
            rows: 0,
        }
    }

    /// Write one record, preceded by the header if this is the first one.
    ///
    /// # Errors
    ///
    /// Returns [`SnapstatError::Io`](snapstat_core::SnapstatError::Io) on write failure.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        if !self.header_written {
            write_line(&mut self.inner, record.names().map(str::trim))?;
            self.header_written = true;
        }
        write_line(&mut self.inner, record.values())?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`SnapstatError::Io`](snapstat_core::SnapstatError::Io) if the flush fails.
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

fn write_line<'a, W: Write>(
    out: &mut W,
    fields: impl Iterator<Item = &'a str>,
) -> std::io::Result<()> {
    let mut line = String::new();
    for field in fields {
        line.push('"');
        line.push_str(field);
        line.push_str("\",");
    }
    line.push('\n');
    out.write_all(line.as_bytes())
}

/// Write `rows` to a fresh CSV file at `path`, returning the row count.
///
/// # Errors
///
/// Returns [`SnapstatError::Io`](snapstat_core::SnapstatError::Io) if the file cannot be created or written.
pub fn write_csv<I>(path: &Path, rows: I) -> Result<usize>
where
    I: IntoIterator<Item = Record>,
{
    let mut writer = CsvWriter::create(path)?;
    for row in rows {
        writer.write_record(&row)?;
    }
    let rows = writer.rows_written();
    writer.finish()?;
    Ok(rows)
}
