use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Literal written in place of a value that has no meaning for a row.
pub const NOT_APPLICABLE: &str = "N/A";

/// A value that may be explicitly "not applicable".
///
/// Distinguishes "no prior version to compare against" from "compared, and
/// nothing changed": the first snapshot of a sequence reports
/// `NotApplicable`, never zero.
///
/// # Examples
///
/// ```
/// use snapstat_core::Metric;
///
/// let changed = Metric::Value(3u64);
/// assert_eq!(changed.to_string(), "3");
/// assert_eq!(Metric::<u64>::NotApplicable.to_string(), "N/A");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric<T> {
    /// A computed value.
    Value(T),
    /// No value exists for this row.
    NotApplicable,
}

impl<T> Metric<T> {
    /// Map the inner value, keeping `NotApplicable` as is.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Metric<U> {
        match self {
            Metric::Value(v) => Metric::Value(f(v)),
            Metric::NotApplicable => Metric::NotApplicable,
        }
    }

    /// Convert to an `Option`, dropping the sentinel.
    pub fn value(self) -> Option<T> {
        match self {
            Metric::Value(v) => Some(v),
            Metric::NotApplicable => None,
        }
    }
}

impl Metric<u64> {
    /// `self / denominator` as a float.
    ///
    /// A `NotApplicable` numerator or a zero denominator yields
    /// `NotApplicable` rather than a division attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapstat_core::Metric;
    ///
    /// assert_eq!(Metric::Value(1u64).ratio(4), Metric::Value(0.25));
    /// assert_eq!(Metric::Value(1u64).ratio(0), Metric::NotApplicable);
    /// assert_eq!(Metric::<u64>::NotApplicable.ratio(4), Metric::NotApplicable);
    /// ```
    pub fn ratio(self, denominator: u64) -> Metric<f64> {
        match self {
            Metric::Value(n) if denominator > 0 => Metric::Value(n as f64 / denominator as f64),
            _ => Metric::NotApplicable,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Metric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => v.fmt(f),
            Metric::NotApplicable => f.write_str(NOT_APPLICABLE),
        }
    }
}

impl<T: Serialize> Serialize for Metric<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metric::Value(v) => v.serialize(serializer),
            Metric::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

/// Render a float in shortest round-trip form, always with a decimal part
/// or exponent (`2.0`, `0.25`, `1e-7`).
///
/// # Examples
///
/// ```
/// use snapstat_core::format_float;
///
/// assert_eq!(format_float(2.0), "2.0");
/// assert_eq!(format_float(0.25), "0.25");
/// ```
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Output format for command results printed to stdout.
///
/// # Examples
///
/// ```
/// use snapstat_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary lines.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
