use serde::Serialize;
use snapstat_core::Result;

/// Pretty-printed JSON for `value`.
///
/// # Errors
///
/// Returns [`SnapstatError::Serialization`](snapstat_core::SnapstatError::Serialization)
/// if `value` cannot be represented as JSON, e.g. a map with non-string keys.
///
/// # Examples
///
/// ```
/// let json = snapstat_report::to_json(&vec![("v1", 2.0)]).unwrap();
/// assert!(json.starts_with('['));
/// ```
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
