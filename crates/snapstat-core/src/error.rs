use std::path::PathBuf;

/// Errors that can occur across snapstat.
///
/// Each variant wraps a specific error domain. Library crates return this type
/// directly; the binary renders it through `miette`.
///
/// # Examples
///
/// ```
/// use snapstat_core::SnapstatError;
///
/// let err = SnapstatError::Config("confidence must be in (0, 1)".into());
/// assert!(err.to_string().contains("confidence"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum SnapstatError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    #[diagnostic(code(snapstat::io))]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(code(snapstat::config), help("check .snapstat.toml or the command-line flags"))]
    Config(String),

    /// Malformed input data.
    #[error("parse error: {0}")]
    #[diagnostic(code(snapstat::parse))]
    Parse(String),

    /// The external diff tool could not be run or failed.
    #[error("diff tool error: {0}")]
    #[diagnostic(
        code(snapstat::diff_tool),
        help("snapshot comparison needs `git` on PATH (or set [diff] program)")
    )]
    DiffTool(String),

    /// A statistic was requested on a sample that is too small.
    #[error("need at least {needed} samples, got {found}")]
    #[diagnostic(code(snapstat::insufficient_samples))]
    InsufficientSamples {
        /// Minimum sample size for the statistic.
        needed: usize,
        /// Actual sample size.
        found: usize,
    },

    /// Confidence level outside the open interval (0, 1).
    #[error("confidence level {0} is outside (0, 1)")]
    #[diagnostic(code(snapstat::invalid_confidence))]
    InvalidConfidence(f64),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    #[diagnostic(code(snapstat::serialization))]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    #[diagnostic(code(snapstat::toml))]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    #[diagnostic(code(snapstat::file_not_found))]
    FileNotFound(PathBuf),
}
