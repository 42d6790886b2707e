use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SnapstatError;
use crate::Result;

/// Top-level configuration loaded from `.snapstat.toml`.
///
/// Command-line flags override values read from the file; missing sections
/// fall back to their defaults.
///
/// # Examples
///
/// ```
/// use snapstat_core::SnapstatConfig;
///
/// let config = SnapstatConfig::default();
/// assert_eq!(config.bench.confidence, 0.95);
/// assert_eq!(config.dirs.sort_suffix.as_deref(), Some("_zzz"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapstatConfig {
    /// Benchmark CSV processing.
    #[serde(default)]
    pub bench: BenchConfig,
    /// Snapshot directory scanning.
    #[serde(default)]
    pub dirs: DirsConfig,
    /// External diff tool.
    #[serde(default)]
    pub diff: DiffConfig,
}

impl SnapstatConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapstatError::Io`] if the file cannot be read, or
    /// [`SnapstatError::Toml`] if the content is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`SnapstatError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapstat_core::SnapstatConfig;
    ///
    /// let toml = r#"
    /// [bench]
    /// confidence = 0.99
    /// "#;
    /// let config = SnapstatConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.bench.confidence, 0.99);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`SnapstatError::Config`] for a confidence outside (0, 1), an
    /// empty benchmark column list, or a glob/regex that does not compile.
    pub fn validate(&self) -> Result<()> {
        let confidence = self.bench.confidence;
        if confidence.is_nan() || confidence <= 0.0 || confidence >= 1.0 {
            return Err(SnapstatError::Config(format!(
                "bench.confidence must be in (0, 1), got {confidence}"
            )));
        }
        if self.bench.columns.is_empty() {
            return Err(SnapstatError::Config(
                "bench.columns must name at least one metric column".into(),
            ));
        }
        if let Some(pattern) = &self.bench.version_pattern {
            regex::Regex::new(pattern).map_err(|e| {
                SnapstatError::Config(format!("bench.version_pattern is not a valid regex: {e}"))
            })?;
        }
        for (key, pattern) in [
            ("bench.input_pattern", &self.bench.input_pattern),
            ("dirs.pattern", &self.dirs.pattern),
        ] {
            glob::Pattern::new(pattern)
                .map_err(|e| SnapstatError::Config(format!("{key} is not a valid glob: {e}")))?;
        }
        if self.diff.program.trim().is_empty() {
            return Err(SnapstatError::Config("diff.program must not be empty".into()));
        }
        Ok(())
    }
}

/// Benchmark CSV processing settings.
///
/// # Examples
///
/// ```
/// use snapstat_core::BenchConfig;
///
/// let config = BenchConfig::default();
/// assert_eq!(config.columns.len(), 5);
/// assert_eq!(config.version_prefix, "v");
/// assert!(!config.emit_trailing_singleton);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Glob used to find the input CSV in the working directory.
    #[serde(default = "default_input_pattern")]
    pub input_pattern: String,
    /// Output CSV path.
    #[serde(default = "default_bench_output")]
    pub output: PathBuf,
    /// Two-sided confidence level (default: 0.95).
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Names of the metric columns following the version column.
    #[serde(default = "default_columns")]
    pub columns: Vec<String>,
    /// Regex with one capture group extracting the version from the raw key.
    pub version_pattern: Option<String>,
    /// Prefix prepended to a captured version (default: `"v"`).
    #[serde(default = "default_version_prefix")]
    pub version_prefix: String,
    /// Emit a one-row group that ends the input instead of dropping it.
    #[serde(default)]
    pub emit_trailing_singleton: bool,
}

fn default_input_pattern() -> String {
    "Algorithm_benchmark_*.csv".into()
}

fn default_bench_output() -> PathBuf {
    PathBuf::from("Algorithm_benchmark_CI_output.csv")
}

fn default_confidence() -> f64 {
    0.95
}

fn default_columns() -> Vec<String> {
    [
        "Construct leaves (ms)",
        "Form tree (ms)",
        "Generate proof (ms)",
        "Verify proof (ms)",
        "Number of files",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_version_prefix() -> String {
    "v".into()
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            input_pattern: default_input_pattern(),
            output: default_bench_output(),
            confidence: default_confidence(),
            columns: default_columns(),
            version_pattern: None,
            version_prefix: default_version_prefix(),
            emit_trailing_singleton: false,
        }
    }
}

/// Snapshot directory scanning settings.
///
/// # Examples
///
/// ```
/// use snapstat_core::DirsConfig;
///
/// let config = DirsConfig::default();
/// assert!(config.code_extensions.contains(&"cpp".to_string()));
/// assert_eq!(config.version_header, "Version");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirsConfig {
    /// Glob matched against directory names under the scan root.
    #[serde(default = "default_dirs_pattern")]
    pub pattern: String,
    /// Name suffix used only to force sort order; stripped from labels.
    #[serde(default = "default_sort_suffix")]
    pub sort_suffix: Option<String>,
    /// Extensions counted as code, with or without the leading dot.
    #[serde(default = "default_code_extensions")]
    pub code_extensions: Vec<String>,
    /// Header of the first output column.
    #[serde(default = "default_version_header")]
    pub version_header: String,
    /// Output CSV path.
    #[serde(default = "default_dirs_output")]
    pub output: PathBuf,
    /// Process discovered directories in reverse name order.
    #[serde(default)]
    pub reverse: bool,
}

fn default_dirs_pattern() -> String {
    "*".into()
}

fn default_sort_suffix() -> Option<String> {
    Some("_zzz".into())
}

fn default_code_extensions() -> Vec<String> {
    ["cpp", "py", "c", "h", "sh", "go", "js", "java"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_version_header() -> String {
    "Version".into()
}

fn default_dirs_output() -> PathBuf {
    PathBuf::from("logDirectoryOutput.csv")
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            pattern: default_dirs_pattern(),
            sort_suffix: default_sort_suffix(),
            code_extensions: default_code_extensions(),
            version_header: default_version_header(),
            output: default_dirs_output(),
            reverse: false,
        }
    }
}

/// External diff tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Program invoked as `<program> --no-pager diff --no-index --numstat`.
    #[serde(default = "default_diff_program")]
    pub program: String,
}

fn default_diff_program() -> String {
    "git".into()
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            program: default_diff_program(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = SnapstatConfig::default();
        assert_eq!(config.bench.input_pattern, "Algorithm_benchmark_*.csv");
        assert_eq!(
            config.bench.output,
            PathBuf::from("Algorithm_benchmark_CI_output.csv")
        );
        assert_eq!(config.bench.confidence, 0.95);
        assert_eq!(config.bench.columns[0], "Construct leaves (ms)");
        assert_eq!(config.bench.columns[4], "Number of files");
        assert!(config.bench.version_pattern.is_none());
        assert_eq!(config.dirs.pattern, "*");
        assert_eq!(config.dirs.code_extensions.len(), 8);
        assert_eq!(config.dirs.output, PathBuf::from("logDirectoryOutput.csv"));
        assert!(!config.dirs.reverse);
        assert_eq!(config.diff.program, "git");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[bench]
input_pattern = "bench_*.csv"
output = "out.csv"
confidence = 0.99
columns = ["Hash (ms)"]
version_pattern = ".*bitcoin-([^/]+)"
version_prefix = "release-"
emit_trailing_singleton = true

[dirs]
pattern = "srsRAN-release_*"
sort_suffix = "_sort"
code_extensions = [".rs", "toml"]
version_header = "srsRAN Version"
reverse = true

[diff]
program = "/usr/local/bin/git"
"#;
        let config = SnapstatConfig::from_toml(toml).unwrap();
        assert_eq!(config.bench.input_pattern, "bench_*.csv");
        assert_eq!(config.bench.confidence, 0.99);
        assert_eq!(config.bench.columns, vec!["Hash (ms)"]);
        assert_eq!(
            config.bench.version_pattern.as_deref(),
            Some(".*bitcoin-([^/]+)")
        );
        assert!(config.bench.emit_trailing_singleton);
        assert_eq!(config.dirs.pattern, "srsRAN-release_*");
        assert_eq!(config.dirs.sort_suffix.as_deref(), Some("_sort"));
        assert_eq!(config.dirs.code_extensions, vec![".rs", "toml"]);
        assert_eq!(config.dirs.version_header, "srsRAN Version");
        assert!(config.dirs.reverse);
        assert_eq!(config.diff.program, "/usr/local/bin/git");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = SnapstatConfig::from_toml("").unwrap();
        assert_eq!(config.bench.confidence, 0.95);
        assert_eq!(config.dirs.version_header, "Version");
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = SnapstatConfig::from_toml("{{invalid}}");
        assert!(matches!(result, Err(SnapstatError::Toml(_))));
    }

    #[test]
    fn validate_rejects_out_of_range_confidence() {
        let mut config = SnapstatConfig::default();
        config.bench.confidence = 1.0;
        assert!(matches!(config.validate(), Err(SnapstatError::Config(_))));
        config.bench.confidence = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_patterns() {
        let mut config = SnapstatConfig::default();
        config.bench.version_pattern = Some("([unclosed".into());
        assert!(config.validate().is_err());

        let mut config = SnapstatConfig::default();
        config.dirs.pattern = "[".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_columns() {
        let mut config = SnapstatConfig::default();
        config.bench.columns.clear();
        assert!(config.validate().is_err());
    }
}
