use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use snapstat_core::{Result, SnapstatError};

/// A directory holding one version of a source tree.
///
/// # Examples
///
/// ```
/// use snapstat_difflens::snapshot::DirectorySnapshot;
///
/// let snap = DirectorySnapshot::new("releases/srsRAN-release_22_04_zzz", Some("_zzz"));
/// assert_eq!(snap.label, "srsRAN-release_22_04");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorySnapshot {
    /// Directory on disk.
    pub path: PathBuf,
    /// Label written to the version column.
    pub label: String,
}

impl DirectorySnapshot {
    /// Snapshot for `path`, labelled by its final component minus `sort_suffix`.
    pub fn new(path: impl Into<PathBuf>, sort_suffix: Option<&str>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let label = match sort_suffix.filter(|s| !s.is_empty()) {
            Some(suffix) => name.strip_suffix(suffix).unwrap_or(&name).to_string(),
            None => name,
        };
        Self { path, label }
    }
}

/// How [`discover_snapshots`] orders and labels what it finds.
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    /// Suffix stripped from labels.
    pub sort_suffix: Option<String>,
    /// Return directories in reverse name order.
    pub reverse: bool,
}

/// Immediate subdirectories of `root` whose names match the glob `pattern`,
/// sorted by name.
///
/// # Errors
///
/// Returns [`SnapstatError::Config`] for an invalid pattern or
/// [`SnapstatError::Io`] if `root` cannot be listed.
pub fn discover_snapshots(
    root: &Path,
    pattern: &str,
    options: &DiscoverOptions,
) -> Result<Vec<DirectorySnapshot>> {
    let matcher = glob::Pattern::new(pattern)
        .map_err(|e| SnapstatError::Config(format!("invalid directory pattern: {e}")))?;
    if !root.is_dir() {
        return Err(SnapstatError::FileNotFound(root.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if matcher.matches(&entry.file_name().to_string_lossy()) {
            paths.push(entry.path());
        }
    }
    paths.sort();
    if options.reverse {
        paths.reverse();
    }

    tracing::debug!(root = %root.display(), pattern, found = paths.len(), "discovered snapshots");
    let suffix = options.sort_suffix.as_deref();
    Ok(paths
        .into_iter()
        .map(|p| DirectorySnapshot::new(p, suffix))
        .collect())
}

/// Lowercased, dot-prefixed extension of the last path component, or `""`.
///
/// Leading dots of the file name do not start an extension, so `.gitignore`
/// has none.
///
/// # Examples
///
/// ```
/// use snapstat_difflens::snapshot::extension_of;
///
/// assert_eq!(extension_of("src/Main.CPP"), ".cpp");
/// assert_eq!(extension_of("archive.tar.gz"), ".gz");
/// assert_eq!(extension_of("Makefile"), "");
/// assert_eq!(extension_of(".gitignore"), "");
/// ```
pub fn extension_of(path: &str) -> String {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let stem_start = name.len() - name.trim_start_matches('.').len();
    match name[stem_start..].rfind('.') {
        Some(dot) => name[stem_start + dot..].to_lowercase(),
        None => String::new(),
    }
}

/// Decides which files count as code, by exact extension.
///
/// # Examples
///
/// ```
/// use snapstat_difflens::snapshot::CodeClassifier;
///
/// let classifier = CodeClassifier::new(["cpp", ".h"]);
/// assert!(classifier.is_code("src/a.CPP"));
/// assert!(classifier.is_code("include/a.h"));
/// assert!(!classifier.is_code("README.md"));
/// assert_eq!(classifier.describe(), "cpp, h");
/// ```
#[derive(Debug, Clone)]
pub struct CodeClassifier {
    extensions: Vec<String>,
}

impl CodeClassifier {
    /// Build from extensions written with or without the leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }
        Self {
            extensions: normalized,
        }
    }

    /// Whether `path` has one of the code extensions.
    pub fn is_code(&self, path: &str) -> bool {
        let ext = extension_of(path);
        match ext.strip_prefix('.') {
            Some(ext) => self.extensions.iter().any(|e| e == ext),
            None => false,
        }
    }

    /// Extension list for the code-file column header, e.g. `cpp, py, c`.
    pub fn describe(&self) -> String {
        self.extensions.join(", ")
    }
}

/// File counts per extension, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionHistogram {
    counts: IndexMap<String, u64>,
}

impl ExtensionHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one file with extension `ext`.
    pub fn add(&mut self, ext: impl Into<String>) {
        *self.counts.entry(ext.into()).or_insert(0) += 1;
    }

    pub fn count(&self, ext: &str) -> u64 {
        self.counts.get(ext).copied().unwrap_or(0)
    }

    /// Entries by count, highest first; ties keep first-seen order.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> =
            self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

impl fmt::Display for ExtensionHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (ext, count)) in self.sorted().into_iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{ext} ({count})")?;
        }
        Ok(())
    }
}

impl Serialize for ExtensionHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.sorted())
    }
}

/// Totals for one snapshot directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    pub files: u64,
    pub bytes: u64,
    pub code_files: u64,
    pub code_bytes: u64,
    pub extensions: ExtensionHistogram,
}

/// Walk every regular file under the snapshot, hidden and ignored files
/// included, and total counts and sizes.
///
/// Entries that cannot be read are skipped with a warning.
///
/// # Errors
///
/// Returns [`SnapstatError::FileNotFound`] if the snapshot directory does not
/// exist.
pub fn scan_snapshot(
    snapshot: &DirectorySnapshot,
    classifier: &CodeClassifier,
) -> Result<SnapshotStats> {
    if !snapshot.path.is_dir() {
        return Err(SnapstatError::FileNotFound(snapshot.path.clone()));
    }

    let walker = ignore::WalkBuilder::new(&snapshot.path)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut stats = SnapshotStats::default();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }

        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "skipping file");
                continue;
            }
        };

        let path = entry.path().to_string_lossy();
        stats.files += 1;
        stats.bytes += size;
        if classifier.is_code(&path) {
            stats.code_files += 1;
            stats.code_bytes += size;
        }
        stats.extensions.add(extension_of(&path));
    }

    tracing::debug!(
        snapshot = %snapshot.label,
        files = stats.files,
        bytes = stats.bytes,
        "scanned snapshot"
    );
    Ok(stats)
}
