//! Line and byte change counts between two snapshot directories.
//!
//! The heavy lifting is done by an external diff tool producing
//! `--numstat` output; this module tallies that output into an all-files
//! total and a code-files total.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use snapstat_core::{Metric, Result, SnapstatError};

use crate::numstat::{parse_numstat, NumstatEntry};
use crate::snapshot::{CodeClassifier, DirectorySnapshot};

/// Produces numstat output for a pair of directories.
pub trait DiffTool {
    /// Numstat text describing the changes from `old` to `new`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapstatError::DiffTool`] if the tool cannot run or fails.
    fn numstat(&self, old: &Path, new: &Path) -> Result<String>;
}

/// Runs `git --no-pager diff --no-index --numstat` in a working directory.
#[derive(Debug, Clone)]
pub struct GitNoIndex {
    program: String,
    workdir: PathBuf,
}

impl GitNoIndex {
    /// Invoke `program` (normally `git`) from `workdir`.
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            workdir: workdir.into(),
        }
    }
}

impl DiffTool for GitNoIndex {
    fn numstat(&self, old: &Path, new: &Path) -> Result<String> {
        tracing::debug!(
            program = %self.program,
            old = %old.display(),
            new = %new.display(),
            "running diff"
        );
        let output = Command::new(&self.program)
            .current_dir(&self.workdir)
            .args(["--no-pager", "diff", "--no-index", "--numstat", "--"])
            .arg(old)
            .arg(new)
            .output()
            .map_err(|e| SnapstatError::DiffTool(format!("failed to run {}: {e}", self.program)))?;

        // Exit status 1 only means the directories differ.
        match output.status.code() {
            Some(0) | Some(1) => Ok(String::from_utf8_lossy(&output.stdout).into_owned()),
            _ => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(SnapstatError::DiffTool(format!(
                    "{} diff failed ({}): {}",
                    self.program,
                    output.status,
                    stderr.trim()
                )))
            }
        }
    }
}

/// Totals over a set of changed files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeTally {
    pub additions: u64,
    pub removals: u64,
    pub files_changed: u64,
    /// Current size of every changed file, summed.
    pub changed_bytes: u64,
}

impl ChangeTally {
    fn record(&mut self, entry: &NumstatEntry, bytes: u64) {
        self.additions += entry.additions.unwrap_or(0);
        self.removals += entry.removals.unwrap_or(0);
        self.files_changed += 1;
        self.changed_bytes += bytes;
    }
}

/// Change totals for one snapshot relative to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub all: Metric<ChangeTally>,
    pub code: Metric<ChangeTally>,
}

impl DiffStats {
    /// Stats for a snapshot with nothing to compare against.
    pub fn not_applicable() -> Self {
        Self {
            all: Metric::NotApplicable,
            code: Metric::NotApplicable,
        }
    }
}

/// Tally numstat `output`, sizing changed files relative to `root`.
///
/// Binary files and unparseable counts add no lines but still count as
/// changed. Files that no longer exist, and `/dev/null`, are zero bytes.
/// A file counts as code by its new-side path, so a deletion never does.
pub fn tally_numstat(output: &str, root: &Path, classifier: &CodeClassifier) -> DiffStats {
    let mut all = ChangeTally::default();
    let mut code = ChangeTally::default();

    for entry in parse_numstat(output) {
        let bytes = changed_file_size(root, &entry.path);
        all.record(&entry, bytes);
        if classifier.is_code(&entry.path) {
            code.record(&entry, bytes);
        }
    }

    DiffStats {
        all: Metric::Value(all),
        code: Metric::Value(code),
    }
}

fn changed_file_size(root: &Path, path: &str) -> u64 {
    if path == "/dev/null" {
        return 0;
    }
    match std::fs::metadata(root.join(path)) {
        Ok(m) => m.len(),
        Err(_) => {
            tracing::debug!(path, "changed file missing; counting 0 bytes");
            0
        }
    }
}

/// Compares consecutive snapshots with a [`DiffTool`].
pub struct DiffCollector<T: DiffTool> {
    tool: T,
    root: PathBuf,
    classifier: CodeClassifier,
}

impl DiffCollector<GitNoIndex> {
    /// Collector running `program` from `root`.
    pub fn git(program: &str, root: &Path, classifier: CodeClassifier) -> Self {
        Self::new(GitNoIndex::new(program, root), root, classifier)
    }
}

impl<T: DiffTool> DiffCollector<T> {
    /// Collector using `tool`; numstat paths are resolved against `root`.
    pub fn new(tool: T, root: &Path, classifier: CodeClassifier) -> Self {
        Self {
            tool,
            root: root.to_path_buf(),
            classifier,
        }
    }

    /// Changes from `previous` to `current`; all `N/A` without a previous
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Propagates [`SnapstatError::DiffTool`] from the tool.
    pub fn diff_stats(
        &self,
        previous: Option<&DirectorySnapshot>,
        current: &DirectorySnapshot,
    ) -> Result<DiffStats> {
        let Some(previous) = previous else {
            return Ok(DiffStats::not_applicable());
        };
        let output = self
            .tool
            .numstat(self.relative(&previous.path), self.relative(&current.path))?;
        Ok(tally_numstat(&output, &self.root, &self.classifier))
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}
