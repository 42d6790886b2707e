use serde::Serialize;
use snapstat_core::{format_float, Metric};
use snapstat_report::Record;

use crate::collector::{ChangeTally, DiffStats};
use crate::snapshot::{CodeClassifier, DirectorySnapshot, SnapshotStats};

const SEPARATOR: &str = "*";

/// One output row of the directory report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionReport {
    pub version: String,
    pub stats: SnapshotStats,
    pub diff: DiffStats,
}

impl VersionReport {
    pub fn new(snapshot: &DirectorySnapshot, stats: SnapshotStats, diff: DiffStats) -> Self {
        Self {
            version: snapshot.label.clone(),
            stats,
            diff,
        }
    }

    /// Render as a CSV record.
    ///
    /// Change columns are `N/A` for a snapshot without a predecessor; a ratio
    /// is also `N/A` when its denominator is zero.
    pub fn to_record(&self, classifier: &CodeClassifier, version_header: &str) -> Record {
        let stats = &self.stats;
        let mut record = Record::new()
            .field(version_header, &self.version)
            .field("Num all files", stats.files)
            .field("Size all files (B)", stats.bytes)
            .field(
                format!("Num code files ({})", classifier.describe()),
                stats.code_files,
            )
            .field("Size code files (B)", stats.code_bytes)
            .field(SEPARATOR, SEPARATOR);

        push_changes(&mut record, "All", "all", self.diff.all, stats.files, stats.bytes);
        record.push(SEPARATOR, SEPARATOR);
        push_changes(
            &mut record,
            "Code",
            "code",
            self.diff.code,
            stats.code_files,
            stats.code_bytes,
        );
        record.push(SEPARATOR, SEPARATOR);
        record.push("File extension histogram", &stats.extensions);
        record
    }
}

fn push_changes(
    record: &mut Record,
    title: &str,
    lower: &str,
    tally: Metric<ChangeTally>,
    files: u64,
    bytes: u64,
) {
    let field = |f: fn(&ChangeTally) -> u64| tally.map(|t| f(&t));
    let ratio = |m: Metric<u64>, denominator: u64| m.ratio(denominator).map(format_float);

    let files_changed = field(|t| t.files_changed);
    let changed_bytes = field(|t| t.changed_bytes);

    record.push(format!("{title} line additions"), field(|t| t.additions));
    record.push(format!("{title} line removals"), field(|t| t.removals));
    record.push(format!("{title} files changed"), files_changed);
    record.push(
        format!("Ratio {lower} files changed"),
        ratio(files_changed, files),
    );
    record.push(format!("{title} changed bytes"), changed_bytes);
    record.push(
        format!("Ratio {lower} bytes changed"),
        ratio(changed_bytes, bytes),
    );
}
