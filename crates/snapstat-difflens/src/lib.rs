//! Snapshot directory statistics and version-to-version change counts.
//!
//! Scans a sequence of source-tree snapshots, tallies file counts and sizes,
//! and compares each snapshot with the previous one using
//! `git diff --no-index --numstat`.

pub mod collector;
pub mod numstat;
pub mod report;
pub mod snapshot;

pub use collector::{tally_numstat, ChangeTally, DiffCollector, DiffStats, DiffTool, GitNoIndex};
pub use report::VersionReport;
pub use snapshot::{
    discover_snapshots, scan_snapshot, CodeClassifier, DirectorySnapshot, DiscoverOptions,
    SnapshotStats,
};
