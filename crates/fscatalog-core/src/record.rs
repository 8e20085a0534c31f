//! Rows and summaries emitted by a catalog run.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::config::TimestampZone;
use crate::provider::FileStat;

/// Column header of every file manifest.
pub const MANIFEST_HEADER: [&str; 3] = ["path", "size", "modified"];

/// One visited file. Written as a single manifest row and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the owning scan boundary.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
}

impl FileRecord {
    /// Create a record from a stat result.
    pub fn new(path: impl Into<String>, stat: &FileStat) -> Self {
        Self {
            path: path.into(),
            size: stat.size,
            modified: stat.modified,
        }
    }

    /// Render the record as manifest columns.
    pub fn to_row(&self, zone: TimestampZone) -> [String; 3] {
        [
            self.path.clone(),
            self.size.to_string(),
            zone.format(self.modified),
        ]
    }
}

/// A directory excluded by an ignore marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredEntry {
    /// Directory path relative to the owning scan boundary.
    pub path: String,
}

impl IgnoredEntry {
    /// Create an entry for a relative directory path (`""` is the scan root).
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Log line for the entry, always ending in `/`.
    pub fn to_line(&self) -> String {
        if self.path.is_empty() {
            "./".to_string()
        } else {
            format!("{}/", self.path.trim_end_matches('/'))
        }
    }
}

/// Per-project totals, owned by exactly one project scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    /// Canonical path of the project: source label joined with its location.
    pub path: String,
    /// Number of rows in the project manifest.
    pub file_count: u64,
    /// Sum of the manifest's size column.
    pub total_size: u64,
}

impl ProjectMetadata {
    /// Start an empty tally for a project.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file_count: 0,
            total_size: 0,
        }
    }

    /// Account for one more file.
    pub fn record_file(&mut self, size: u64) {
        self.file_count += 1;
        self.total_size += size;
    }
}

/// Run-level tally returned by a successful catalog run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Sources walked.
    pub sources: u64,
    /// Projects cataloged, counting replaced ones.
    pub projects: u64,
    /// Projects whose output was replaced by a later project of the same name.
    pub projects_replaced: u64,
    /// Files written to the root unfiled manifest.
    pub unfiled_files: u64,
    /// Total size of unfiled files.
    pub unfiled_size: u64,
    /// Files written to project manifests.
    pub project_files: u64,
    /// Total size of project files.
    pub project_size: u64,
    /// Documentation files mirrored into project outputs.
    pub documents_copied: u64,
    /// Directories excluded by an ignore marker, at any level.
    pub ignored_dirs: u64,
    /// Tooling directories skipped inside projects.
    pub skipped_dirs: u64,
}

impl CatalogStats {
    /// Create an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an unfiled file.
    pub fn record_unfiled(&mut self, size: u64) {
        self.unfiled_files += 1;
        self.unfiled_size += size;
    }

    /// Fold a finished project into the run totals.
    pub fn record_project(&mut self, metadata: &ProjectMetadata) {
        self.projects += 1;
        self.project_files += metadata.file_count;
        self.project_size += metadata.total_size;
    }

    /// Files cataloged anywhere in the run.
    pub fn total_files(&self) -> u64 {
        self.unfiled_files + self.project_files
    }

    /// Bytes cataloged anywhere in the run.
    pub fn total_size(&self) -> u64 {
        self.unfiled_size + self.project_size
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;

    #[test]
    fn test_file_record_row() {
        let stat = FileStat {
            size: 10,
            modified: UNIX_EPOCH + Duration::from_secs(1_700_000_000),
            is_dir: false,
            is_file: true,
        };
        let record = FileRecord::new("loose.bin", &stat);
        assert_eq!(
            record.to_row(TimestampZone::Utc),
            [
                "loose.bin".to_string(),
                "10".to_string(),
                "2023-11-14T22:13:20Z".to_string()
            ]
        );
    }

    #[test]
    fn test_ignored_entry_line() {
        assert_eq!(IgnoredEntry::new("b").to_line(), "b/");
        assert_eq!(IgnoredEntry::new("a/b/").to_line(), "a/b/");
        assert_eq!(IgnoredEntry::new("").to_line(), "./");
    }

    #[test]
    fn test_project_metadata_accumulates() {
        let mut metadata = ProjectMetadata::new("a");
        metadata.record_file(5);
        metadata.record_file(7);
        assert_eq!(metadata.file_count, 2);
        assert_eq!(metadata.total_size, 12);
    }

    #[test]
    fn test_stats_totals() {
        let mut stats = CatalogStats::new();
        stats.record_unfiled(10);
        let mut metadata = ProjectMetadata::new("a");
        metadata.record_file(5);
        stats.record_project(&metadata);

        assert_eq!(stats.projects, 1);
        assert_eq!(stats.total_files(), 2);
        assert_eq!(stats.total_size(), 15);
    }
}
