//! Scanner for one anchor-marked project subtree.

use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use fscatalog_core::{
    CatalogError, FileRecord, FilesystemProvider, IgnoredEntry, ProjectMetadata, Result,
    base_name,
};
use tracing::debug;

use crate::output::{OutputSink, write_summary};
use crate::walk::{ScanRules, Visitor, WalkDecision, display_path, has_marker, walk};

/// File name suffixes whose content is mirrored into the project output.
pub const DOCUMENT_SUFFIXES: [&str; 3] = [".md", ".txt", ".adoc"];

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Whether a file name ends in one of the [`DOCUMENT_SUFFIXES`].
pub fn is_document(name: &str) -> bool {
    DOCUMENT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Outcome of a finished project scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReport {
    /// Final totals, as written to the summary.
    pub metadata: ProjectMetadata,
    /// Where the summary was written.
    pub summary_path: PathBuf,
    /// Documentation files mirrored.
    pub documents_copied: u64,
    /// Nested directories excluded by an ignore marker.
    pub ignored_dirs: u64,
    /// Tooling directories skipped.
    pub skipped_dirs: u64,
}

/// Catalogs one project subtree into its own output directory.
///
/// Anchor markers are inert here: nested projects are part of the
/// enclosing one.
pub struct ProjectScanner<'a> {
    fs: &'a dyn FilesystemProvider,
    output_dir: PathBuf,
    rules: &'a ScanRules,
    metadata: ProjectMetadata,
    sink: OutputSink,
    documents_copied: u64,
    skipped_dirs: u64,
}

impl<'a> ProjectScanner<'a> {
    /// Create a scanner over `fs`, a view rooted at the project directory.
    ///
    /// `canonical_path` is reported in the summary. `output_dir` is created
    /// if missing.
    pub fn new(
        fs: &'a dyn FilesystemProvider,
        canonical_path: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        rules: &'a ScanRules,
    ) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|e| CatalogError::write(&output_dir, e))?;
        let sink = OutputSink::project(&output_dir, rules.timestamp_zone);
        Ok(Self {
            fs,
            output_dir,
            rules,
            metadata: ProjectMetadata::new(canonical_path),
            sink,
            documents_copied: 0,
            skipped_dirs: 0,
        })
    }

    /// The project's output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Totals accumulated so far.
    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    /// Walk the whole project subtree.
    pub fn generate(&mut self) -> Result<()> {
        let fs = self.fs;
        let label = self.metadata.path.clone();
        walk(fs, &label, self)
    }

    /// Release the writers, then persist the summary exactly once.
    pub fn close(mut self) -> Result<ProjectReport> {
        self.sink.close()?;
        let summary_path = write_summary(&self.output_dir, &self.metadata)?;
        Ok(ProjectReport {
            ignored_dirs: self.sink.ignored(),
            metadata: self.metadata,
            summary_path,
            documents_copied: self.documents_copied,
            skipped_dirs: self.skipped_dirs,
        })
    }

    fn copy_document(&mut self, fs: &dyn FilesystemProvider, path: &str) -> Result<()> {
        let label = &self.metadata.path;
        let read_err = |e: std::io::Error| CatalogError::read(display_path(label, path), e);

        let target = path
            .split('/')
            .fold(self.output_dir.clone(), |acc, part| acc.join(part));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| CatalogError::write(parent, e))?;
        }

        let mut reader = fs.open(path).map_err(read_err)?;
        let mut file = File::create(&target).map_err(|e| CatalogError::write(&target, e))?;
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(read_err(e)),
            };
            file.write_all(&buf[..n])
                .map_err(|e| CatalogError::write(&target, e))?;
        }
        file.flush().map_err(|e| CatalogError::write(&target, e))?;

        debug!(target: "fscatalog::project", path = %target.display(), "copied document");
        self.documents_copied += 1;
        Ok(())
    }
}

impl Visitor for ProjectScanner<'_> {
    fn enter_dir(&mut self, fs: &dyn FilesystemProvider, path: &str) -> Result<WalkDecision> {
        if let Some(name) = base_name(path) {
            if self.rules.skip.is_match(name) {
                debug!(target: "fscatalog::project", path, "skipping tooling directory");
                self.skipped_dirs += 1;
                return Ok(WalkDecision::SkipSubtree);
            }
        }

        if has_marker(fs, &self.metadata.path, path, &self.rules.ignore_file)? {
            debug!(target: "fscatalog::project", path, "ignoring directory");
            self.sink.record_ignored(&IgnoredEntry::new(path))?;
            return Ok(WalkDecision::SkipSubtree);
        }

        Ok(WalkDecision::Descend)
    }

    fn visit_file(&mut self, fs: &dyn FilesystemProvider, path: &str) -> Result<()> {
        let display = display_path(&self.metadata.path, path);
        let stat = fs
            .lstat(path)
            .map_err(|e| CatalogError::read(display.clone(), e))?
            .ok_or_else(|| {
                CatalogError::read(display, std::io::Error::from(ErrorKind::NotFound))
            })?;

        if stat.is_file && base_name(path).is_some_and(is_document) {
            self.copy_document(fs, path)?;
        }

        self.sink.record_file(&FileRecord::new(path, &stat))?;
        self.metadata.record_file(stat.size);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fscatalog_core::{CatalogOptions, MemoryFs, TimestampZone};
    use tempfile::TempDir;

    fn rules() -> ScanRules {
        let mut options = CatalogOptions::new("/unused");
        options.timestamp_zone = TimestampZone::Utc;
        ScanRules::from_options(&options).unwrap()
    }

    #[test]
    fn test_is_document() {
        assert!(is_document("notes.md"));
        assert!(is_document("x.txt"));
        assert!(is_document("guide.adoc"));
        assert!(!is_document("notes.json"));
        assert!(!is_document("NOTES.MD"));
        assert!(!is_document("md"));
    }

    #[test]
    fn test_project_scan_counts_and_copies() {
        let temp = TempDir::new().unwrap();
        let fs = MemoryFs::new()
            .with_file("README.md", b"# proj")
            .with_file("notes.json", b"{}")
            .with_file("docs/notes.md", b"hello")
            .with_file("tmp/.catalogignore", b"")
            .with_file("tmp/big.bin", b"0123456789")
            .with_file(".git/config", b"[core]");
        let rules = rules();

        let mut scanner =
            ProjectScanner::new(&fs, "/src/proj", temp.path().join("proj"), &rules).unwrap();
        scanner.generate().unwrap();
        assert_eq!(scanner.metadata().file_count, 3);
        let report = scanner.close().unwrap();

        assert_eq!(report.metadata.path, "/src/proj");
        assert_eq!(report.metadata.file_count, 3);
        assert_eq!(report.metadata.total_size, 6 + 2 + 5);
        assert_eq!(report.documents_copied, 2);
        assert_eq!(report.ignored_dirs, 1);
        assert_eq!(report.skipped_dirs, 1);

        let out = temp.path().join("proj");
        assert_eq!(fs::read(out.join("docs/notes.md")).unwrap(), b"hello");
        assert!(!out.join("notes.json").exists());
        assert_eq!(fs::read_to_string(out.join("00-ignored.txt")).unwrap(), "tmp/\n");
        assert!(report.summary_path.ends_with("00-metadata.yml"));
    }

    #[test]
    fn test_empty_project_still_writes_summary() {
        let temp = TempDir::new().unwrap();
        let fs = MemoryFs::new();
        let rules = rules();

        let mut scanner = ProjectScanner::new(&fs, "empty", temp.path(), &rules).unwrap();
        scanner.generate().unwrap();
        let report = scanner.close().unwrap();

        assert_eq!(report.metadata.file_count, 0);
        assert!(!temp.path().join("00-files.csv").exists());
        assert_eq!(
            fs::read_to_string(temp.path().join("00-metadata.yml")).unwrap(),
            "path: empty\nfileCount: 0\ntotalSize: 0\n"
        );
    }

    #[test]
    fn test_copy_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let fs = MemoryFs::new()
            .with_file("a.md", b"a")
            .with_open_failure("a.md");
        let rules = rules();

        let mut scanner = ProjectScanner::new(&fs, "p", temp.path(), &rules).unwrap();
        let err = scanner.generate().unwrap_err();
        match err {
            CatalogError::FilesystemRead { path, .. } => assert_eq!(path, "p/a.md"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_root_level_ignore_marker() {
        let temp = TempDir::new().unwrap();
        let fs = MemoryFs::new()
            .with_file(".catalogignore", b"")
            .with_file("x.txt", b"x");
        let rules = rules();

        let mut scanner = ProjectScanner::new(&fs, "p", temp.path(), &rules).unwrap();
        scanner.generate().unwrap();
        let report = scanner.close().unwrap();

        assert_eq!(report.metadata.file_count, 0);
        assert_eq!(fs::read_to_string(temp.path().join("00-ignored.txt")).unwrap(), "./\n");
    }
}
