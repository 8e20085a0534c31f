//! Scanner driving one catalog run across all sources.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use fscatalog_core::{
    CatalogError, CatalogOptions, CatalogStats, FileRecord, FilesystemProvider, IgnoredEntry,
    Result, Source, SubFs, base_name, join_path,
};
use tracing::{debug, info, warn};

use crate::output::{IGNORED_LOG, OutputSink, UNFILED_MANIFEST, reset_dir};
use crate::project::ProjectScanner;
use crate::walk::{ScanRules, Visitor, WalkDecision, display_path, has_marker, walk};

/// Output directory name used for a project anchored at an unnamed root.
pub const UNNAMED_PROJECT: &str = "_root";

/// Appended to a project name that would clash with a root artifact.
const RESERVED_SUFFIX: &str = "_project";

/// Run a full catalog of `sources` into `options.output_dir`.
///
/// The output directory is deleted and recreated first. The run stops at
/// the first error, possibly leaving a partial catalog behind.
pub fn generate(sources: &[Source], options: &CatalogOptions) -> Result<CatalogStats> {
    RootScanner::new(options)?.generate(sources)
}

/// Partitions sources into projects and unfiled content.
pub struct RootScanner {
    output_dir: PathBuf,
    rules: ScanRules,
    sink: OutputSink,
    project_names: HashSet<String>,
    stats: CatalogStats,
}

impl RootScanner {
    /// Validate `options` and prepare a run. Nothing is touched on disk yet.
    pub fn new(options: &CatalogOptions) -> Result<Self> {
        let rules = ScanRules::from_options(options)?;
        Ok(Self {
            output_dir: options.output_dir.clone(),
            sink: OutputSink::root(&options.output_dir, rules.timestamp_zone),
            rules,
            project_names: HashSet::new(),
            stats: CatalogStats::new(),
        })
    }

    /// Regenerate the catalog from `sources`, in order.
    pub fn generate(mut self, sources: &[Source]) -> Result<CatalogStats> {
        reset_dir(&self.output_dir)?;
        info!(target: "fscatalog::root", output = %self.output_dir.display(), "catalog started");

        for source in sources {
            info!(target: "fscatalog::root", source = %source.root_label, "scanning source");
            let mut visitor = SourceVisitor {
                scanner: &mut self,
                label: &source.root_label,
            };
            walk(source.filesystem.as_ref(), &source.root_label, &mut visitor)?;
            self.stats.sources += 1;
        }

        self.sink.close()?;
        self.stats.ignored_dirs += self.sink.ignored();
        info!(
            target: "fscatalog::root",
            projects = self.stats.projects,
            files = self.stats.total_files(),
            "catalog finished"
        );
        Ok(self.stats)
    }

    fn catalog_project(
        &mut self,
        fs: &dyn FilesystemProvider,
        label: &str,
        path: &str,
    ) -> Result<()> {
        let mut name = project_name(label, path);
        if is_reserved(&name) {
            warn!(
                target: "fscatalog::root",
                project = %name,
                source = label,
                "project name clashes with a catalog artifact, renaming"
            );
            name.push_str(RESERVED_SUFFIX);
        }
        let output_dir = self.output_dir.join(&name);

        if !self.project_names.insert(name.clone()) {
            warn!(
                target: "fscatalog::root",
                project = %name,
                source = label,
                "project name already cataloged, replacing earlier output"
            );
            match fs::remove_dir_all(&output_dir) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(CatalogError::write(&output_dir, e)),
            }
            self.stats.projects_replaced += 1;
        }

        let canonical_path = join_path(label, path);
        info!(target: "fscatalog::root", project = %canonical_path, "cataloging project");

        let view = SubFs::new(fs, path);
        let mut scanner = ProjectScanner::new(&view, canonical_path, output_dir, &self.rules)?;
        scanner.generate()?;
        let report = scanner.close()?;

        self.stats.record_project(&report.metadata);
        self.stats.documents_copied += report.documents_copied;
        self.stats.ignored_dirs += report.ignored_dirs;
        self.stats.skipped_dirs += report.skipped_dirs;
        Ok(())
    }
}

/// Output directory name for a project at `path` within the source `label`.
fn project_name(label: &str, path: &str) -> String {
    base_name(path)
        .or_else(|| base_name(label))
        .unwrap_or(UNNAMED_PROJECT)
        .to_string()
}

/// Whether `name` is taken by a root-level artifact file.
fn is_reserved(name: &str) -> bool {
    name == UNFILED_MANIFEST || name == IGNORED_LOG
}

/// Root-level walk of a single source.
struct SourceVisitor<'s> {
    scanner: &'s mut RootScanner,
    label: &'s str,
}

impl Visitor for SourceVisitor<'_> {
    fn enter_dir(&mut self, fs: &dyn FilesystemProvider, path: &str) -> Result<WalkDecision> {
        let rules = &self.scanner.rules;

        if has_marker(fs, self.label, path, &rules.ignore_file)? {
            debug!(target: "fscatalog::root", path = %display_path(self.label, path), "ignoring directory");
            self.scanner.sink.record_ignored(&IgnoredEntry::new(path))?;
            return Ok(WalkDecision::SkipSubtree);
        }

        if has_marker(fs, self.label, path, &rules.anchor_file)? {
            self.scanner.catalog_project(fs, self.label, path)?;
            return Ok(WalkDecision::SkipSubtree);
        }

        Ok(WalkDecision::Descend)
    }

    fn visit_file(&mut self, fs: &dyn FilesystemProvider, path: &str) -> Result<()> {
        let display = display_path(self.label, path);
        let stat = fs
            .lstat(path)
            .map_err(|e| CatalogError::read(display.clone(), e))?
            .ok_or_else(|| CatalogError::read(display, std::io::Error::from(ErrorKind::NotFound)))?;

        self.scanner.sink.record_file(&FileRecord::new(path, &stat))?;
        self.scanner.stats.record_unfiled(stat.size);
        Ok(())
    }
}
