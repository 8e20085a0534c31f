//! Lazily created catalog artifacts.
//!
//! Writers open their file on the first row and are released on every exit
//! path of their owning scanner: `close` on success reports flush errors,
//! and dropping an unclosed writer still flushes what was buffered.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use fscatalog_core::{
    CatalogError, FileRecord, IgnoredEntry, MANIFEST_HEADER, ProjectMetadata, Result,
    TimestampZone,
};

/// Root-level manifest of files outside any project.
pub const UNFILED_MANIFEST: &str = "unfiled.csv";
/// Root-level log of directories excluded by an ignore marker.
pub const IGNORED_LOG: &str = "ignored.txt";
/// Per-project file manifest.
pub const PROJECT_MANIFEST: &str = "00-files.csv";
/// Per-project log of nested ignored directories.
pub const PROJECT_IGNORED_LOG: &str = "00-ignored.txt";
/// Per-project summary record.
pub const PROJECT_SUMMARY: &str = "00-metadata.yml";

fn create_artifact(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| CatalogError::write(path, e))
}

/// CSV manifest with a `path,size,modified` header written before the first row.
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    zone: TimestampZone,
    writer: Option<csv::Writer<File>>,
    rows: u64,
}

impl ManifestWriter {
    /// Prepare a manifest at `path`. Nothing is created until the first row.
    pub fn new(path: impl Into<PathBuf>, zone: TimestampZone) -> Self {
        Self {
            path: path.into(),
            zone,
            writer: None,
            rows: 0,
        }
    }

    fn open(&self) -> Result<csv::Writer<File>> {
        let mut writer = csv::Writer::from_writer(create_artifact(&self.path)?);
        writer
            .write_record(MANIFEST_HEADER)
            .map_err(|e| CatalogError::write(&self.path, e.into()))?;
        Ok(writer)
    }

    /// Append one row, creating the file on first use.
    pub fn write(&mut self, record: &FileRecord) -> Result<()> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => self.open()?,
        };
        let writer = self.writer.insert(writer);
        writer
            .write_record(record.to_row(self.zone))
            .map_err(|e| CatalogError::write(&self.path, e.into()))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, excluding the header.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and release the file, if it was ever created.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| CatalogError::write(&self.path, e))?;
        }
        Ok(())
    }
}

/// Plain text log, one excluded directory per line.
#[derive(Debug)]
pub struct IgnoreLog {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    lines: u64,
}

impl IgnoreLog {
    /// Prepare a log at `path`. Nothing is created until the first line.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            lines: 0,
        }
    }

    /// Append one entry, creating the file on first use.
    pub fn record(&mut self, entry: &IgnoredEntry) -> Result<()> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => BufWriter::new(create_artifact(&self.path)?),
        };
        let writer = self.writer.insert(writer);
        writeln!(writer, "{}", entry.to_line()).map_err(|e| CatalogError::write(&self.path, e))?;
        self.lines += 1;
        Ok(())
    }

    /// Lines written so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Flush and release the file, if it was ever created.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| CatalogError::write(&self.path, e))?;
        }
        Ok(())
    }
}

/// The manifest and ignore log owned by one scanner.
#[derive(Debug)]
pub struct OutputSink {
    manifest: ManifestWriter,
    ignored: IgnoreLog,
}

impl OutputSink {
    /// Sink writing the root-level artifacts into `dir`.
    ///
    /// One sink is shared by every source of a run. Rows are relative to
    /// their own source root, so with several sources the same path (even
    /// `./`) may appear more than once without saying which source it came
    /// from.
    pub fn root(dir: &Path, zone: TimestampZone) -> Self {
        Self {
            manifest: ManifestWriter::new(dir.join(UNFILED_MANIFEST), zone),
            ignored: IgnoreLog::new(dir.join(IGNORED_LOG)),
        }
    }

    /// Sink writing one project's artifacts into `dir`.
    pub fn project(dir: &Path, zone: TimestampZone) -> Self {
        Self {
            manifest: ManifestWriter::new(dir.join(PROJECT_MANIFEST), zone),
            ignored: IgnoreLog::new(dir.join(PROJECT_IGNORED_LOG)),
        }
    }

    /// Append a manifest row.
    pub fn record_file(&mut self, record: &FileRecord) -> Result<()> {
        self.manifest.write(record)
    }

    /// Append an ignore log line.
    pub fn record_ignored(&mut self, entry: &IgnoredEntry) -> Result<()> {
        self.ignored.record(entry)
    }

    /// Rows written to the manifest.
    pub fn files(&self) -> u64 {
        self.manifest.rows()
    }

    /// Lines written to the ignore log.
    pub fn ignored(&self) -> u64 {
        self.ignored.lines()
    }

    /// Close both writers. Both are attempted; the first error wins.
    pub fn close(&mut self) -> Result<()> {
        let ignored = self.ignored.close();
        let manifest = self.manifest.close();
        ignored.and(manifest)
    }
}

/// Serialize a project summary into `dir`, replacing any previous one.
pub fn write_summary(dir: &Path, metadata: &ProjectMetadata) -> Result<PathBuf> {
    let path = dir.join(PROJECT_SUMMARY);
    let mut writer = BufWriter::new(create_artifact(&path)?);
    serde_yaml::to_writer(&mut writer, metadata)
        .map_err(|e| CatalogError::write(&path, io::Error::other(e)))?;
    writer.flush().map_err(|e| CatalogError::write(&path, e))?;
    Ok(path)
}

/// Delete `dir` if present, then create it empty.
pub fn reset_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(CatalogError::write(dir, e)),
    }
    fs::create_dir_all(dir).map_err(|e| CatalogError::write(dir, e))
}
