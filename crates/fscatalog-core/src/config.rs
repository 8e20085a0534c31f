//! Catalog run options.

use std::path::PathBuf;
use std::time::SystemTime;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Default name of the anchor marker file.
pub const DEFAULT_ANCHOR_FILE: &str = "README.md";

/// Default name of the ignore marker file.
pub const DEFAULT_IGNORE_FILE: &str = ".catalogignore";

/// Tooling directories skipped inside projects unless configured otherwise.
pub const DEFAULT_SKIP_PATTERNS: &[&str] = &[".git", ".devbox", "node_modules", ".gradle"];

/// Offset used when rendering modification timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    /// The local offset of the machine running the catalog.
    #[default]
    Local,
    /// UTC, rendered with a `Z` suffix.
    Utc,
}

impl TimestampZone {
    /// Render a timestamp as offset-qualified RFC 3339 with second precision.
    pub fn format(&self, time: SystemTime) -> String {
        match self {
            Self::Local => DateTime::<Local>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true),
            Self::Utc => DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Options for one catalog run. Read-only for the whole run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CatalogOptions {
    /// Marker file that designates a directory as a project root.
    #[builder(default = "DEFAULT_ANCHOR_FILE.to_string()")]
    #[serde(default = "default_anchor_file")]
    pub anchor_file: String,

    /// Marker file that excludes a directory's whole subtree.
    #[builder(default = "DEFAULT_IGNORE_FILE.to_string()")]
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,

    /// Catalog output directory. Deleted and recreated by every run.
    pub output_dir: PathBuf,

    /// Directory name globs not descended into inside projects.
    #[builder(default = "default_skip_patterns()")]
    #[serde(default = "default_skip_patterns")]
    pub skip_patterns: Vec<String>,

    /// Offset used for the `modified` column of manifests.
    #[builder(default)]
    #[serde(default)]
    pub timestamp_zone: TimestampZone,
}

fn default_anchor_file() -> String {
    DEFAULT_ANCHOR_FILE.to_string()
}

fn default_ignore_file() -> String {
    DEFAULT_IGNORE_FILE.to_string()
}

fn default_skip_patterns() -> Vec<String> {
    DEFAULT_SKIP_PATTERNS.iter().map(|s| s.to_string()).collect()
}

impl CatalogOptionsBuilder {
    fn validate(&self) -> std::result::Result<(), String> {
        match self.output_dir {
            Some(ref dir) if dir.as_os_str().is_empty() => {
                return Err("Output directory cannot be empty".to_string());
            }
            None => return Err("Output directory is required".to_string()),
            _ => {}
        }
        let anchor = self.anchor_file.as_deref().unwrap_or(DEFAULT_ANCHOR_FILE);
        let ignore = self.ignore_file.as_deref().unwrap_or(DEFAULT_IGNORE_FILE);
        check_marker_names(anchor, ignore)
    }
}

fn check_marker_names(anchor: &str, ignore: &str) -> std::result::Result<(), String> {
    for (label, name) in [("Anchor", anchor), ("Ignore", ignore)] {
        if name.is_empty() {
            return Err(format!("{label} file name cannot be empty"));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(format!("{label} file name must not contain a path separator: {name}"));
        }
    }
    if anchor == ignore {
        return Err(format!("Anchor and ignore file names must differ: {anchor}"));
    }
    Ok(())
}

impl CatalogOptions {
    /// Create a new options builder.
    pub fn builder() -> CatalogOptionsBuilder {
        CatalogOptionsBuilder::default()
    }

    /// Create options with default marker names for an output directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            anchor_file: default_anchor_file(),
            ignore_file: default_ignore_file(),
            output_dir: output_dir.into(),
            skip_patterns: default_skip_patterns(),
            timestamp_zone: TimestampZone::default(),
        }
    }

    /// Check the options before a run touches the output directory.
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(CatalogError::config("Output directory cannot be empty"));
        }
        check_marker_names(&self.anchor_file, &self.ignore_file).map_err(CatalogError::config)?;
        self.skip_matcher().map(|_| ())
    }

    /// Compile `skip_patterns` into a matcher for directory base names.
    pub fn skip_matcher(&self) -> Result<GlobSet> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.skip_patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                CatalogError::config(format!("Invalid skip pattern {pattern:?}: {e}"))
            })?;
            builder.add(glob);
        }
        builder
            .build()
            .map_err(|e| CatalogError::config(format!("Invalid skip patterns: {e}")))
    }
}
