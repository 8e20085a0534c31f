//! Catalog scanners for fscatalog.
//!
//! This crate walks sources through the
//! [`FilesystemProvider`](fscatalog_core::FilesystemProvider) abstraction and
//! writes the catalog artifacts.
//!
//! # Overview
//!
//! A run is driven by [`RootScanner`]. It regenerates the output directory,
//! then walks each source in order, pre-order, deciding at every directory:
//!
//! - **ignore** if the directory holds the ignore marker: the subtree is
//!   logged to `ignored.txt` and never read;
//! - **project** if it holds the anchor marker: a [`ProjectScanner`]
//!   catalogs the subtree into its own output directory and closes before
//!   the walk moves on;
//! - **descend** otherwise. Files met on the way land in `unfiled.csv`.
//!
//! # Example
//!
//! ```rust,no_run
//! use fscatalog_scan::{CatalogOptions, Source, generate};
//!
//! let sources = vec![Source::local("/mnt/archive")];
//! let options = CatalogOptions::new("/tmp/catalog");
//! let stats = generate(&sources, &options).unwrap();
//!
//! println!("{} projects, {} files", stats.projects, stats.total_files());
//! ```

mod output;
mod project;
mod root;
mod walk;

pub use output::{
    IGNORED_LOG, IgnoreLog, ManifestWriter, OutputSink, PROJECT_IGNORED_LOG, PROJECT_MANIFEST,
    PROJECT_SUMMARY, UNFILED_MANIFEST, write_summary,
};
pub use project::{DOCUMENT_SUFFIXES, ProjectReport, ProjectScanner, is_document};
pub use root::{RootScanner, UNNAMED_PROJECT, generate};
pub use walk::{ScanRules, Visitor, WalkDecision, has_marker, walk};

// Re-export core types for convenience
pub use fscatalog_core::{
    CatalogError, CatalogOptions, CatalogStats, FilesystemProvider, LocalFs, MemoryFs,
    ProjectMetadata, Source, TimestampZone,
};
