//! Core types and traits for fscatalog.
//!
//! This crate provides the data model shared by the scanners: run options,
//! the error taxonomy, the rows a catalog is made of, and the
//! [`FilesystemProvider`] abstraction with its local and in-memory backends.

mod config;
mod error;
mod local;
mod memory;
mod provider;
mod record;

pub use config::{
    CatalogOptions, CatalogOptionsBuilder, CatalogOptionsBuilderError, DEFAULT_ANCHOR_FILE,
    DEFAULT_IGNORE_FILE, DEFAULT_SKIP_PATTERNS, TimestampZone,
};
pub use error::{CatalogError, Result};
pub use local::LocalFs;
pub use memory::{DEFAULT_MODIFIED_SECS, MemoryFs};
pub use provider::{DirEntry, FileStat, FilesystemProvider, Source, SubFs, base_name, join_path};
pub use record::{CatalogStats, FileRecord, IgnoredEntry, MANIFEST_HEADER, ProjectMetadata};
