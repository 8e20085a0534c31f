//! Read-only filesystem abstraction shared by every catalog backend.
//!
//! Scanners only ever see a [`FilesystemProvider`]. Paths handed to a
//! provider are `/`-separated and relative to the provider root; the empty
//! string names the root itself.

use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::SystemTime;

use crate::local::LocalFs;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Base name of the entry.
    pub name: String,
    /// Whether the entry is a directory to descend into.
    pub is_dir: bool,
}

impl DirEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }

    /// Create a directory entry.
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }
}

/// Status of a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
    /// Whether the path is a directory.
    pub is_dir: bool,
    /// Whether the path is a regular file. False for directories and for
    /// symbolic links seen through [`FilesystemProvider::lstat`].
    pub is_file: bool,
}

/// Narrow capability interface every catalog backend implements.
pub trait FilesystemProvider {
    /// List the entries directly inside a directory, in a stable order.
    fn list(&self, path: &str) -> io::Result<Vec<DirEntry>>;

    /// Stat a path, following symbolic links. Returns `Ok(None)` when the
    /// path does not exist.
    fn stat(&self, path: &str) -> io::Result<Option<FileStat>>;

    /// Stat a listed entry without following a final symbolic link.
    ///
    /// Backends without links can rely on the default, which is [`stat`].
    ///
    /// [`stat`]: FilesystemProvider::stat
    fn lstat(&self, path: &str) -> io::Result<Option<FileStat>> {
        self.stat(path)
    }

    /// Open a file for reading.
    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>>;
}

impl<P: FilesystemProvider + ?Sized> FilesystemProvider for &P {
    fn list(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        (**self).list(path)
    }

    fn stat(&self, path: &str) -> io::Result<Option<FileStat>> {
        (**self).stat(path)
    }

    fn lstat(&self, path: &str) -> io::Result<Option<FileStat>> {
        (**self).lstat(path)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        (**self).open(path)
    }
}

impl<P: FilesystemProvider + ?Sized> FilesystemProvider for Box<P> {
    fn list(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        (**self).list(path)
    }

    fn stat(&self, path: &str) -> io::Result<Option<FileStat>> {
        (**self).stat(path)
    }

    fn lstat(&self, path: &str) -> io::Result<Option<FileStat>> {
        (**self).lstat(path)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        (**self).open(path)
    }
}

/// A view of another provider rooted at one of its subdirectories.
pub struct SubFs<'a> {
    inner: &'a dyn FilesystemProvider,
    base: String,
}

impl<'a> SubFs<'a> {
    /// Scope `inner` to `base`. An empty `base` is the whole provider.
    pub fn new(inner: &'a dyn FilesystemProvider, base: impl Into<String>) -> Self {
        Self {
            inner,
            base: base.into(),
        }
    }

    /// The sub-path this view is rooted at.
    pub fn base(&self) -> &str {
        &self.base
    }

    fn resolve(&self, path: &str) -> String {
        join_path(&self.base, path)
    }
}

impl FilesystemProvider for SubFs<'_> {
    fn list(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        self.inner.list(&self.resolve(path))
    }

    fn stat(&self, path: &str) -> io::Result<Option<FileStat>> {
        self.inner.stat(&self.resolve(path))
    }

    fn lstat(&self, path: &str) -> io::Result<Option<FileStat>> {
        self.inner.lstat(&self.resolve(path))
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        self.inner.open(&self.resolve(path))
    }
}

/// One tree to catalog: a label used for reporting plus its filesystem.
pub struct Source {
    /// Human label of the tree root, e.g. the directory given on the CLI.
    pub root_label: String,
    /// Backend the tree is read through.
    pub filesystem: Box<dyn FilesystemProvider>,
}

impl Source {
    /// Create a source from any provider.
    pub fn new(root_label: impl Into<String>, filesystem: impl FilesystemProvider + 'static) -> Self {
        Self {
            root_label: root_label.into(),
            filesystem: Box::new(filesystem),
        }
    }

    /// Create a source backed by a local directory, labelled by its path.
    pub fn local(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let label = root.to_string_lossy().into_owned();
        Self::new(label, LocalFs::new(root))
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("root_label", &self.root_label)
            .finish_non_exhaustive()
    }
}

/// Join two relative paths, treating an empty side as the root.
pub fn join_path(parent: &str, child: &str) -> String {
    match (parent.is_empty(), child.is_empty()) {
        (true, _) => child.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{}/{}", parent.trim_end_matches('/'), child),
    }
}

/// Last component of a relative or labelled path, if any.
pub fn base_name(path: &str) -> Option<&str> {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}
