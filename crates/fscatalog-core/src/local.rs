//! Local disk backend.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::provider::{DirEntry, FileStat, FilesystemProvider};

/// Provider backed by a directory on the local filesystem.
///
/// Listings are sorted by name so repeated runs over an unchanged tree
/// visit entries in the same order. Symbolic links are listed as files and
/// recorded through [`lstat`](FilesystemProvider::lstat), which never
/// follows them; `stat` does, so a linked marker file still counts.
#[derive(Debug, Clone)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    /// Create a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this provider is rooted at.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            path.split('/')
                .filter(|part| !part.is_empty())
                .fold(self.root.clone(), |acc, part| acc.join(part))
        }
    }
}

impl FilesystemProvider for LocalFs {
    fn list(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.resolve(path))? {
            let entry = entry?;
            let name = entry.file_name().into_string().map_err(|raw| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("file name is not valid UTF-8: {}", raw.to_string_lossy()),
                )
            })?;
            let is_dir = entry.file_type()?.is_dir();
            entries.push(DirEntry { name, is_dir });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn stat(&self, path: &str) -> io::Result<Option<FileStat>> {
        file_stat(fs::metadata(self.resolve(path)))
    }

    fn lstat(&self, path: &str) -> io::Result<Option<FileStat>> {
        file_stat(fs::symlink_metadata(self.resolve(path)))
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(fs::File::open(self.resolve(path))?))
    }
}

fn file_stat(metadata: io::Result<fs::Metadata>) -> io::Result<Option<FileStat>> {
    let metadata = match metadata {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    Ok(Some(FileStat {
        size: metadata.len(),
        modified: metadata.modified()?,
        is_dir: metadata.is_dir(),
        is_file: metadata.is_file(),
    }))
}
