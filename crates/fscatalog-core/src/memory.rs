//! In-memory backend with injectable failures.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Read};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::provider::{DirEntry, FileStat, FilesystemProvider, join_path};

/// Modification time given to files added without an explicit one.
pub const DEFAULT_MODIFIED_SECS: u64 = 1_700_000_000;

#[derive(Debug, Clone)]
struct MemoryFile {
    content: Vec<u8>,
    modified: SystemTime,
}

/// Provider holding a whole tree in memory.
///
/// Listings are ordered by name. Paths registered with the `with_*_failure`
/// methods return an error from the matching operation, which lets callers
/// exercise fail-fast behavior without touching the disk.
#[derive(Debug, Clone)]
pub struct MemoryFs {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, MemoryFile>,
    list_failures: BTreeSet<String>,
    stat_failures: BTreeSet<String>,
    open_failures: BTreeSet<String>,
}

impl MemoryFs {
    /// Create an empty tree containing only the root directory.
    pub fn new() -> Self {
        Self {
            dirs: BTreeSet::from([String::new()]),
            files: BTreeMap::new(),
            list_failures: BTreeSet::new(),
            stat_failures: BTreeSet::new(),
            open_failures: BTreeSet::new(),
        }
    }

    /// Add a file with the default modification time.
    pub fn with_file(self, path: &str, content: &[u8]) -> Self {
        let modified = UNIX_EPOCH + Duration::from_secs(DEFAULT_MODIFIED_SECS);
        self.with_file_at(path, content, modified)
    }

    /// Add a file with an explicit modification time.
    pub fn with_file_at(mut self, path: &str, content: &[u8], modified: SystemTime) -> Self {
        let path = normalize(path);
        self.add_parents(&path);
        self.files.insert(
            path,
            MemoryFile {
                content: content.to_vec(),
                modified,
            },
        );
        self
    }

    /// Add a (possibly empty) directory.
    pub fn with_dir(mut self, path: &str) -> Self {
        let path = normalize(path);
        self.add_parents(&path);
        self.dirs.insert(path);
        self
    }

    /// Make `list` fail for a directory.
    pub fn with_list_failure(mut self, path: &str) -> Self {
        self.list_failures.insert(normalize(path));
        self
    }

    /// Make `stat` fail for a path.
    pub fn with_stat_failure(mut self, path: &str) -> Self {
        self.stat_failures.insert(normalize(path));
        self
    }

    /// Make `open` fail for a file.
    pub fn with_open_failure(mut self, path: &str) -> Self {
        self.open_failures.insert(normalize(path));
        self
    }

    fn add_parents(&mut self, path: &str) {
        let mut parent = String::new();
        let parts: Vec<&str> = path.split('/').collect();
        for part in &parts[..parts.len().saturating_sub(1)] {
            parent = join_path(&parent, part);
            self.dirs.insert(parent.clone());
        }
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn parent_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
}

fn name_of(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

fn injected(op: &str, path: &str) -> io::Error {
    io::Error::other(format!("injected {op} failure at {path:?}"))
}

impl FilesystemProvider for MemoryFs {
    fn list(&self, path: &str) -> io::Result<Vec<DirEntry>> {
        let path = normalize(path);
        if self.list_failures.contains(&path) {
            return Err(injected("list", &path));
        }
        if !self.dirs.contains(&path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {path:?}"),
            ));
        }

        let dirs = self
            .dirs
            .iter()
            .filter(|d| !d.is_empty() && parent_of(d) == path)
            .map(|d| DirEntry::dir(name_of(d)));
        let files = self
            .files
            .keys()
            .filter(|f| parent_of(f) == path)
            .map(|f| DirEntry::file(name_of(f)));

        let mut entries: Vec<DirEntry> = dirs.chain(files).collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn stat(&self, path: &str) -> io::Result<Option<FileStat>> {
        let path = normalize(path);
        if self.stat_failures.contains(&path) {
            return Err(injected("stat", &path));
        }
        if let Some(file) = self.files.get(&path) {
            return Ok(Some(FileStat {
                size: file.content.len() as u64,
                modified: file.modified,
                is_dir: false,
                is_file: true,
            }));
        }
        if self.dirs.contains(&path) {
            return Ok(Some(FileStat {
                size: 0,
                modified: UNIX_EPOCH + Duration::from_secs(DEFAULT_MODIFIED_SECS),
                is_dir: true,
                is_file: false,
            }));
        }
        Ok(None)
    }

    fn open(&self, path: &str) -> io::Result<Box<dyn Read + '_>> {
        let path = normalize(path);
        if self.open_failures.contains(&path) {
            return Err(injected("open", &path));
        }
        match self.files.get(&path) {
            Some(file) => Ok(Box::new(Cursor::new(file.content.as_slice()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {path:?}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parents_are_created() {
        let fs = MemoryFs::new().with_file("a/b/c.txt", b"abc");

        assert_eq!(fs.list("").unwrap(), vec![DirEntry::dir("a")]);
        assert_eq!(fs.list("a").unwrap(), vec![DirEntry::dir("b")]);
        assert_eq!(fs.list("a/b").unwrap(), vec![DirEntry::file("c.txt")]);
    }

    #[test]
    fn test_listing_interleaves_files_and_dirs() {
        let fs = MemoryFs::new()
            .with_file("b.txt", b"")
            .with_dir("a")
            .with_file("c/d.txt", b"");

        let names: Vec<_> = fs.list("").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a", "b.txt", "c"]);
    }

    #[test]
    fn test_injected_failures() {
        let fs = MemoryFs::new()
            .with_file("a/x.txt", b"x")
            .with_list_failure("a")
            .with_stat_failure("a/README.md")
            .with_open_failure("a/x.txt");

        assert!(fs.list("a").is_err());
        assert!(fs.stat("a/README.md").is_err());
        assert!(fs.open("a/x.txt").is_err());
        assert!(fs.stat("a/x.txt").unwrap().is_some());
    }

    #[test]
    fn test_stat_missing_is_none() {
        let fs = MemoryFs::new().with_dir("a");
        assert!(fs.stat("a/README.md").unwrap().is_none());
        assert!(fs.stat("a").unwrap().unwrap().is_dir);
    }
}
