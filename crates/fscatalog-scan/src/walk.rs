//! Pre-order traversal over a [`FilesystemProvider`].

use fscatalog_core::{
    CatalogError, CatalogOptions, FilesystemProvider, Result, TimestampZone, join_path,
};
use globset::GlobSet;

/// What to do with a directory once it has been entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkDecision {
    /// Visit the directory's children.
    Descend,
    /// Leave the whole subtree alone.
    SkipSubtree,
}

/// Callbacks driven by [`walk`].
///
/// Paths are relative to the walked provider's root; `""` is the root.
pub trait Visitor {
    /// Called for each directory before its children, the root included.
    fn enter_dir(&mut self, fs: &dyn FilesystemProvider, path: &str) -> Result<WalkDecision>;

    /// Called for each non-directory entry.
    fn visit_file(&mut self, fs: &dyn FilesystemProvider, path: &str) -> Result<()>;
}

/// Walk `fs` depth-first in listing order, stopping at the first error.
///
/// `label` prefixes paths in error messages.
pub fn walk(fs: &dyn FilesystemProvider, label: &str, visitor: &mut dyn Visitor) -> Result<()> {
    walk_dir(fs, label, "", visitor)
}

fn walk_dir(
    fs: &dyn FilesystemProvider,
    label: &str,
    path: &str,
    visitor: &mut dyn Visitor,
) -> Result<()> {
    if visitor.enter_dir(fs, path)? == WalkDecision::SkipSubtree {
        return Ok(());
    }

    let entries = fs
        .list(path)
        .map_err(|e| CatalogError::read(display_path(label, path), e))?;

    for entry in entries {
        let child = join_path(path, &entry.name);
        if entry.is_dir {
            walk_dir(fs, label, &child, visitor)?;
        } else {
            visitor.visit_file(fs, &child)?;
        }
    }

    Ok(())
}

/// Whether a regular file called `marker` sits directly inside `dir`.
///
/// A directory with the marker's name does not count. Only "not found"
/// is treated as absent; any other stat failure is an error.
pub fn has_marker(
    fs: &dyn FilesystemProvider,
    label: &str,
    dir: &str,
    marker: &str,
) -> Result<bool> {
    let path = join_path(dir, marker);
    match fs.stat(&path) {
        Ok(Some(stat)) => Ok(!stat.is_dir),
        Ok(None) => Ok(false),
        Err(e) => Err(CatalogError::read(display_path(label, &path), e)),
    }
}

/// Path shown in errors and logs: `label/path`, or `.` for an unlabelled root.
pub fn display_path(label: &str, path: &str) -> String {
    let joined = join_path(label, path);
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Marker names and matchers shared by the root and project scanners.
#[derive(Debug, Clone)]
pub struct ScanRules {
    /// Anchor marker file name.
    pub anchor_file: String,
    /// Ignore marker file name.
    pub ignore_file: String,
    /// Directory names skipped inside projects.
    pub skip: GlobSet,
    /// Offset used when rendering timestamps.
    pub timestamp_zone: TimestampZone,
}

impl ScanRules {
    /// Validate `options` and compile them into rules.
    pub fn from_options(options: &CatalogOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            anchor_file: options.anchor_file.clone(),
            ignore_file: options.ignore_file.clone(),
            skip: options.skip_matcher()?,
            timestamp_zone: options.timestamp_zone,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fscatalog_core::MemoryFs;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        skip: Vec<&'static str>,
    }

    impl Visitor for Recorder {
        fn enter_dir(&mut self, _fs: &dyn FilesystemProvider, path: &str) -> Result<WalkDecision> {
            self.events.push(format!("dir:{path}"));
            if self.skip.iter().any(|s| *s == path) {
                Ok(WalkDecision::SkipSubtree)
            } else {
                Ok(WalkDecision::Descend)
            }
        }

        fn visit_file(&mut self, _fs: &dyn FilesystemProvider, path: &str) -> Result<()> {
            self.events.push(format!("file:{path}"));
            Ok(())
        }
    }

    fn tree() -> MemoryFs {
        MemoryFs::new()
            .with_file("a/x.txt", b"x")
            .with_file("a/y/z.txt", b"z")
            .with_file("b.txt", b"b")
            .with_file("c/d.txt", b"d")
    }

    #[test]
    fn test_pre_order_in_listing_order() {
        let mut recorder = Recorder::default();
        walk(&tree(), "", &mut recorder).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "dir:", "dir:a", "file:a/x.txt", "dir:a/y", "file:a/y/z.txt", "file:b.txt",
                "dir:c", "file:c/d.txt",
            ]
        );
    }

    #[test]
    fn test_skip_subtree() {
        let mut recorder = Recorder {
            skip: vec!["a"],
            ..Default::default()
        };
        walk(&tree(), "", &mut recorder).unwrap();

        assert!(recorder.events.contains(&"dir:a".to_string()));
        assert!(!recorder.events.iter().any(|e| e.starts_with("file:a/")));
        assert!(recorder.events.contains(&"file:c/d.txt".to_string()));
    }

    #[test]
    fn test_list_failure_aborts_with_path() {
        let fs = tree().with_list_failure("c");
        let mut recorder = Recorder::default();

        let err = walk(&fs, "/srv", &mut recorder).unwrap_err();
        match err {
            CatalogError::FilesystemRead { path, .. } => assert_eq!(path, "/srv/c"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!recorder.events.contains(&"file:c/d.txt".to_string()));
    }

    #[test]
    fn test_has_marker_ignores_directories() {
        let fs = MemoryFs::new()
            .with_file("a/.catalogignore", b"")
            .with_dir("b/.catalogignore")
            .with_stat_failure("c/.catalogignore")
            .with_dir("c");

        assert!(has_marker(&fs, "", "a", ".catalogignore").unwrap());
        assert!(!has_marker(&fs, "", "b", ".catalogignore").unwrap());
        assert!(!has_marker(&fs, "", "", ".catalogignore").unwrap());
        assert!(has_marker(&fs, "", "c", ".catalogignore").is_err());
    }

    #[test]
    fn test_display_path() {
        assert_eq!(display_path("", ""), ".");
        assert_eq!(display_path("/srv", ""), "/srv");
        assert_eq!(display_path("", "a/b"), "a/b");
        assert_eq!(display_path("/srv/", "a"), "/srv/a");
    }

    #[test]
    fn test_rules_reject_invalid_options() {
        let mut options = CatalogOptions::new("/tmp/out");
        options.anchor_file = options.ignore_file.clone();
        assert!(ScanRules::from_options(&options).is_err());

        let rules = ScanRules::from_options(&CatalogOptions::new("/tmp/out")).unwrap();
        assert!(rules.skip.is_match(".git"));
    }
}
