//! Input path expansion for Go packages.
//!
//! This module provides [`FileWalker`], which uses the `ignore` crate to
//! turn a file or directory input into groups of Go files, one group per
//! package directory.
//!
//! # Features
//!
//! - Respects `.gitignore` and `.ignore` patterns
//! - Skips hidden entries and `vendor`, `testdata` and `.git` directories
//! - Non-recursive unless asked
//! - Sorted output for deterministic results
//! - Converts paths to UTF-8 [`Utf8PathBuf`]

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::{DirEntry, WalkBuilder};

use crate::error::ScanError;

/// Directories never descended into.
const SKIP_DIRECTORIES: &[&str] = &["vendor", "testdata", ".git"];

/// Which Go files a walk collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoFileKind {
    /// `.go` files that are not `_test.go` files.
    Source,
    /// `_test.go` files.
    Test,
}

impl GoFileKind {
    /// Returns `true` if `path` is a Go file of this kind.
    pub fn matches(self, path: &Utf8Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        if !name.ends_with(".go") {
            return false;
        }
        let is_test = name.ends_with("_test.go");
        match self {
            Self::Source => !is_test,
            Self::Test => is_test,
        }
    }
}

/// Go files of one package directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFiles {
    /// Package directory.
    pub dir: Utf8PathBuf,
    /// Files sorted by file name.
    pub files: Vec<Utf8PathBuf>,
}

/// Discovers Go files under a root directory.
///
/// # Examples
///
/// ```ignore
/// use gt_scanner::{FileWalker, GoFileKind};
/// use camino::Utf8Path;
///
/// let groups = FileWalker::new(Utf8Path::new("./pkg"))
///     .with_recursive(true)
///     .collect(GoFileKind::Source)?;
///
/// for group in &groups {
///     println!("{}: {} files", group.dir, group.files.len());
/// }
/// ```
#[derive(Debug)]
pub struct FileWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Whether to descend into subdirectories.
    recursive: bool,
}

impl FileWalker {
    /// Creates a non-recursive walker for `root`.
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            recursive: false,
        }
    }

    /// Configures whether to descend into subdirectories.
    #[must_use]
    pub const fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Collects Go files of the given kind, grouped by directory.
    ///
    /// Groups are ordered by directory path; directories without matching
    /// files yield no group.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Walk`] if directory traversal fails.
    /// Returns [`ScanError::NonUtf8Path`] if a non-UTF-8 path is encountered.
    pub fn collect(&self, kind: GoFileKind) -> Result<Vec<PackageFiles>, ScanError> {
        let mut groups: BTreeMap<Utf8PathBuf, Vec<Utf8PathBuf>> = BTreeMap::new();

        for result in self.build_walker() {
            let entry = result?;

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            let utf8_path =
                Utf8Path::from_path(path).ok_or_else(|| ScanError::NonUtf8Path(path.to_owned()))?;

            if !kind.matches(utf8_path) {
                continue;
            }

            let dir = utf8_path
                .parent()
                .map_or_else(|| self.root.clone(), Utf8Path::to_path_buf);
            groups.entry(dir).or_default().push(utf8_path.to_owned());
        }

        Ok(groups
            .into_iter()
            .map(|(dir, mut files)| {
                files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
                PackageFiles { dir, files }
            })
            .collect())
    }

    /// Collects Go files of the given kind directly inside `root`.
    pub fn collect_flat(&self, kind: GoFileKind) -> Result<Vec<Utf8PathBuf>, ScanError> {
        let walker = Self {
            root: self.root.clone(),
            recursive: false,
        };
        Ok(walker
            .collect(kind)?
            .into_iter()
            .flat_map(|group| group.files)
            .collect())
    }

    /// Builds the ignore walker with configured settings.
    fn build_walker(&self) -> ignore::Walk {
        let mut builder = WalkBuilder::new(&self.root);
        builder
            // Enable standard filters (.gitignore, .ignore, hidden files)
            .standard_filters(true)
            .follow_links(false)
            // Don't require the root to be a git repo
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| !is_skipped_dir(entry));
        if !self.recursive {
            builder.max_depth(Some(1));
        }
        builder.build()
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Returns `true` for directories below the root that are never walked.
fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_some_and(|ft| ft.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIP_DIRECTORIES.contains(&name))
}

/// The package directory of a source file path.
///
/// A bare file name belongs to the current directory.
pub fn package_dir(path: &Utf8Path) -> Utf8PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_owned(),
        _ => Utf8PathBuf::from("."),
    }
}
