//! Tests that already exist in a package.

use camino::Utf8PathBuf;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Top-level function names declared in a package's `_test.go` files.
///
/// Every name counts, not only `Test*` functions, since any clash would
/// break compilation of the test package.
///
/// # Examples
///
/// ```
/// use gt_core::ExistingTestSet;
///
/// let set: ExistingTestSet = ["TestAdd", "helper"].into_iter().collect();
/// assert!(set.contains("TestAdd"));
/// assert!(!set.contains("TestSub"));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingTestSet {
    names: FxHashSet<String>,
}

impl ExistingTestSet {
    /// Creates an empty set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a declared name.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Returns `true` if `name` is already declared.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of declared names.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no names are declared.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExistingTestSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<S: Into<String>> Extend<S> for ExistingTestSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names.extend(iter.into_iter().map(Into::into));
    }
}

/// The companion `_test.go` file of a source file.
///
/// Generated tests are appended to `source`; missing imports go right after
/// the package clause, which ends at `header_end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingTestFile {
    /// Path of the test file.
    pub path: Utf8PathBuf,

    /// Package clause name.
    pub package: String,

    /// Import paths already present.
    pub imports: Vec<String>,

    /// Byte offset just past the package clause.
    pub header_end: usize,

    /// Full file content.
    pub source: String,
}

impl ExistingTestFile {
    /// Returns `true` if the file is an external test package (`foo_test`).
    #[inline]
    pub fn is_external_package(&self) -> bool {
        self.package.ends_with("_test")
    }

    /// Returns `true` if `path` is already imported.
    pub fn imports_path(&self, path: &str) -> bool {
        self.imports.iter().any(|p| p == path)
    }
}
