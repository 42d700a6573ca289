//! Error types for the gt-scanner crate.
//!
//! This module provides the [`ScanError`] type for errors that can occur
//! while expanding input paths and indexing Go packages.

use camino::{Utf8Path, Utf8PathBuf};
use gt_parser::ParseError;

/// Errors that can occur during scanning operations.
///
/// Every variant is scoped to one input path: the path fails, other paths
/// are unaffected.
///
/// # Examples
///
/// ```
/// use gt_scanner::ScanError;
/// use camino::Utf8PathBuf;
///
/// let err = ScanError::NotGoSource(Utf8PathBuf::from("calc_test.go"));
/// assert_eq!(err.path().map(|p| p.as_str()), Some("calc_test.go"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Failed to walk a directory.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// Failed to read a file.
    #[error("failed to read file {path}: {source}")]
    Read {
        /// The path of the file that couldn't be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a Go file.
    #[error("failed to parse file {path}: {source}")]
    Parse {
        /// The path of the file that couldn't be parsed.
        path: Utf8PathBuf,
        /// The underlying parse error.
        #[source]
        source: ParseError,
    },

    /// A Go file without a package clause.
    #[error("missing package clause in {0}")]
    MissingPackage(Utf8PathBuf),

    /// A file path that is not a `.go` source file, or is a `_test.go` file.
    #[error("not a Go source file: {0}")]
    NotGoSource(Utf8PathBuf),

    /// The path does not exist.
    #[error("no such file or directory: {0}")]
    NotFound(Utf8PathBuf),

    /// The companion test file exists but could not be parsed, so new tests
    /// cannot be merged into it.
    #[error("existing test file {path} cannot be merged: {reason}")]
    BrokenCompanion {
        /// The companion `_test.go` path.
        path: Utf8PathBuf,
        /// Why it could not be read or parsed.
        reason: String,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl ScanError {
    /// Creates a new [`ScanError::Read`] error.
    #[inline]
    pub fn read(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Creates a new [`ScanError::Parse`] error.
    #[inline]
    pub fn parse(path: impl Into<Utf8PathBuf>, source: ParseError) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if the error comes from the content of a file rather
    /// than from the filesystem or the input path itself.
    #[inline]
    #[must_use]
    pub const fn is_content_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::MissingPackage(_) | Self::BrokenCompanion { .. }
        )
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::BrokenCompanion { path, .. } => Some(path),
            Self::MissingPackage(path) | Self::NotGoSource(path) | Self::NotFound(path) => {
                Some(path)
            }
            Self::Walk(_) | Self::NonUtf8Path(_) => None,
        }
    }
}
