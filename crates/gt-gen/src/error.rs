//! Error types for the gt-gen crate.
//!
//! [`RenderError`] covers failures while turning test models into Go source.
//! [`GenError`] is what a failed input path reports: either the path could
//! not be scanned or one of its files could not be rendered.

use camino::Utf8PathBuf;
use gt_scanner::ScanError;

/// Errors that can occur while rendering a test file.
///
/// Rendering failures are fatal for the file being rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// Two models in one file share a test name.
    #[error("duplicate test name {name} in {path}")]
    DuplicateTestName {
        /// The clashing test name.
        name: String,
        /// The target file.
        path: Utf8PathBuf,
    },

    /// A type spans several lines and cannot be written into a table column.
    #[error("cannot render type of {function}: {ty:?} spans multiple lines")]
    UnrepresentableType {
        /// Qualified name of the function under test.
        function: String,
        /// The type text.
        ty: String,
    },

    /// The companion test file belongs to an external test package.
    #[error("{path} is in package {package}, which cannot test unexported identifiers")]
    ForeignTestPackage {
        /// The companion `_test.go` path.
        path: Utf8PathBuf,
        /// Its package clause name.
        package: String,
    },
}

/// Broad category of a per-path failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The path could not be read, walked or parsed.
    Parse,
    /// A test file could not be rendered.
    Render,
}

/// A per-path failure.
///
/// # Examples
///
/// ```
/// use gt_gen::{ErrorKind, GenError, RenderError};
/// use camino::Utf8PathBuf;
///
/// let err = GenError::from(RenderError::ForeignTestPackage {
///     path: Utf8PathBuf::from("calc_test.go"),
///     package: "calc_test".to_owned(),
/// });
/// assert_eq!(err.kind(), ErrorKind::Render);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// Indexing the path failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Rendering one of the path's files failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl GenError {
    /// Returns the failure category.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Scan(_) => ErrorKind::Parse,
            Self::Render(_) => ErrorKind::Render,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        let scan = GenError::from(ScanError::NotFound(Utf8PathBuf::from("x.go")));
        assert_eq!(scan.kind(), ErrorKind::Parse);
        assert_eq!(scan.to_string(), "no such file or directory: x.go");

        let render = GenError::from(RenderError::DuplicateTestName {
            name: "TestAdd".to_owned(),
            path: Utf8PathBuf::from("calc_test.go"),
        });
        assert_eq!(render.kind(), ErrorKind::Render);
        assert_eq!(render.to_string(), "duplicate test name TestAdd in calc_test.go");
    }
}
