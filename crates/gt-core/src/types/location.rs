//! Positions in Go source files.

use std::fmt;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

/// A `line:column` position, both 1-indexed like `go/token`.
///
/// Ordering follows document order, so declarations can be sorted by it.
///
/// ```
/// use gt_core::SourceLocation;
///
/// let loc = SourceLocation::new(10, 6);
/// assert_eq!(loc.to_string(), "10:6");
/// assert!(SourceLocation::new(3, 20) < loc);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SourceLocation {
    /// Line number.
    pub line: u32,

    /// Byte column within the line.
    pub column: u32,
}

impl SourceLocation {
    /// Creates a location.
    #[inline]
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Formats the position as `path:line:column`, the form Go tools print.
    pub fn in_file(self, path: &Utf8Path) -> String {
        format!("{path}:{self}")
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order() {
        let mut locs = vec![
            SourceLocation::new(9, 1),
            SourceLocation::new(2, 14),
            SourceLocation::new(2, 1),
        ];
        locs.sort();
        assert_eq!(
            locs,
            vec![
                SourceLocation::new(2, 1),
                SourceLocation::new(2, 14),
                SourceLocation::new(9, 1),
            ]
        );
    }

    #[test]
    fn test_in_file() {
        let loc = SourceLocation::new(4, 2);
        assert_eq!(loc.in_file(Utf8Path::new("pkg/calc.go")), "pkg/calc.go:4:2");
    }
}
