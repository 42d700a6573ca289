//! Rendered output files.

use camino::Utf8PathBuf;

use super::model::TestModel;

/// A rendered `_test.go` file.
///
/// Created by the renderer and handed to the driver; the engine itself never
/// writes to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Target path (`foo.go` → `foo_test.go`).
    pub path: Utf8PathBuf,

    /// Source file the tests were generated for.
    pub source: Utf8PathBuf,

    /// Models in output order.
    pub tests: Vec<TestModel>,

    /// Complete file content, including any merged existing content.
    pub content: Vec<u8>,
}

impl GeneratedFile {
    /// Names of the generated test functions in output order.
    pub fn test_names(&self) -> impl Iterator<Item = &str> {
        self.tests.iter().map(|t| t.name.as_str())
    }

    /// The content as text.
    ///
    /// Rendered content is always UTF-8; this only fails on content built
    /// by hand.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}
