//! Indexes of Go source files and packages.

use camino::Utf8PathBuf;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::signature::{Field, FunctionSignature};

/// An import declaration entry.
///
/// # Examples
///
/// ```
/// use gt_core::ImportSpec;
///
/// assert_eq!(ImportSpec::new(None, "net/http").qualifier(), Some("http"));
/// assert_eq!(ImportSpec::new(Some("y"), "gopkg.in/yaml.v3").qualifier(), Some("y"));
/// assert_eq!(ImportSpec::new(None, "gopkg.in/yaml.v3").qualifier(), Some("yaml"));
/// assert_eq!(ImportSpec::new(Some("_"), "embed").qualifier(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ImportSpec {
    /// Explicit package name (`_` and `.` included).
    pub alias: Option<String>,

    /// Import path without quotes.
    pub path: String,
}

impl ImportSpec {
    /// Creates an import spec.
    pub fn new(alias: Option<&str>, path: impl Into<String>) -> Self {
        Self {
            alias: alias.map(str::to_owned),
            path: path.into(),
        }
    }

    /// The identifier used to refer to the package in source.
    ///
    /// Without an alias the package name is guessed from the path: the last
    /// segment, skipping a trailing major-version segment (`/v2`), minus a
    /// `.vN` suffix and a `go-` prefix. Blank and dot imports have no
    /// qualifier.
    pub fn qualifier(&self) -> Option<&str> {
        match self.alias.as_deref() {
            Some("_" | ".") => None,
            Some(alias) => Some(alias),
            None => Some(guess_package_name(&self.path)),
        }
    }
}

fn guess_package_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let mut name = segments.next().unwrap_or(path);
    if is_major_version(name) {
        if let Some(prev) = segments.next() {
            name = prev;
        }
    }
    if let Some((base, version)) = name.rsplit_once('.') {
        if is_major_version(version) {
            name = base;
        }
    }
    name.strip_prefix("go-").unwrap_or(name)
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// A struct type declared in a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructDecl {
    /// Type name.
    pub name: String,

    /// Fields in declaration order. Embedded fields are named after the
    /// embedded type.
    pub fields: Vec<Field>,

    /// Imports of the declaring file, which qualify the field types.
    #[serde(default)]
    pub imports: Vec<ImportSpec>,
}

/// The functions of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIndex {
    /// Source file path.
    pub path: Utf8PathBuf,

    /// Package clause name.
    pub package: String,

    /// Imports in source order.
    pub imports: Vec<ImportSpec>,

    /// Functions and methods in declaration order.
    pub functions: Vec<FunctionSignature>,
}

impl FileIndex {
    /// The companion test file path (`foo.go` → `foo_test.go`).
    ///
    /// ```
    /// use gt_core::FileIndex;
    /// use camino::Utf8PathBuf;
    ///
    /// let index = FileIndex {
    ///     path: Utf8PathBuf::from("pkg/calc.go"),
    ///     package: "calc".to_owned(),
    ///     imports: Vec::new(),
    ///     functions: Vec::new(),
    /// };
    /// assert_eq!(index.test_path(), "pkg/calc_test.go");
    /// ```
    pub fn test_path(&self) -> Utf8PathBuf {
        let stem = self.path.file_stem().unwrap_or("");
        self.path.with_file_name(format!("{stem}_test.go"))
    }
}

/// All indexed files of one package directory.
///
/// Owned by a single pipeline call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIndex {
    /// Package directory.
    pub dir: Utf8PathBuf,

    /// Package name.
    pub package: String,

    /// Requested files sorted by file name.
    pub files: Vec<FileIndex>,

    /// Struct declarations from every non-test file of the directory.
    pub structs: FxHashMap<String, StructDecl>,
}

impl PackageIndex {
    /// Looks up a struct declaration by type name.
    #[inline]
    pub fn struct_decl(&self, name: &str) -> Option<&StructDecl> {
        self.structs.get(name)
    }

    /// Total number of indexed functions.
    pub fn function_count(&self) -> usize {
        self.files.iter().map(|f| f.functions.len()).sum()
    }
}
