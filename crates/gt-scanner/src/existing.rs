//! Scanning of a package's existing `_test.go` files.
//!
//! The generator must not emit a test whose name is already declared in the
//! package, and it appends to a source file's companion `_test.go` rather
//! than replacing it. [`ExistingTestScanner`] collects both facts per
//! package directory and caches them for the rest of the run.
//!
//! Unreadable or unparsable test files never fail a run: they contribute no
//! names and produce a warning.

use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use gt_core::{ExistingTestFile, ExistingTestSet};
use gt_parser::GoParser;
use tracing::{debug, warn};

use crate::cache::PackageCache;
use crate::error::ScanError;
use crate::walker::{FileWalker, GoFileKind, package_dir};

/// Existing tests of one package directory.
#[derive(Debug, Clone, Default)]
pub struct PackageTests {
    /// Every top-level function name declared in the test files.
    pub tests: ExistingTestSet,

    /// Parsed test files, sorted by file name.
    pub files: Vec<ExistingTestFile>,

    /// Test files that could not be read or parsed, with the reason.
    pub failed: Vec<(Utf8PathBuf, String)>,

    /// Human-readable warnings, one per failed file.
    pub warnings: Vec<String>,
}

impl PackageTests {
    /// Looks up a parsed test file by path.
    pub fn file(&self, path: &Utf8Path) -> Option<&ExistingTestFile> {
        self.files.iter().find(|f| f.path == path)
    }

    fn failure(&self, path: &Utf8Path) -> Option<&str> {
        self.failed
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, reason)| reason.as_str())
    }
}

/// Scans and caches existing tests per package directory.
///
/// The cache lives as long as the scanner; create one scanner per run.
///
/// # Examples
///
/// ```ignore
/// use gt_scanner::ExistingTestScanner;
/// use gt_parser::GoParser;
/// use camino::Utf8Path;
///
/// let scanner = ExistingTestScanner::new();
/// let mut parser = GoParser::new()?;
///
/// let package = scanner.scan_package(&mut parser, Utf8Path::new("pkg/calc"));
/// if package.tests.contains("TestAdd") {
///     println!("TestAdd already exists");
/// }
/// ```
#[derive(Debug, Default)]
pub struct ExistingTestScanner {
    cache: PackageCache,
}

impl ExistingTestScanner {
    /// Creates a scanner with an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing tests of the package in `dir`.
    ///
    /// The first call per directory reads and parses the test files; later
    /// calls return the cached result.
    pub fn scan_package(&self, parser: &mut GoParser, dir: &Utf8Path) -> Arc<PackageTests> {
        self.cache
            .get_or_insert_with(dir, || scan_test_files(parser, dir))
    }

    /// Returns the companion `_test.go` of `source_path` if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::BrokenCompanion`] if the companion exists but
    /// could not be read or parsed; writing over it would lose its content.
    pub fn existing_test_file(
        &self,
        parser: &mut GoParser,
        source_path: &Utf8Path,
    ) -> Result<Option<ExistingTestFile>, ScanError> {
        let package = self.scan_package(parser, &package_dir(source_path));
        let companion = companion_path(source_path);

        if let Some(reason) = package.failure(&companion) {
            return Err(ScanError::BrokenCompanion {
                path: companion,
                reason: reason.to_owned(),
            });
        }
        Ok(package.file(&companion).cloned())
    }

    /// Returns the number of packages scanned so far.
    #[inline]
    pub fn cached_packages(&self) -> usize {
        self.cache.len()
    }
}

/// The companion test file path (`foo.go` → `foo_test.go`).
pub fn companion_path(source_path: &Utf8Path) -> Utf8PathBuf {
    let stem = source_path.file_stem().unwrap_or("");
    let dir = package_dir(source_path);
    dir.join(format!("{stem}_test.go"))
}

fn scan_test_files(parser: &mut GoParser, dir: &Utf8Path) -> PackageTests {
    let mut package = PackageTests::default();

    let paths = match FileWalker::new(dir).collect_flat(GoFileKind::Test) {
        Ok(paths) => paths,
        Err(e) => {
            warn!(dir = %dir, error = %e, "cannot list existing test files");
            package
                .warnings
                .push(format!("cannot list existing test files in {dir}: {e}"));
            return package;
        }
    };

    for path in paths {
        // The walker yields paths under `dir`; normalize so lookups by
        // companion path match.
        let path = match path.file_name() {
            Some(name) => dir.join(name),
            None => path,
        };

        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                record_failure(&mut package, path, format!("cannot read existing test file: {e}"));
                continue;
            }
        };

        let parsed = match parser.parse(&source) {
            Ok(parsed) => parsed,
            Err(e) => {
                record_failure(&mut package, path, format!("cannot parse existing test file: {e}"));
                continue;
            }
        };

        let Some(package_name) = parsed.package else {
            record_failure(&mut package, path, "existing test file has no package clause".to_owned());
            continue;
        };

        let names = parsed
            .functions
            .iter()
            .filter(|f| !f.is_method())
            .map(|f| f.name.as_str());
        package.tests.extend(names);

        debug!(path = %path, tests = package.tests.len(), "scanned existing test file");

        package.files.push(ExistingTestFile {
            path,
            package: package_name,
            imports: parsed.imports.into_iter().map(|i| i.path).collect(),
            header_end: parsed.package_end,
            source,
        });
    }

    package
}

fn record_failure(package: &mut PackageTests, path: Utf8PathBuf, reason: String) {
    warn!(path = %path, reason = %reason, "ignoring existing test file");
    package.warnings.push(format!("{path}: {reason}"));
    package.failed.push((path, reason));
}
