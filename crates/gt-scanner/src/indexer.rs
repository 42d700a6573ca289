//! Source indexing: from an input path to [`PackageIndex`]es.
//!
//! A file input indexes that file; a directory input indexes its Go source
//! files (recursively if configured), one [`PackageIndex`] per directory.
//! Struct declarations are collected from every source file of the package
//! directory, including siblings of a requested file, so method receivers
//! can be constructed from their fields.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use gt_core::{FileIndex, PackageIndex, StructDecl};
use gt_parser::{GoParser, ParsedFile};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::ScanError;
use crate::walker::{FileWalker, GoFileKind, PackageFiles, package_dir};

/// Turns input paths into package indexes.
///
/// Stateless apart from configuration; the parser is passed in so callers
/// can keep one per worker thread.
///
/// # Examples
///
/// ```ignore
/// use gt_scanner::SourceIndexer;
/// use gt_parser::GoParser;
/// use camino::Utf8Path;
///
/// let indexer = SourceIndexer::new().with_recursive(true);
/// let mut parser = GoParser::new()?;
///
/// for package in indexer.index_path(&mut parser, Utf8Path::new("./pkg"))? {
///     println!("{}: {} functions", package.dir, package.function_count());
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceIndexer {
    recursive: bool,
}

impl SourceIndexer {
    /// Creates a non-recursive indexer.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures whether directory inputs are walked recursively.
    #[must_use]
    pub const fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Indexes one input path.
    ///
    /// # Errors
    ///
    /// - [`ScanError::NotFound`] if the path does not exist
    /// - [`ScanError::NotGoSource`] for a file that is not a non-test `.go` file
    /// - [`ScanError::Read`], [`ScanError::Parse`] or [`ScanError::MissingPackage`]
    ///   if any requested file cannot be indexed
    /// - [`ScanError::Walk`] if a directory cannot be traversed
    pub fn index_path(
        &self,
        parser: &mut GoParser,
        path: &Utf8Path,
    ) -> Result<Vec<PackageIndex>, ScanError> {
        let groups = self.expand(path)?;
        debug!(path = %path, packages = groups.len(), "expanded input path");

        groups
            .into_iter()
            .map(|group| index_package(parser, group))
            .collect()
    }

    /// Expands an input path into package file groups.
    fn expand(&self, path: &Utf8Path) -> Result<Vec<PackageFiles>, ScanError> {
        if !path.exists() {
            return Err(ScanError::NotFound(path.to_owned()));
        }

        if path.is_dir() {
            return FileWalker::new(path)
                .with_recursive(self.recursive)
                .collect(GoFileKind::Source);
        }

        if !GoFileKind::Source.matches(path) {
            return Err(ScanError::NotGoSource(path.to_owned()));
        }

        Ok(vec![PackageFiles {
            dir: package_dir(path),
            files: vec![path.to_owned()],
        }])
    }
}

/// Indexes the requested files of one package directory.
fn index_package(parser: &mut GoParser, group: PackageFiles) -> Result<PackageIndex, ScanError> {
    let mut files = Vec::with_capacity(group.files.len());
    let mut structs: FxHashMap<String, StructDecl> = FxHashMap::default();

    for path in &group.files {
        let (index, decls) = index_file(parser, path)?;
        structs.extend(decls.into_iter().map(|s| (s.name.clone(), s)));
        files.push(index);
    }

    collect_sibling_structs(parser, &group, &mut structs);

    for file in &mut files {
        for function in &mut file.functions {
            if let Some(receiver) = function.receiver.as_mut() {
                receiver.fields = structs
                    .get(&receiver.type_name)
                    .map(|decl| decl.fields.clone());
            }
        }
    }

    let package = files
        .first()
        .map(|f| f.package.clone())
        .unwrap_or_default();

    Ok(PackageIndex {
        dir: group.dir,
        package,
        files,
        structs,
    })
}

/// Reads and parses one requested file.
fn index_file(
    parser: &mut GoParser,
    path: &Utf8Path,
) -> Result<(FileIndex, Vec<StructDecl>), ScanError> {
    let parsed = parse_file(parser, path)?;
    let Some(package) = parsed.package else {
        return Err(ScanError::MissingPackage(path.to_owned()));
    };

    debug!(path = %path, functions = parsed.functions.len(), "indexed source file");

    Ok((
        FileIndex {
            path: path.to_owned(),
            package,
            imports: parsed.imports,
            functions: parsed.functions,
        },
        parsed.structs,
    ))
}

fn parse_file(parser: &mut GoParser, path: &Utf8Path) -> Result<ParsedFile, ScanError> {
    let source = fs::read_to_string(path).map_err(|e| ScanError::read(path, e))?;
    parser.parse(&source).map_err(|e| ScanError::parse(path, e))
}

/// Adds struct declarations from source files of the directory that were
/// not requested. Failures are ignored.
fn collect_sibling_structs(
    parser: &mut GoParser,
    group: &PackageFiles,
    structs: &mut FxHashMap<String, StructDecl>,
) {
    let requested: Vec<&str> = group.files.iter().filter_map(|f| f.file_name()).collect();

    let siblings: Vec<Utf8PathBuf> = match FileWalker::new(&group.dir).collect_flat(GoFileKind::Source) {
        Ok(paths) => paths,
        Err(e) => {
            debug!(dir = %group.dir, error = %e, "cannot list sibling files");
            return;
        }
    };

    for sibling in siblings {
        if sibling.file_name().is_some_and(|name| requested.contains(&name)) {
            continue;
        }
        match parse_file(parser, &sibling) {
            Ok(parsed) => {
                for decl in parsed.structs {
                    structs.entry(decl.name.clone()).or_insert(decl);
                }
            }
            Err(e) => debug!(path = %sibling, error = %e, "skipping sibling file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_tree(files: &[(&str, &str)]) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("UTF-8 temp dir");
        for (name, content) in files {
            let path = root.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create dir");
            }
            fs::write(path, content).expect("Failed to write file");
        }
        (dir, root)
    }

    #[test]
    fn test_index_single_file() {
        let (_guard, root) = temp_tree(&[(
            "calc.go",
            "package calc\n\nfunc Add(a, b int) int { return a + b }\n\nfunc sum(xs []int) int { return 0 }\n",
        )]);
        let mut parser = GoParser::new().expect("Parser creation failed");

        let packages = SourceIndexer::new()
            .index_path(&mut parser, &root.join("calc.go"))
            .expect("Index failed");
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].package, "calc");
        assert_eq!(packages[0].dir, root);

        let names: Vec<&str> = packages[0].files[0]
            .functions
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["Add", "sum"]);
    }

    #[test]
    fn test_receiver_fields_from_sibling() {
        let (_guard, root) = temp_tree(&[
            ("types.go", "package calc\n\ntype Calc struct {\n\tbase int\n\tname string\n}\n"),
            ("methods.go", "package calc\n\nfunc (c *Calc) Add(a int) int { return c.base + a }\n"),
        ]);
        let mut parser = GoParser::new().expect("Parser creation failed");

        let packages = SourceIndexer::new()
            .index_path(&mut parser, &root.join("methods.go"))
            .expect("Index failed");

        let add = &packages[0].files[0].functions[0];
        let fields = add
            .receiver
            .as_ref()
            .and_then(|r| r.fields.as_ref())
            .expect("Receiver fields should resolve");
        let names: Vec<Option<&str>> = fields.iter().map(|f| f.name.as_deref()).collect();
        assert_eq!(names, vec![Some("base"), Some("name")]);
    }

    #[test]
    fn test_sibling_parse_failure_ignored() {
        let (_guard, root) = temp_tree(&[
            ("broken.go", "package calc\n\nfunc (\n"),
            ("calc.go", "package calc\n\nfunc Add() {}\n"),
        ]);
        let mut parser = GoParser::new().expect("Parser creation failed");

        let packages = SourceIndexer::new()
            .index_path(&mut parser, &root.join("calc.go"))
            .expect("Sibling failure should not fail the path");
        assert_eq!(packages[0].function_count(), 1);
    }

    #[test]
    fn test_index_directory() {
        let (_guard, root) = temp_tree(&[
            ("b.go", "package calc\n\nfunc B() {}\n"),
            ("a.go", "package calc\n\nfunc A() {}\n"),
            ("a_test.go", "package calc\n\nfunc TestA() {}\n"),
            ("sub/c.go", "package sub\n\nfunc C() {}\n"),
        ]);
        let mut parser = GoParser::new().expect("Parser creation failed");

        let flat = SourceIndexer::new()
            .index_path(&mut parser, &root)
            .expect("Index failed");
        assert_eq!(flat.len(), 1);
        let files: Vec<&str> = flat[0].files.iter().filter_map(|f| f.path.file_name()).collect();
        assert_eq!(files, vec!["a.go", "b.go"]);

        let deep = SourceIndexer::new()
            .with_recursive(true)
            .index_path(&mut parser, &root)
            .expect("Index failed");
        assert_eq!(deep.len(), 2);
        assert_eq!(deep[1].package, "sub");
    }

    #[test]
    fn test_rejects_test_file() {
        let (_guard, root) = temp_tree(&[("calc_test.go", "package calc\n")]);
        let mut parser = GoParser::new().expect("Parser creation failed");

        let err = SourceIndexer::new()
            .index_path(&mut parser, &root.join("calc_test.go"))
            .expect_err("Should reject test file");
        assert!(matches!(err, ScanError::NotGoSource(_)));
    }

    #[test]
    fn test_missing_path() {
        let mut parser = GoParser::new().expect("Parser creation failed");
        let err = SourceIndexer::new()
            .index_path(&mut parser, Utf8Path::new("/nonexistent/gotests/calc.go"))
            .expect_err("Should fail");
        assert!(matches!(err, ScanError::NotFound(_)));
    }

    #[test]
    fn test_syntax_error_fails_path() {
        let (_guard, root) = temp_tree(&[("bad.go", "package calc\n\nfunc Add(a int {\n")]);
        let mut parser = GoParser::new().expect("Parser creation failed");

        let err = SourceIndexer::new()
            .index_path(&mut parser, &root.join("bad.go"))
            .expect_err("Should fail");
        assert!(matches!(err, ScanError::Parse { .. }));
        assert!(err.is_content_error());
    }
}
