//! Go parser management using tree-sitter.
//!
//! This module provides the [`GoParser`] struct for parsing Go files and
//! extracting the declarations the test generator needs.

use gt_core::{FunctionSignature, ImportSpec, StructDecl};
use tree_sitter::{Language, Parser};

use crate::declarations::extract_declarations;
use crate::error::ParseError;
use crate::node::{first_error, node_to_location};
use crate::queries::{get_declaration_query, go_language};

/// Result of parsing a Go file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    /// Package clause name; `None` when the file has no package clause.
    pub package: Option<String>,

    /// Byte offset just past the package clause.
    pub package_end: usize,

    /// Imports in source order.
    pub imports: Vec<ImportSpec>,

    /// Functions and methods in declaration order.
    ///
    /// Receivers carry no struct fields yet; those are resolved against the
    /// whole package by the indexer.
    pub functions: Vec<FunctionSignature>,

    /// Top-level struct types.
    pub structs: Vec<StructDecl>,
}

/// Go parser for extracting declarations from source files.
///
/// Wraps a tree-sitter parser configured for Go. The parser can be reused
/// for multiple files to avoid repeated initialization.
///
/// # Thread Safety
///
/// `GoParser` is `Send` but not `Sync`. For parallel work with rayon,
/// create one parser per worker (`map_init` / `for_each_init`). The
/// underlying tree-sitter query is thread-safe and shared across all parser
/// instances.
///
/// # Examples
///
/// ```
/// use gt_parser::GoParser;
///
/// let mut parser = GoParser::new()?;
/// let parsed = parser.parse("package calc\n\nfunc Add(a, b int) int { return a + b }\n")?;
///
/// assert_eq!(parsed.package.as_deref(), Some("calc"));
/// assert_eq!(parsed.functions[0].name, "Add");
/// # Ok::<(), gt_parser::ParseError>(())
/// ```
pub struct GoParser {
    /// The underlying tree-sitter parser.
    parser: Parser,
    /// The Go language for the parser.
    language: Language,
}

impl GoParser {
    /// Creates a new Go parser.
    ///
    /// The declaration query is compiled lazily on first use.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::LanguageInit`] if the Go language cannot be set
    /// on the parser.
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        let language = go_language();

        parser
            .set_language(&language)
            .map_err(|_| ParseError::LanguageInit)?;

        Ok(Self { parser, language })
    }

    /// Parses Go source code and extracts declarations.
    ///
    /// # Errors
    ///
    /// - Returns [`ParseError::Syntax`] if the source contains a syntax error
    /// - Returns [`ParseError::Parse`] if parsing fails
    /// - Returns [`ParseError::QueryCompile`] if the declaration query fails to compile
    pub fn parse(&mut self, source: &str) -> Result<ParsedFile, ParseError> {
        let tree = self.parser.parse(source, None).ok_or(ParseError::Parse)?;

        if let Some(node) = first_error(tree.root_node()) {
            let location = node_to_location(node);
            return Err(ParseError::Syntax {
                line: location.line,
                column: location.column,
            });
        }

        let query = get_declaration_query()?;
        let decls = extract_declarations(&tree, source, query);

        Ok(ParsedFile {
            package: decls.package,
            package_end: decls.package_end,
            imports: decls.imports,
            functions: decls.functions,
            structs: decls.structs,
        })
    }

    /// Returns the tree-sitter language used by this parser.
    #[inline]
    pub fn language(&self) -> &Language {
        &self.language
    }
}

impl std::fmt::Debug for GoParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoParser")
            .field("language", &"Go")
            .finish_non_exhaustive()
    }
}
