//! Pre-compiled tree-sitter queries for Go declaration extraction.
//!
//! This module provides the [`DECLARATION_QUERY`] constant containing
//! S-expression patterns for the top-level declarations the generator cares
//! about, and [`get_declaration_query`] for lazily compiling and caching it.

use std::sync::OnceLock;

use tree_sitter::{Language, Query};

use crate::error::ParseError;

/// Tree-sitter query for extracting Go declarations.
///
/// # Capture Names
///
/// - `package.name` - The package identifier
/// - `package.clause` - The whole `package` clause
/// - `import.spec` - One import spec (inside a group or standalone)
/// - `function` - A top-level function declaration
/// - `method` - A method declaration
/// - `struct.name` - Name of a struct type spec
/// - `struct.body` - The `struct { ... }` type of that spec
pub const DECLARATION_QUERY: &str = r"
; package foo
(source_file
  (package_clause
    (package_identifier) @package.name) @package.clause)

; import ( alias 'path' )
(import_spec) @import.spec

; func Name(...) ...
(source_file
  (function_declaration) @function)

; func (r T) Name(...) ...
(source_file
  (method_declaration) @method)

; type Name struct { ... }
(source_file
  (type_declaration
    (type_spec
      name: (type_identifier) @struct.name
      type: (struct_type) @struct.body)))
";

/// Capture index for `package.name`.
pub const CAPTURE_PACKAGE_NAME: u32 = 0;

/// Capture index for `package.clause`.
pub const CAPTURE_PACKAGE_CLAUSE: u32 = 1;

/// Capture index for `import.spec`.
pub const CAPTURE_IMPORT_SPEC: u32 = 2;

/// Capture index for `function`.
pub const CAPTURE_FUNCTION: u32 = 3;

/// Capture index for `method`.
pub const CAPTURE_METHOD: u32 = 4;

/// Capture index for `struct.name`.
pub const CAPTURE_STRUCT_NAME: u32 = 5;

/// Capture index for `struct.body`.
pub const CAPTURE_STRUCT_BODY: u32 = 6;

/// Global cache for the compiled declaration query.
static COMPILED_QUERY: OnceLock<Query> = OnceLock::new();

/// Returns the compiled declaration query for Go.
///
/// The query is compiled once and cached for all subsequent calls.
/// This function is thread-safe.
///
/// # Errors
///
/// Returns [`ParseError::QueryCompile`] if the query fails to compile.
pub fn get_declaration_query() -> Result<&'static Query, ParseError> {
    if let Some(query) = COMPILED_QUERY.get() {
        return Ok(query);
    }

    let query = compile_query(&go_language())?;

    Ok(COMPILED_QUERY.get_or_init(|| query))
}

/// The tree-sitter Go language.
pub fn go_language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

/// Compiles the declaration query for the given language.
fn compile_query(language: &Language) -> Result<Query, ParseError> {
    Query::new(language, DECLARATION_QUERY).map_err(|e| ParseError::QueryCompile {
        offset: e.offset,
        kind: e,
    })
}

/// Returns the capture name for a given capture index.
#[inline]
pub fn capture_name(query: &Query, index: u32) -> Option<&str> {
    query.capture_names().get(index as usize).copied()
}
