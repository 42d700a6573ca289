//! Error types for the gt-parser crate.
//!
//! This module provides the [`ParseError`] type for errors that can occur
//! while parsing Go source and extracting declarations.

/// Errors that can occur during Go parsing.
///
/// # Examples
///
/// ```
/// use gt_parser::ParseError;
///
/// let err = ParseError::Syntax { line: 3, column: 14 };
/// assert_eq!(err.to_string(), "syntax error at 3:14");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to set the Go language on the parser.
    #[error("failed to set Go language")]
    LanguageInit,

    /// Failed to compile a tree-sitter query.
    ///
    /// Contains the byte offset where the error occurred and the error kind.
    #[error("failed to compile query at offset {offset}: {kind:?}")]
    QueryCompile {
        /// The byte offset in the query string where the error occurred.
        offset: usize,
        /// The kind of query error.
        kind: tree_sitter::QueryError,
    },

    /// The parser produced no tree.
    #[error("failed to parse source code")]
    Parse,

    /// The source is not valid Go.
    ///
    /// Points at the first erroneous or missing node.
    #[error("syntax error at {line}:{column}")]
    Syntax {
        /// Line number (1-indexed).
        line: u32,
        /// Column number (0-indexed).
        column: u32,
    },
}

impl ParseError {
    /// Returns `true` if the error is about the input rather than the parser.
    #[inline]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }
}
