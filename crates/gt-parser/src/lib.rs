//! Go parser using tree-sitter for function, import and struct extraction.
//!
//! This crate parses Go source files and extracts the declarations a test
//! skeleton generator needs:
//!
//! - The package clause (name and where it ends)
//! - Import specs with their aliases
//! - Top-level functions and methods with receivers, parameters and results
//! - Top-level struct types and their fields
//!
//! # Overview
//!
//! The main entry point is [`GoParser`]:
//!
//! ```
//! use gt_parser::GoParser;
//!
//! let mut parser = GoParser::new()?;
//! let source = r#"
//! package shapes
//!
//! type Rect struct{ W, H float64 }
//!
//! func (r Rect) Area() float64 { return r.W * r.H }
//! "#;
//!
//! let parsed = parser.parse(source)?;
//! assert_eq!(parsed.functions[0].qualified_name(), "Rect.Area");
//! assert_eq!(parsed.structs[0].fields.len(), 2);
//! # Ok::<(), gt_parser::ParseError>(())
//! ```
//!
//! # Syntax Errors
//!
//! Tree-sitter always produces a tree, inserting `ERROR` and `MISSING`
//! nodes where the source is malformed. [`GoParser::parse`] rejects such
//! trees with [`ParseError::Syntax`] pointing at the first bad node, so a
//! half-understood file never yields tests.
//!
//! # Thread Safety
//!
//! [`GoParser`] is `Send` but not `Sync`. Create one parser per worker
//! thread. The compiled query is shared globally.

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod declarations;
pub mod error;
mod node;
mod parser;
pub mod queries;

pub use declarations::{Declarations, extract_declarations};
pub use error::ParseError;
pub use parser::{GoParser, ParsedFile};
