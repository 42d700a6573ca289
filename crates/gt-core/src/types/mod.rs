//! Domain types for gotests-rs.
//!
//! # Module Organization
//!
//! - [`location`] - Source code locations
//! - [`signature`] - Go types, fields, receivers and function signatures
//! - [`package`] - Imports, struct declarations and per-file/per-package indexes
//! - [`existing`] - Tests already present in a package
//! - [`model`] - Test models built by the synthesizer
//! - [`file`] - Rendered output files
//!
//! All public types are re-exported at this module level and at the crate root:
//!
//! ```
//! use gt_core::{FunctionSignature, PackageIndex, TestModel, GeneratedFile};
//! ```

pub mod existing;
pub mod file;
pub mod location;
pub mod model;
pub mod package;
pub mod signature;

pub use existing::{ExistingTestFile, ExistingTestSet};
pub use file::GeneratedFile;
pub use location::SourceLocation;
pub use model::{CaseValue, Comparison, ReceiverModel, Slot, TestCase, TestModel};
pub use package::{FileIndex, ImportSpec, PackageIndex, StructDecl};
pub use signature::{Field, FunctionSignature, Receiver, TypeExpr};
