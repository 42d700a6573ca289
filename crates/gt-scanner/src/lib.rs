//! Go package discovery, source indexing and existing-test scanning.
//!
//! This crate sits between the filesystem and the test generator. It turns
//! input paths into [`PackageIndex`](gt_core::PackageIndex)es and tells the
//! generator which tests a package already has.
//!
//! # Overview
//!
//! - [`FileWalker`]: Directory traversal respecting `.gitignore` patterns
//! - [`SourceIndexer`]: Input path → per-package function and struct index
//! - [`ExistingTestScanner`]: Existing test names and companion files, cached
//! - [`PackageCache`]: Run-scoped `FxHashMap` + `RwLock` cache
//!
//! # Example
//!
//! ```ignore
//! use gt_scanner::{ExistingTestScanner, SourceIndexer};
//! use gt_parser::GoParser;
//! use camino::Utf8Path;
//!
//! let mut parser = GoParser::new()?;
//! let indexer = SourceIndexer::new();
//! let existing = ExistingTestScanner::new();
//!
//! for package in indexer.index_path(&mut parser, Utf8Path::new("calc.go"))? {
//!     let tests = existing.scan_package(&mut parser, &package.dir);
//!     for file in &package.files {
//!         for function in &file.functions {
//!             let name = format!("Test{}", function.name);
//!             println!("{name}: exists = {}", tests.tests.contains(&name));
//!         }
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! SourceIndexer
//!     │
//!     ├── FileWalker (expand directories)
//!     │       │
//!     │       └── WalkBuilder (ignore crate)
//!     │
//!     └── GoParser (gt-parser, one per worker)
//!
//! ExistingTestScanner
//!     │
//!     ├── FileWalker (list _test.go files)
//!     └── PackageCache (FxHashMap + RwLock)
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod cache;
mod error;
mod existing;
mod indexer;
mod walker;

pub use cache::PackageCache;
pub use error::ScanError;
pub use existing::{ExistingTestScanner, PackageTests, companion_path};
pub use indexer::SourceIndexer;
pub use walker::{FileWalker, GoFileKind, PackageFiles, package_dir};
