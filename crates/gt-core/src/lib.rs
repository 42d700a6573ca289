//! Core types, configuration, and errors for gotests-rs.
//!
//! This crate holds the vocabulary shared by every stage of the test
//! generation pipeline:
//!
//! - [`FunctionSignature`] and friends, produced by the Go source indexer
//! - [`PackageIndex`] and [`ExistingTestSet`], consumed by the filter
//! - [`TestModel`], produced by the skeleton synthesizer
//! - [`GeneratedFile`], produced by the renderer and handed to the driver
//! - [`Config`] and [`ConfigError`] for run configuration
//!
//! Nothing in this crate touches the filesystem except
//! [`Config::from_json_file`].

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

pub use config::{ColorChoice, Config, FilterConfig, GenerateConfig, OutputConfig};
pub use error::ConfigError;
pub use types::signature::is_exported;
pub use types::{
    CaseValue, Comparison, ExistingTestFile, ExistingTestSet, Field, FileIndex,
    FunctionSignature, GeneratedFile, ImportSpec, PackageIndex, Receiver, ReceiverModel, Slot,
    SourceLocation, StructDecl, TestCase, TestModel, TypeExpr,
};
