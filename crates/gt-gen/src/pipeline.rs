//! Per-path generation.
//!
//! [`PathProcessor`] runs one input path through indexing, selection, name
//! resolution, synthesis and rendering. It never panics on bad input: every
//! failure ends up in the returned [`PathOutcome`].

use camino::{Utf8Path, Utf8PathBuf};
use gt_core::{FileIndex, GeneratedFile, ImportSpec, PackageIndex, TestModel};
use gt_parser::{GoParser, ParseError};
use gt_scanner::{ExistingTestScanner, ScanError, SourceIndexer, companion_path};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::error::GenError;
use crate::filter::FilterCriteria;
use crate::naming::{next_free_name, test_name};
use crate::render::{RenderRequest, render};
use crate::stats::RunStats;
use crate::synth::{Synthesizer, callee_shadowed};

/// What happened to one input path.
#[derive(Debug)]
pub struct PathOutcome {
    /// The input path as given.
    pub path: Utf8PathBuf,

    /// Non-fatal problems, in discovery order.
    pub warnings: Vec<String>,

    /// The path's result.
    pub result: PathResult,
}

impl PathOutcome {
    /// Returns `true` if the path failed.
    #[inline]
    pub const fn is_failure(&self) -> bool {
        matches!(self.result, PathResult::Failed(_))
    }

    /// The rendered files, if any.
    pub fn files(&self) -> &[GeneratedFile] {
        match &self.result {
            PathResult::Generated(files) => files,
            PathResult::NoEligible | PathResult::Failed(_) => &[],
        }
    }
}

/// The result part of a [`PathOutcome`].
#[derive(Debug)]
pub enum PathResult {
    /// At least one test was rendered.
    Generated(Vec<GeneratedFile>),
    /// No function was selected.
    NoEligible,
    /// The path failed.
    Failed(GenError),
}

/// Processes single paths with shared, read-only settings.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PathProcessor<'a> {
    pub criteria: &'a FilterCriteria,
    pub synthesizer: Synthesizer,
    pub indexer: SourceIndexer,
    pub existing: &'a ExistingTestScanner,
    pub stats: &'a RunStats,
}

impl PathProcessor<'_> {
    /// Processes `path`, counting the outcome in the run statistics.
    ///
    /// A missing parser means the worker could not create one.
    pub fn process(&self, parser: Option<&mut GoParser>, path: &Utf8Path) -> PathOutcome {
        self.stats.increment_paths();

        let mut warnings = Vec::new();
        let result = match parser {
            Some(parser) => match self.generate(parser, path, &mut warnings) {
                Ok(files) if files.is_empty() => PathResult::NoEligible,
                Ok(files) => PathResult::Generated(files),
                Err(e) => PathResult::Failed(e),
            },
            None => PathResult::Failed(ScanError::parse(path, ParseError::LanguageInit).into()),
        };

        match &result {
            PathResult::Generated(files) => {
                self.stats.add_files(files.len() as u64);
                self.stats
                    .add_tests(files.iter().map(|f| f.tests.len() as u64).sum());
            }
            PathResult::NoEligible => self.stats.increment_no_eligible(),
            PathResult::Failed(e) => {
                self.stats.increment_errors();
                warn!(path = %path, error = %e, "path failed");
            }
        }
        self.stats.add_warnings(warnings.len() as u64);

        PathOutcome {
            path: path.to_owned(),
            warnings,
            result,
        }
    }

    fn generate(
        &self,
        parser: &mut GoParser,
        path: &Utf8Path,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<GeneratedFile>, GenError> {
        let packages = self.indexer.index_path(parser, path)?;

        let mut files = Vec::new();
        for package in &packages {
            files.extend(self.generate_package(parser, package, warnings)?);
        }
        Ok(files)
    }

    fn generate_package(
        &self,
        parser: &mut GoParser,
        package: &PackageIndex,
        warnings: &mut Vec<String>,
    ) -> Result<Vec<GeneratedFile>, GenError> {
        let existing = self.existing.scan_package(parser, &package.dir);
        warnings.extend(existing.warnings.iter().cloned());

        let mut produced: FxHashSet<String> = FxHashSet::default();
        let mut files = Vec::new();

        for file in &package.files {
            let mut models: Vec<TestModel> = Vec::new();

            for function in self.criteria.select(&file.functions, &existing.tests) {
                if function.is_generic() {
                    warnings.push(format!(
                        "skipping {}: generic functions are not supported",
                        function.qualified_name()
                    ));
                    continue;
                }
                if callee_shadowed(function) {
                    warnings.push(format!(
                        "skipping {}: the name is shadowed inside the generated test",
                        function.name
                    ));
                    continue;
                }

                let name = next_free_name(&test_name(function), |candidate| {
                    existing.tests.contains(candidate) || produced.contains(candidate)
                });
                debug!(
                    function = %function.qualified_name(),
                    at = %function.location.in_file(&file.path),
                    test = %name,
                    "selected function"
                );
                produced.insert(name.clone());
                models.push(self.synthesizer.synthesize(function, name));
            }

            if models.is_empty() {
                continue;
            }

            let imports = import_candidates(package, file, &models);
            let companion = self.existing.existing_test_file(parser, &file.path)?;
            let target = companion_path(&file.path);
            let request = RenderRequest {
                target: &target,
                source: &file.path,
                package: &file.package,
                imports: &imports,
                existing: companion.as_ref(),
            };
            files.push(render(&request, models)?);
        }

        Ok(files)
    }
}

/// Imports that may qualify types in `models`: the file's own imports, then
/// those of the files declaring receiver structs.
///
/// The file's own imports come first.
fn import_candidates(
    package: &PackageIndex,
    file: &FileIndex,
    models: &[TestModel],
) -> Vec<ImportSpec> {
    let mut imports = file.imports.clone();
    let declaring = models
        .iter()
        .filter_map(|model| model.function.receiver.as_ref())
        .filter_map(|receiver| package.struct_decl(&receiver.type_name));
    for decl in declaring {
        for spec in &decl.imports {
            if !imports.contains(spec) {
                imports.push(spec.clone());
            }
        }
    }
    imports
}
