//! Table-driven Go test skeleton generation.
//!
//! This crate turns Go source paths into rendered `_test.go` files. It owns
//! function selection, test naming, skeleton synthesis, rendering and the
//! parallel pipeline that ties them to the scanner.
//!
//! # Overview
//!
//! - [`FilterCriteria`]: Compiled inclusion/exclusion patterns and mode flags
//! - [`Synthesizer`]: Function signature → [`TestModel`](gt_core::TestModel)
//! - [`render`]: Test models → Go source, fresh or merged into a companion file
//! - [`Generator`]: Parallel processing of input paths (blocking or streaming)
//! - [`RunStats`]: Atomic counters for reporting
//!
//! # Example
//!
//! ```ignore
//! use gt_gen::{FilterCriteria, GenerateOptions, Generator, PathResult};
//! use camino::Utf8PathBuf;
//!
//! let criteria = FilterCriteria::new(None, None, true, false)?;
//! let generator = Generator::new(GenerateOptions::new(criteria));
//!
//! for outcome in generator.generate(&[Utf8PathBuf::from("calc.go")]) {
//!     for file in outcome.files() {
//!         print!("{}", file.text().unwrap_or_default());
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Generator
//!     │
//!     ├── rayon (one GoParser per worker thread)
//!     │
//!     └── PathProcessor (per input path)
//!             │
//!             ├── SourceIndexer ──────── gt-scanner
//!             ├── ExistingTestScanner ── gt-scanner (cached per package)
//!             ├── FilterCriteria
//!             ├── next_free_name
//!             ├── Synthesizer
//!             └── render
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod error;
mod filter;
mod naming;
mod pipeline;
mod render;
mod stats;
mod synth;

pub use error::{ErrorKind, GenError, RenderError};
pub use filter::FilterCriteria;
pub use naming::{next_free_name, test_name};
pub use pipeline::{PathOutcome, PathResult};
pub use render::{RenderRequest, render};
pub use stats::{RunStats, StatsSnapshot};
pub use synth::{Synthesizer, ZERO_CASE};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use camino::Utf8PathBuf;
use gt_core::{Config, ConfigError};
use gt_parser::GoParser;
use gt_scanner::{ExistingTestScanner, SourceIndexer};
use rayon::prelude::*;
use tokio::sync::mpsc;
use tracing::{info, warn};

use pipeline::PathProcessor;

/// Updates sent by [`Generator::generate_streaming`].
#[derive(Debug)]
pub enum GenerateUpdate {
    /// Number of input paths about to be processed.
    PathsQueued(usize),

    /// One input path finished. `index` is its position in the input.
    PathFinished {
        /// Position of the path in the input slice.
        index: usize,
        /// What happened to it.
        outcome: PathOutcome,
    },

    /// All started paths finished.
    Complete(StatsSnapshot),
}

/// Settings for a [`Generator`].
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Function selection.
    pub criteria: FilterCriteria,

    /// Include inputs in failure messages.
    pub print_inputs: bool,

    /// Run table cases as subtests.
    pub subtests: bool,

    /// Descend into subdirectories of directory inputs.
    pub recursive: bool,

    /// Stop starting paths that come after a failed one.
    pub stop_on_error: bool,

    /// Worker thread count; `None` uses the global rayon pool.
    pub max_parallel_jobs: Option<usize>,
}

impl GenerateOptions {
    /// Creates options with every flag off.
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            print_inputs: false,
            subtests: false,
            recursive: false,
            stop_on_error: false,
            max_parallel_jobs: None,
        }
    }

    /// Validates `config` and compiles its filter.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from [`Config::validate`] or from compiling the
    /// filter patterns. Nothing is read from disk.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            criteria: FilterCriteria::from_config(&config.filter)?,
            print_inputs: config.generate.print_inputs,
            subtests: config.generate.subtests,
            recursive: config.generate.recursive,
            stop_on_error: !config.output.allow_error,
            max_parallel_jobs: config.generate.max_parallel_jobs,
        })
    }

    /// Sets the subtests flag.
    #[must_use]
    pub const fn with_subtests(mut self, subtests: bool) -> Self {
        self.subtests = subtests;
        self
    }

    /// Sets the print-inputs flag.
    #[must_use]
    pub const fn with_print_inputs(mut self, print_inputs: bool) -> Self {
        self.print_inputs = print_inputs;
        self
    }

    /// Sets the recursive flag.
    #[must_use]
    pub const fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Sets the stop-on-error flag.
    #[must_use]
    pub const fn with_stop_on_error(mut self, stop_on_error: bool) -> Self {
        self.stop_on_error = stop_on_error;
        self
    }
}

/// The test generation pipeline.
///
/// Holds the run-scoped existing-test cache; create one generator per run.
/// Shareable across threads.
///
/// # Examples
///
/// ```ignore
/// use gt_gen::{FilterCriteria, GenerateOptions, Generator};
/// use camino::Utf8PathBuf;
///
/// let options = GenerateOptions::new(FilterCriteria::new(None, None, false, true)?)
///     .with_subtests(true);
/// let generator = Generator::new(options);
///
/// let outcomes = generator.generate(&[Utf8PathBuf::from("./pkg")]);
/// println!("{} tests", generator.stats().tests);
/// ```
#[derive(Debug)]
pub struct Generator {
    criteria: Arc<FilterCriteria>,
    synthesizer: Synthesizer,
    indexer: SourceIndexer,
    stop_on_error: bool,
    existing: ExistingTestScanner,
    stats: RunStats,
    pool: Option<rayon::ThreadPool>,
}

impl Generator {
    /// Creates a generator.
    ///
    /// If a dedicated thread pool cannot be built, the global rayon pool is
    /// used instead.
    pub fn new(options: GenerateOptions) -> Self {
        let pool = options.max_parallel_jobs.and_then(|jobs| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .map_err(|e| warn!(jobs, error = %e, "falling back to the global thread pool"))
                .ok()
        });

        Self {
            criteria: Arc::new(options.criteria),
            synthesizer: Synthesizer::new(options.subtests, options.print_inputs),
            indexer: SourceIndexer::new().with_recursive(options.recursive),
            stop_on_error: options.stop_on_error,
            existing: ExistingTestScanner::new(),
            stats: RunStats::new(),
            pool,
        }
    }

    /// Returns the shared filter criteria.
    pub fn criteria(&self) -> Arc<FilterCriteria> {
        Arc::clone(&self.criteria)
    }

    /// Returns a snapshot of the run statistics.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn processor(&self) -> PathProcessor<'_> {
        PathProcessor {
            criteria: &self.criteria,
            synthesizer: self.synthesizer,
            indexer: self.indexer,
            existing: &self.existing,
            stats: &self.stats,
        }
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }

    /// Processes every path and returns the outcomes in input order.
    ///
    /// With stop-on-error set, outcomes after the first failed path are
    /// dropped.
    pub fn generate(&self, paths: &[Utf8PathBuf]) -> Vec<PathOutcome> {
        info!(paths = paths.len(), "starting generation");
        let processor = self.processor();

        let mut outcomes: Vec<PathOutcome> = self.install(|| {
            paths
                .par_iter()
                .map_init(
                    || GoParser::new().ok(),
                    |parser, path| processor.process(parser.as_mut(), path),
                )
                .collect()
        });

        if self.stop_on_error {
            if let Some(failed) = outcomes.iter().position(PathOutcome::is_failure) {
                outcomes.truncate(failed + 1);
            }
        }

        self.log_summary();
        outcomes
    }

    /// Processes every path, sending each outcome as soon as it is ready.
    ///
    /// Outcomes arrive in completion order, tagged with their input index.
    /// Once `cancel` is raised no new path starts. With stop-on-error set,
    /// paths after a failed one are not started; paths before it always
    /// run.
    ///
    /// Must be called from a blocking context (`spawn_blocking` or a plain
    /// thread). If the receiver is dropped, the remaining work completes
    /// without sending updates.
    pub fn generate_streaming(
        &self,
        paths: &[Utf8PathBuf],
        tx: &mpsc::Sender<GenerateUpdate>,
        cancel: &AtomicBool,
    ) {
        info!(paths = paths.len(), "starting streaming generation");

        if tx.blocking_send(GenerateUpdate::PathsQueued(paths.len())).is_err() {
            // Receiver dropped
            return;
        }

        let processor = self.processor();
        let first_failure = AtomicUsize::new(usize::MAX);

        self.install(|| {
            paths.par_iter().enumerate().for_each_init(
                || (GoParser::new().ok(), tx.clone()),
                |(parser, sender), (index, path)| {
                    if cancel.load(Ordering::Relaxed)
                        || index > first_failure.load(Ordering::Relaxed)
                    {
                        return;
                    }

                    let outcome = processor.process(parser.as_mut(), path);
                    if self.stop_on_error && outcome.is_failure() {
                        first_failure.fetch_min(index, Ordering::Relaxed);
                    }

                    // Ignore if receiver dropped
                    let _ = sender.blocking_send(GenerateUpdate::PathFinished { index, outcome });
                },
            );
        });

        self.log_summary();
        let _ = tx.blocking_send(GenerateUpdate::Complete(self.stats.snapshot()));
    }

    fn log_summary(&self) {
        let stats = self.stats.snapshot();
        info!(
            paths = stats.paths,
            files = stats.files,
            tests = stats.tests,
            no_eligible = stats.no_eligible,
            warnings = stats.warnings,
            errors = stats.errors,
            "generation completed"
        );
    }
}
