//! Run statistics with atomic counters.
//!
//! This module provides [`RunStats`] for tracking generation progress and
//! [`StatsSnapshot`] for point-in-time views.
//!
//! All counters use [`AtomicU64`] with relaxed ordering; they are for
//! reporting only.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for one generator.
///
/// # Examples
///
/// ```
/// use gt_gen::RunStats;
///
/// let stats = RunStats::new();
/// stats.increment_paths();
/// stats.add_tests(3);
///
/// let snap = stats.snapshot();
/// assert_eq!(snap.paths, 1);
/// assert_eq!(snap.tests, 3);
/// ```
#[derive(Debug, Default)]
pub struct RunStats {
    /// Input paths processed.
    paths: AtomicU64,
    /// Test files rendered.
    files: AtomicU64,
    /// Test functions generated.
    tests: AtomicU64,
    /// Paths that produced no tests.
    no_eligible: AtomicU64,
    /// Warnings recorded.
    warnings: AtomicU64,
    /// Paths that failed.
    errors: AtomicU64,
}

impl RunStats {
    /// Creates a new [`RunStats`] with all counters at zero.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the processed paths counter.
    #[inline]
    pub fn increment_paths(&self) {
        self.paths.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds to the rendered files counter.
    #[inline]
    pub fn add_files(&self, count: u64) {
        self.files.fetch_add(count, Ordering::Relaxed);
    }

    /// Adds to the generated tests counter.
    #[inline]
    pub fn add_tests(&self, count: u64) {
        self.tests.fetch_add(count, Ordering::Relaxed);
    }

    /// Increments the no-eligible counter.
    #[inline]
    pub fn increment_no_eligible(&self) {
        self.no_eligible.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds to the warnings counter.
    #[inline]
    pub fn add_warnings(&self, count: u64) {
        self.warnings.fetch_add(count, Ordering::Relaxed);
    }

    /// Increments the error counter.
    #[inline]
    pub fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a point-in-time snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            paths: self.paths.load(Ordering::Relaxed),
            files: self.files.load(Ordering::Relaxed),
            tests: self.tests.load(Ordering::Relaxed),
            no_eligible: self.no_eligible.load(Ordering::Relaxed),
            warnings: self.warnings.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    /// Resets all counters to zero.
    pub fn reset(&self) {
        self.paths.store(0, Ordering::Relaxed);
        self.files.store(0, Ordering::Relaxed);
        self.tests.store(0, Ordering::Relaxed);
        self.no_eligible.store(0, Ordering::Relaxed);
        self.warnings.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
    }
}

/// A point-in-time copy of [`RunStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Input paths processed.
    pub paths: u64,
    /// Test files rendered.
    pub files: u64,
    /// Test functions generated.
    pub tests: u64,
    /// Paths that produced no tests.
    pub no_eligible: u64,
    /// Warnings recorded.
    pub warnings: u64,
    /// Paths that failed.
    pub errors: u64,
}

impl StatsSnapshot {
    /// Returns `true` if any path failed.
    #[inline]
    pub const fn has_errors(&self) -> bool {
        self.errors > 0
    }
}
