//! Run-scoped cache of scanned packages.
//!
//! This module provides [`PackageCache`], a thread-safe map from package
//! directory to its [`PackageTests`]. A package's existing tests are read
//! once per run no matter how many input paths point into it.
//!
//! # Safety Pattern
//!
//! - **Never exposes guards** publicly
//! - **Hands out `Arc`s** instead of references
//! - **Never holds the lock** while scanning

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::existing::PackageTests;

/// A thread-safe cache of [`PackageTests`] keyed by package directory.
///
/// # Examples
///
/// ```
/// use gt_scanner::{PackageCache, PackageTests};
/// use camino::Utf8Path;
///
/// let cache = PackageCache::new();
/// let dir = Utf8Path::new("pkg/calc");
///
/// let first = cache.get_or_insert_with(dir, PackageTests::default);
/// let second = cache.get_or_insert_with(dir, || unreachable!());
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct PackageCache {
    /// The underlying map.
    packages: RwLock<FxHashMap<Utf8PathBuf, Arc<PackageTests>>>,
}

impl PackageCache {
    /// Creates a new empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached entry for `dir`, if present.
    pub fn get(&self, dir: &Utf8Path) -> Option<Arc<PackageTests>> {
        self.packages.read().get(dir).map(Arc::clone)
    }

    /// Returns the cached entry for `dir`, computing it on a miss.
    ///
    /// `scan` runs without the lock held. If two threads miss at the same
    /// time, the first insert wins and both get the same entry.
    pub fn get_or_insert_with(
        &self,
        dir: &Utf8Path,
        scan: impl FnOnce() -> PackageTests,
    ) -> Arc<PackageTests> {
        if let Some(hit) = self.get(dir) {
            return hit;
        }

        let fresh = Arc::new(scan());
        let mut packages = self.packages.write();
        Arc::clone(packages.entry(dir.to_owned()).or_insert(fresh))
    }

    /// Returns the number of cached packages.
    #[inline]
    pub fn len(&self) -> usize {
        self.packages.read().len()
    }

    /// Returns `true` if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.packages.read().is_empty()
    }

    /// Drops every cached entry.
    pub fn clear(&self) {
        self.packages.write().clear();
    }
}
