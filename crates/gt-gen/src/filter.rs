//! Function selection.
//!
//! [`FilterCriteria`] is a compiled policy: an optional inclusion pattern,
//! an optional exclusion pattern and two mode flags. Selection is pure and
//! can be tested without parsing any Go.

use gt_core::{ConfigError, ExistingTestSet, FilterConfig, FunctionSignature};
use regex::Regex;
use tracing::debug;

use crate::naming::test_name;

/// Which functions get a test.
///
/// Modes combine by intersection:
///
/// 1. with an inclusion pattern, only functions whose qualified name
///    (`Recv.Name` or `Name`) matches are kept;
/// 2. with an exclusion pattern, matching functions are dropped;
/// 3. in exported mode, unexported functions are dropped;
/// 4. in all mode without either pattern, functions whose base test name
///    already exists are dropped.
///
/// # Examples
///
/// ```
/// use gt_gen::FilterCriteria;
///
/// let criteria = FilterCriteria::new(Some("^Parse"), None, false, false).unwrap();
/// assert!(criteria.matches_name("ParseInt", true));
/// assert!(!criteria.matches_name("Format", true));
///
/// assert!(FilterCriteria::new(None, None, false, false).is_err());
/// assert!(FilterCriteria::new(Some("("), None, false, false).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct FilterCriteria {
    only: Option<Regex>,
    exclude: Option<Regex>,
    exported: bool,
    all: bool,
}

impl FilterCriteria {
    /// Compiles the criteria.
    ///
    /// Empty patterns count as unset.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoFilterMode`] if no mode is configured
    /// - [`ConfigError::InvalidPattern`] naming `--only` or `--excl` if a
    ///   pattern does not compile
    pub fn new(
        only: Option<&str>,
        exclude: Option<&str>,
        exported: bool,
        all: bool,
    ) -> Result<Self, ConfigError> {
        let only = only.filter(|p| !p.is_empty());
        let exclude = exclude.filter(|p| !p.is_empty());

        if only.is_none() && exclude.is_none() && !exported && !all {
            return Err(ConfigError::NoFilterMode);
        }

        Ok(Self {
            only: compile("--only", only)?,
            exclude: compile("--excl", exclude)?,
            exported,
            all,
        })
    }

    /// Compiles the criteria from configuration.
    pub fn from_config(config: &FilterConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.only_pattern(),
            config.exclude_pattern(),
            config.exported,
            config.all,
        )
    }

    /// Returns `true` when the all-functions rule applies.
    #[inline]
    pub fn skips_existing(&self) -> bool {
        self.all && self.only.is_none() && self.exclude.is_none()
    }

    /// Applies the pattern and exported rules to a qualified name.
    pub fn matches_name(&self, qualified_name: &str, exported: bool) -> bool {
        if let Some(only) = &self.only {
            if !only.is_match(qualified_name) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(qualified_name) {
                return false;
            }
        }
        !self.exported || exported
    }

    /// Returns `true` if a test should be generated for `function`.
    pub fn accepts(&self, function: &FunctionSignature, existing: &ExistingTestSet) -> bool {
        if !self.matches_name(&function.qualified_name(), function.exported) {
            return false;
        }
        if self.skips_existing() && existing.contains(&test_name(function)) {
            debug!(function = %function.qualified_name(), "test already exists");
            return false;
        }
        true
    }

    /// The accepted functions, in input order.
    pub fn select<'a>(
        &self,
        functions: &'a [FunctionSignature],
        existing: &ExistingTestSet,
    ) -> Vec<&'a FunctionSignature> {
        functions
            .iter()
            .filter(|f| self.accepts(f, existing))
            .collect()
    }
}

fn compile(option: &str, pattern: Option<&str>) -> Result<Option<Regex>, ConfigError> {
    pattern
        .map(|p| Regex::new(p).map_err(|e| ConfigError::invalid_pattern(option, e)))
        .transpose()
}
