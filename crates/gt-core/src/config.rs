//! Configuration structures for gotests-rs.
//!
//! This module provides configuration types for every stage of a run:
//!
//! - [`FilterConfig`] - Which functions get a test (patterns and modes)
//! - [`GenerateConfig`] - How skeletons are shaped and how paths are expanded
//! - [`OutputConfig`] - Where results go and how failures are treated
//! - [`Config`] - Root configuration combining all settings plus the input paths
//!
//! All configuration types implement [`Default`]. A default [`Config`] is not
//! valid on its own: a run needs at least one selection mode and one path.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// When status lines are colored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ColorChoice {
    /// Color when stderr is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    /// Always emit color codes.
    Always,
    /// Never emit color codes.
    Never,
}

/// Function selection settings.
///
/// Empty pattern strings count as unset.
///
/// # Examples
///
/// ```
/// use gt_core::FilterConfig;
///
/// let config = FilterConfig {
///     exported: true,
///     ..FilterConfig::default()
/// };
/// assert!(config.has_mode());
/// assert!(!FilterConfig::default().has_mode());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Regular expression a function's qualified name must match.
    pub only: Option<String>,

    /// Regular expression that removes matching functions.
    pub exclude: Option<String>,

    /// Keep only exported functions.
    pub exported: bool,

    /// Select every function that has no existing test.
    pub all: bool,
}

impl FilterConfig {
    /// The inclusion pattern, if one is set and non-empty.
    #[inline]
    pub fn only_pattern(&self) -> Option<&str> {
        self.only.as_deref().filter(|p| !p.is_empty())
    }

    /// The exclusion pattern, if one is set and non-empty.
    #[inline]
    pub fn exclude_pattern(&self) -> Option<&str> {
        self.exclude.as_deref().filter(|p| !p.is_empty())
    }

    /// Returns `true` if at least one selection mode is configured.
    pub fn has_mode(&self) -> bool {
        self.only_pattern().is_some()
            || self.exclude_pattern().is_some()
            || self.exported
            || self.all
    }
}

/// Skeleton shaping and path expansion settings.
///
/// # Examples
///
/// ```
/// use gt_core::GenerateConfig;
///
/// let config = GenerateConfig::default();
/// assert!(!config.subtests);
/// assert!(!config.recursive);
/// assert_eq!(config.max_parallel_jobs, None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Include the input values in failure messages.
    pub print_inputs: bool,

    /// Run each table case in `t.Run`.
    pub subtests: bool,

    /// Descend into subdirectories of directory inputs.
    pub recursive: bool,

    /// Maximum number of parallel jobs.
    /// `None` means use all available CPU cores.
    pub max_parallel_jobs: Option<usize>,
}

/// Result delivery settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write `<file>_test.go` files instead of printing to stdout.
    pub write: bool,

    /// Keep processing later paths after a path fails.
    pub allow_error: bool,

    /// Status line coloring.
    pub color: ColorChoice,
}

/// Root configuration for a gotests run.
///
/// Loaded from an optional JSON file, then overridden by command-line flags.
///
/// # Examples
///
/// ```
/// use gt_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"filter": {"all": true}}"#).unwrap();
/// assert!(config.filter.all);
/// assert!(config.paths.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source files or directories to process.
    pub paths: Vec<Utf8PathBuf>,

    /// Function selection.
    pub filter: FilterConfig,

    /// Skeleton shaping.
    pub generate: GenerateConfig,

    /// Result delivery.
    pub output: OutputConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Checks the settings that must hold before any path is processed.
    ///
    /// Patterns are compiled later by the filter, which reports
    /// [`ConfigError::InvalidPattern`] on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.filter.has_mode() {
            return Err(ConfigError::NoFilterMode);
        }
        if self.paths.is_empty() {
            return Err(ConfigError::NoPaths);
        }
        if self.generate.max_parallel_jobs == Some(0) {
            return Err(ConfigError::InvalidOption {
                option: "max_parallel_jobs".to_owned(),
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn valid() -> Config {
        Config {
            paths: vec![Utf8PathBuf::from("calc.go")],
            filter: FilterConfig {
                all: true,
                ..FilterConfig::default()
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_default_has_no_mode() {
        let config = Config::default();
        assert!(!config.filter.has_mode());
        assert!(matches!(config.validate(), Err(ConfigError::NoFilterMode)));
    }

    #[test]
    fn test_empty_pattern_is_unset() {
        let filter = FilterConfig {
            only: Some(String::new()),
            ..FilterConfig::default()
        };
        assert_eq!(filter.only_pattern(), None);
        assert!(!filter.has_mode());
    }

    #[test]
    fn test_mode_checked_before_paths() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::NoFilterMode)));

        let mut config = valid();
        config.paths.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoPaths)));
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let mut config = valid();
        config.generate.max_parallel_jobs = Some(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOption { .. })
        ));
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let json = r#"{"filter": {"only": "^Parse"}, "output": {"color": "never"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.filter.only_pattern(), Some("^Parse"));
        assert!(!config.filter.exported);
        assert_eq!(config.output.color, ColorChoice::Never);
        assert!(!config.generate.subtests);
    }

    #[test]
    fn test_config_serialization() {
        let config = valid();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"generate": {{"subtests": true}}}}"#).unwrap();
        let path = Utf8Path::from_path(file.path()).unwrap();

        let config = Config::from_json_file(path).unwrap();
        assert!(config.generate.subtests);
    }

    #[test]
    fn test_from_json_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let path = Utf8Path::from_path(file.path()).unwrap();

        assert!(matches!(
            Config::from_json_file(path),
            Err(ConfigError::Parse(_))
        ));
    }
}
