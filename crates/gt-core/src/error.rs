//! Error types for the gt-core crate.
//!
//! [`ConfigError`] covers every failure that is detected before a single
//! source path is touched. These errors are always fatal to a run.

/// Errors raised while loading or validating run configuration.
///
/// The display strings double as the user-facing status messages, so they
/// name the command-line flags rather than struct fields.
///
/// # Examples
///
/// ```
/// use gt_core::ConfigError;
///
/// let error = ConfigError::InvalidPattern {
///     option: "--only".to_owned(),
///     reason: "unclosed group".to_owned(),
/// };
/// assert_eq!(error.to_string(), "invalid --only regex: unclosed group");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// None of the selection modes was configured.
    #[error("please specify either the --only, --excl, --exported, or --all flag")]
    NoFilterMode,

    /// No source paths were supplied.
    #[error("please specify a file or directory containing the source")]
    NoPaths,

    /// An inclusion or exclusion pattern failed to compile.
    #[error("invalid {option} regex: {reason}")]
    InvalidPattern {
        /// The flag that carried the pattern (`--only` or `--excl`).
        option: String,
        /// The compiler's explanation.
        reason: String,
    },

    /// A configuration option has an invalid value.
    #[error("invalid configuration option '{option}': {reason}")]
    InvalidOption {
        /// The name of the invalid option.
        option: String,
        /// Explanation of why the option is invalid.
        reason: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`Config`](crate::Config).
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates a new [`ConfigError::InvalidPattern`] error.
    #[inline]
    pub fn invalid_pattern(option: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidPattern {
            option: option.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filter_mode_names_every_flag() {
        let msg = ConfigError::NoFilterMode.to_string();
        for flag in ["--only", "--excl", "--exported", "--all"] {
            assert!(msg.contains(flag), "missing {flag} in {msg}");
        }
    }

    #[test]
    fn test_invalid_pattern_display() {
        let error = ConfigError::invalid_pattern("--excl", "missing )");
        assert_eq!(error.to_string(), "invalid --excl regex: missing )");
    }

    #[test]
    fn test_invalid_option_display() {
        let error = ConfigError::InvalidOption {
            option: "max_parallel_jobs".to_owned(),
            reason: "must be positive".to_owned(),
        };
        let msg = error.to_string();
        assert!(msg.contains("max_parallel_jobs"));
        assert!(msg.contains("must be positive"));
    }
}
