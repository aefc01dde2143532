//! Facade configuration.
//!
//! Only the facade's own behaviour is configured here. Output destinations,
//! rendering and per-target filtering belong to the backend.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

use crate::caller::CallerMode;
use crate::targets;

/// Errors from loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid configuration TOML.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Settings shared by every [`Logger`](crate::Logger) built from them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FacadeConfig {
    /// How the call site of each record is determined.
    pub caller_mode: CallerMode,
    /// Whether panics raised by callbacks or argument `Display` impls are
    /// contained like ordinary failures.
    pub contain_panics: bool,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            caller_mode: CallerMode::Location,
            contain_panics: true,
        }
    }
}

impl FacadeConfig {
    /// Create config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create config from environment variables
    ///
    /// # Environment Variables
    ///
    /// | Variable | Values | Description |
    /// |----------|--------|-------------|
    /// | `GATELOG_CALLER` | location/backtrace/off | Call-site resolution |
    /// | `GATELOG_CONTAIN_PANICS` | 0/1 | Contain panics in callbacks |
    ///
    /// Unrecognised values keep the default and are reported through `log`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("GATELOG_CALLER") {
            match value.parse() {
                Ok(mode) => config.caller_mode = mode,
                Err(err) => log::warn!(
                    target: targets::CONFIG,
                    "ignoring GATELOG_CALLER: {}",
                    err
                ),
            }
        }

        if let Some(value) = lookup("GATELOG_CONTAIN_PANICS") {
            match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => config.contain_panics = true,
                "0" | "false" | "no" => config.contain_panics = false,
                other => log::warn!(
                    target: targets::CONFIG,
                    "ignoring GATELOG_CONTAIN_PANICS={:?}",
                    other
                ),
            }
        }

        config
    }

    /// Parse config from TOML text.
    ///
    /// ```
    /// use gatelog::{CallerMode, FacadeConfig};
    ///
    /// let config = FacadeConfig::from_toml_str("caller_mode = \"backtrace\"").unwrap();
    /// assert_eq!(config.caller_mode, CallerMode::Backtrace);
    /// assert!(config.contain_panics);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load config from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!(
            target: targets::CONFIG,
            "loaded facade config from {}: caller_mode={}",
            path.display(),
            config.caller_mode
        );
        Ok(config)
    }

    /// Process-wide config, read from the environment on first use.
    pub fn global() -> &'static FacadeConfig {
        static GLOBAL: OnceLock<FacadeConfig> = OnceLock::new();
        GLOBAL.get_or_init(Self::from_env)
    }

    // ─────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────

    /// Set the call-site resolution strategy
    #[must_use]
    pub fn with_caller_mode(mut self, mode: CallerMode) -> Self {
        self.caller_mode = mode;
        self
    }

    /// Enable or disable panic containment
    #[must_use]
    pub fn with_contain_panics(mut self, contain: bool) -> Self {
        self.contain_panics = contain;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = FacadeConfig::new();
        assert_eq!(config.caller_mode, CallerMode::Location);
        assert!(config.contain_panics);
    }

    #[test]
    fn empty_environment_keeps_defaults() {
        assert_eq!(FacadeConfig::from_lookup(|_| None), FacadeConfig::default());
    }

    #[test]
    fn environment_overrides() {
        let config = FacadeConfig::from_lookup(lookup_from(&[
            ("GATELOG_CALLER", "Backtrace"),
            ("GATELOG_CONTAIN_PANICS", "0"),
        ]));
        assert_eq!(config.caller_mode, CallerMode::Backtrace);
        assert!(!config.contain_panics);
    }

    #[test]
    fn invalid_environment_values_are_ignored() {
        let config = FacadeConfig::from_lookup(lookup_from(&[
            ("GATELOG_CALLER", "stack"),
            ("GATELOG_CONTAIN_PANICS", "maybe"),
        ]));
        assert_eq!(config, FacadeConfig::default());
    }

    #[test]
    fn toml_partial_and_full() {
        let config = FacadeConfig::from_toml_str("contain_panics = false").unwrap();
        assert_eq!(config.caller_mode, CallerMode::Location);
        assert!(!config.contain_panics);

        let config =
            FacadeConfig::from_toml_str("caller_mode = \"off\"\ncontain_panics = true").unwrap();
        assert_eq!(config.caller_mode, CallerMode::Off);
    }

    #[test]
    fn toml_rejects_unknown_keys_and_values() {
        assert!(matches!(
            FacadeConfig::from_toml_str("colour = true"),
            Err(ConfigError::Parse(_))
        ));
        assert!(FacadeConfig::from_toml_str("caller_mode = \"stack\"").is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "caller_mode = \"backtrace\"").unwrap();

        let config = FacadeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.caller_mode, CallerMode::Backtrace);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FacadeConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn builder_methods() {
        let config = FacadeConfig::new()
            .with_caller_mode(CallerMode::Off)
            .with_contain_panics(false);
        assert_eq!(config.caller_mode, CallerMode::Off);
        assert!(!config.contain_panics);
    }
}
