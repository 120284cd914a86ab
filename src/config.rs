//! Configuration loaded from `excise.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::{ExciseError, Result};

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = "excise.toml";

/// Default log filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Tunables for an extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExciseConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Log a warning for every target that matched no declaration.
    pub report_unresolved_targets: bool,
    /// Fail the run when no target matched any declaration.
    pub require_resolved_targets: bool,
    /// Include containment edges in DOT output.
    pub dot_include_owns: bool,
}

impl Default for ExciseConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            report_unresolved_targets: false,
            require_resolved_targets: false,
            dot_include_owns: false,
        }
    }
}

impl ExciseConfig {
    /// Load the config at `path`. The file must exist and parse.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Load the config at `path` if there is one.
    ///
    /// A missing file gives the defaults. An unreadable or invalid file also
    /// gives the defaults, together with the error so the caller can report
    /// it once logging is up.
    pub fn load_or_default(path: &Path) -> (Self, Option<ExciseError>) {
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(ExciseError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                (Self::default(), None)
            }
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Parse a config from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_keep_unresolved_targets_silent() {
        let config = ExciseConfig::default();
        assert!(!config.report_unresolved_targets);
        assert!(!config.require_resolved_targets);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = ExciseConfig::from_toml_str("require_resolved_targets = true\n").unwrap();
        assert!(config.require_resolved_targets);
        assert!(!config.dot_include_owns);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(ExciseConfig::from_toml_str("log_filter = [").is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, error) = ExciseConfig::load_or_default(&dir.path().join(CONFIG_FILE));
        assert_eq!(config, ExciseConfig::default());
        assert!(error.is_none());
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ExciseConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ExciseError::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "log_filter = \"excise=debug\"").unwrap();
        writeln!(file, "report_unresolved_targets = true").unwrap();

        let config = ExciseConfig::load(&path).unwrap();
        assert_eq!(config.log_filter, "excise=debug");
        assert!(config.report_unresolved_targets);
    }

    #[test]
    fn test_load_garbage_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "this is not toml = = =").unwrap();

        assert!(matches!(
            ExciseConfig::load(&path),
            Err(ExciseError::Config(_))
        ));
        let (config, error) = ExciseConfig::load_or_default(&path);
        assert_eq!(config, ExciseConfig::default());
        assert!(matches!(error, Some(ExciseError::Config(_))));
    }
}
