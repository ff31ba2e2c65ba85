//! User configuration and on-disk locations.
//!
//! Everything lives under one state directory:
//! `$XDG_STATE_HOME/modelpeek` (or the platform equivalent), falling back to
//! `~/.modelpeek` where no state directory is defined.

use crate::error::{PeekError, Result};
use crate::limits::Limits;
use crate::vocabulary::{Vocabulary, VocabularyOverrides};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const APP_DIR: &str = "modelpeek";
pub const CONFIG_FILE: &str = "config.json";
pub const HISTORY_FILE: &str = "history";
pub const LOG_DIR: &str = "logs";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeekConfig {
    pub limits: Limits,
    pub vocabulary: VocabularyOverrides,
}

impl PeekConfig {
    /// Reads `path`; a missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| PeekError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads `<state_dir>/config.json`.
    pub fn load_default() -> Result<Self> {
        Self::load(&config_file())
    }

    fn validate(&self) -> Result<()> {
        if self.limits.max_candidates == Some(0) {
            return Err(PeekError::Config(
                "limits.max_candidates must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::with_overrides(&self.vocabulary)
    }
}

pub fn state_dir() -> PathBuf {
    dirs::state_dir()
        .map(|dir| dir.join(APP_DIR))
        .or_else(|| dirs::home_dir().map(|home| home.join(format!(".{}", APP_DIR))))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
}

pub fn config_file() -> PathBuf {
    state_dir().join(CONFIG_FILE)
}

pub fn history_file() -> PathBuf {
    state_dir().join(HISTORY_FILE)
}

pub fn log_dir() -> PathBuf {
    state_dir().join(LOG_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = PeekConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, PeekConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"limits": {{"filter_sample": 5}}, "vocabulary": {{"extra_property_set_prefixes": ["Custom_"]}}}}"#
        )
        .unwrap();

        let config = PeekConfig::load(file.path()).unwrap();
        assert_eq!(config.limits.filter_sample, 5);
        assert_eq!(config.limits.max_candidates, None);
        assert!(
            config
                .vocabulary()
                .property_set_prefixes
                .iter()
                .any(|p| p == "Custom_")
        );
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            PeekConfig::load(file.path()),
            Err(PeekError::Config(_))
        ));
    }

    #[test]
    fn test_zero_candidate_cap_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"limits": {{"max_candidates": 0}}}}"#).unwrap();
        assert!(PeekConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_candidate_cap_is_opt_in() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"limits": {{"max_candidates": 40}}}}"#).unwrap();
        let config = PeekConfig::load(file.path()).unwrap();
        assert_eq!(config.limits.max_candidates, Some(40));
    }

    #[test]
    fn test_paths_share_state_dir() {
        let root = state_dir();
        assert!(history_file().starts_with(&root));
        assert!(log_dir().starts_with(&root));
    }
}
