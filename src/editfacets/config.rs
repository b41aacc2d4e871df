use crate::classify::DEFAULT_PLACEHOLDERS;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

/// Engine timings and tuning, stored in `config.json`.
///
/// Missing keys take their defaults, so a partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Quiet period after the last structural change before a pass runs
    #[serde(default = "default_coalesce_ms")]
    pub coalesce_ms: u64,

    /// Attempts at locating the record source before giving up
    #[serde(default = "default_search_retry_limit")]
    pub search_retry_limit: u32,

    #[serde(default = "default_search_retry_delay_ms")]
    pub search_retry_delay_ms: u64,

    /// How long the go-to highlight stays on
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,

    /// Text the host shows while a field is still loading
    #[serde(default = "default_placeholders")]
    pub placeholders: Vec<String>,

    /// Numbering state used when no preference has been stored yet
    #[serde(default = "default_numbering")]
    pub numbering_default: bool,
}

fn default_coalesce_ms() -> u64 {
    150
}

fn default_search_retry_limit() -> u32 {
    40
}

fn default_search_retry_delay_ms() -> u64 {
    250
}

fn default_highlight_ms() -> u64 {
    1500
}

fn default_placeholders() -> Vec<String> {
    DEFAULT_PLACEHOLDERS.iter().map(|p| p.to_string()).collect()
}

fn default_numbering() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            coalesce_ms: default_coalesce_ms(),
            search_retry_limit: default_search_retry_limit(),
            search_retry_delay_ms: default_search_retry_delay_ms(),
            highlight_ms: default_highlight_ms(),
            placeholders: default_placeholders(),
            numbering_default: default_numbering(),
        }
    }
}

impl EngineConfig {
    /// Reads `config.json` from `dir`. No file means every setting is default.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        match fs::read_to_string(dir.as_ref().join(CONFIG_FILENAME)) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes `config.json` into `dir`, creating it as needed.
    pub fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        fs::write(dir.join(CONFIG_FILENAME), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.coalesce_ms, 150);
        assert_eq!(config.search_retry_limit, 40);
        assert_eq!(config.placeholders, vec!["...", "Loading"]);
        assert!(config.numbering_default);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::load(dir.path().join("absent")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{"highlight_ms": 400, "placeholders": ["Chargement"]}"#,
        )
        .unwrap();

        let config = EngineConfig::load(dir.path()).unwrap();
        assert_eq!(config.highlight_ms, 400);
        assert_eq!(config.placeholders, vec!["Chargement"]);
        assert_eq!(config.coalesce_ms, 150);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        let config = EngineConfig {
            search_retry_limit: 3,
            numbering_default: false,
            ..Default::default()
        };
        config.save(&nested).unwrap();

        assert_eq!(EngineConfig::load(&nested).unwrap(), config);
    }

    #[test]
    fn test_save_over_existing_dir() {
        let dir = tempdir().unwrap();
        EngineConfig::default().save(dir.path()).unwrap();
        let config = EngineConfig {
            highlight_ms: 900,
            ..Default::default()
        };
        config.save(dir.path()).unwrap();

        assert_eq!(EngineConfig::load(dir.path()).unwrap().highlight_ms, 900);
    }

    #[test]
    fn test_config_path_that_is_a_directory_is_an_error() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(CONFIG_FILENAME)).unwrap();
        assert!(matches!(
            EngineConfig::load(dir.path()),
            Err(EngineError::Io(_))
        ));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "{ not json").unwrap();
        assert!(matches!(
            EngineConfig::load(dir.path()),
            Err(EngineError::Serialization(_))
        ));
    }
}
