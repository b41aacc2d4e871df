use super::PreferenceStore;
use crate::error::{EngineError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PREFERENCES_FILENAME: &str = "preferences.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    numbering_enabled: Option<bool>,
}

pub struct FilePreferences {
    root: PathBuf,
}

impl FilePreferences {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Per-user data directory, e.g. `~/.local/share/editfacets` on Linux.
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "editfacets", "editfacets")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| EngineError::Preference("Could not determine data dir".to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self) -> PathBuf {
        self.root.join(PREFERENCES_FILENAME)
    }

    fn load(&self) -> Result<Preferences> {
        let path = self.path();
        if !path.exists() {
            return Ok(Preferences::default());
        }
        let content = fs::read_to_string(&path).map_err(EngineError::Io)?;
        serde_json::from_str(&content).map_err(|e| {
            EngineError::Preference(format!("{} is not valid: {}", path.display(), e))
        })
    }
}

impl PreferenceStore for FilePreferences {
    fn numbering_enabled(&self) -> Result<Option<bool>> {
        Ok(self.load()?.numbering_enabled)
    }

    fn set_numbering_enabled(&mut self, enabled: bool) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(EngineError::Io)?;
        }
        let prefs = Preferences {
            numbering_enabled: Some(enabled),
        };
        let content = serde_json::to_string_pretty(&prefs).map_err(EngineError::Serialization)?;
        fs::write(self.path(), content).map_err(EngineError::Io)?;
        Ok(())
    }
}
