use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed name of the single stored document.
pub const STORAGE_KEY: &str = "text-storage";

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("taskdeck")
}

fn default_storage_key() -> String {
    STORAGE_KEY.to_string()
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TaskdeckConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for TaskdeckConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            storage_key: default_storage_key(),
            debug_logging: false,
        }
    }
}

impl TaskdeckConfig {
    /// `<config dir>/taskdeck/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taskdeck").join("config.json"))
    }

    /// Read the config file, falling back to defaults when it is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.storage_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TaskdeckConfig::load(&dir.path().join("config.json"));
        assert_eq!(config, TaskdeckConfig::default());
        assert_eq!(config.storage_key, STORAGE_KEY);
        assert!(!config.debug_logging);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "data_dir": "/srv/tasks", "debug_logging": true }"#).unwrap();
        let config = TaskdeckConfig::load(&path);
        assert_eq!(config.data_dir, PathBuf::from("/srv/tasks"));
        assert!(config.debug_logging);
        assert_eq!(config.document_path(), PathBuf::from("/srv/tasks/text-storage.json"));
    }

    #[test]
    fn invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "data_dir = 3").unwrap();
        assert_eq!(TaskdeckConfig::load(&path), TaskdeckConfig::default());
    }
}
