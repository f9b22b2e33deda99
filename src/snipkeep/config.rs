use crate::error::{Result, SnipError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_STORAGE_KEY: &str = "snippetKeeperData";
const DEFAULT_EXPORT_PREFIX: &str = "snippet-keeper";

/// Configuration for snipkeep, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnipConfig {
    /// Key the library blob is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    /// File name prefix for exports
    #[serde(default = "default_export_prefix")]
    pub export_prefix: String,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_export_prefix() -> String {
    DEFAULT_EXPORT_PREFIX.to_string()
}

impl Default for SnipConfig {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            export_prefix: default_export_prefix(),
        }
    }
}

impl SnipConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(SnipError::Io)?;
        let config: SnipConfig =
            serde_json::from_str(&content).map_err(SnipError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(SnipError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(SnipError::Serialization)?;
        fs::write(config_path, content).map_err(SnipError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "storage-key" => Some(&self.storage_key),
            "export-prefix" => Some(&self.export_prefix),
            _ => None,
        }
    }

    /// Set a value by its CLI name. Blank values are refused.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(SnipError::Api(format!("Value for {} cannot be empty", key)));
        }
        match key {
            "storage-key" => self.storage_key = value.to_string(),
            "export-prefix" => self.export_prefix = value.to_string(),
            other => return Err(SnipError::Api(format!("Unknown config key: {}", other))),
        }
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["storage-key", "export-prefix"]
    }
}
