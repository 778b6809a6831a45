use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::domain::{AppConfig, CartError};
use crate::ports::ConfigStore;

/// TOML-based configuration store with OS-specific paths.
pub struct TomlConfigStore {
    config_dir: PathBuf,
}

impl TomlConfigStore {
    /// Create a new TomlConfigStore.
    /// Uses OS-specific configuration directories.
    pub fn new() -> Result<Self, CartError> {
        let config_dir = Self::default_config_dir()?;
        Self::at(config_dir)
    }

    /// Create a TomlConfigStore rooted at an explicit directory.
    pub fn at(config_dir: PathBuf) -> Result<Self, CartError> {
        fs::create_dir_all(&config_dir)?;
        info!(config_dir = ?config_dir, "ConfigStore initialized");
        Ok(Self { config_dir })
    }

    /// OS-specific configuration directory.
    /// - macOS: ~/Library/Application Support/Storecart/
    /// - Windows: %APPDATA%\Storecart\
    /// - Linux: ~/.config/Storecart/
    fn default_config_dir() -> Result<PathBuf, CartError> {
        dirs::config_dir()
            .map(|p| p.join("Storecart"))
            .ok_or_else(|| {
                CartError::Config("Could not find configuration directory".to_string())
            })
    }
}

impl ConfigStore for TomlConfigStore {
    fn load(&self) -> Result<AppConfig, CartError> {
        let config_path = self.config_path();

        if config_path.exists() {
            debug!(path = ?config_path, "Loading configuration");
            let content = fs::read_to_string(&config_path)?;
            let config: AppConfig = toml::from_str(&content)?;
            info!(path = ?config_path, "Configuration loaded");
            Ok(config)
        } else {
            info!(path = ?config_path, "Configuration file not found, creating default");
            let config = AppConfig::new();
            self.save(&config)?;
            Ok(config)
        }
    }

    fn save(&self, config: &AppConfig) -> Result<(), CartError> {
        let config_path = self.config_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&config_path, content)?;

        info!(path = ?config_path, "Configuration saved");
        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    fn data_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    fn logs_dir(&self) -> PathBuf {
        dirs::data_dir()
            .map(|p| p.join("Storecart").join("logs"))
            .unwrap_or_else(|| self.config_dir.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = env::temp_dir().join("storecart_config_test");
        let _ = fs::remove_dir_all(&temp_dir);

        let store = TomlConfigStore::at(temp_dir.clone()).unwrap();

        let mut config = AppConfig::new();
        config.api.base_url = "https://shop.example.com/api".to_string();
        config.logging.level = "debug".to_string();

        store.save(&config).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.api.base_url, "https://shop.example.com/api");
        assert_eq!(loaded.logging.level, "debug");

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_load_creates_default_when_missing() {
        let temp_dir = env::temp_dir().join("storecart_config_default_test");
        let _ = fs::remove_dir_all(&temp_dir);

        let store = TomlConfigStore::at(temp_dir.clone()).unwrap();
        let config = store.load().unwrap();

        assert_eq!(config.storage.cart_key, "@storecart:cart");
        assert!(store.config_path().exists());

        let _ = fs::remove_dir_all(&temp_dir);
    }
}
