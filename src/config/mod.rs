//! Configuration management for swcache

pub mod schema;

pub use schema::{
    AppConfig, Config, GeneralConfig, NetworkConfig, NotificationsConfig, RegistrationConfig,
    StorageConfig,
};

use crate::error::{SwError, SwResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// File name of a project-local config
pub const LOCAL_CONFIG_FILE: &str = "swcache.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("swcache")
            .join("config.toml")
    }

    /// Get the default cache storage directory
    pub fn default_storage_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("swcache")
            .join("caches")
    }

    /// Storage directory for `config`, falling back to the default
    pub fn storage_dir(config: &Config) -> PathBuf {
        config
            .storage
            .dir
            .clone()
            .unwrap_or_else(Self::default_storage_dir)
    }

    /// Look for a project-local config in `dir`
    pub fn find_local_config(dir: &Path) -> Option<PathBuf> {
        let candidate = dir.join(LOCAL_CONFIG_FILE);
        candidate.is_file().then_some(candidate)
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> SwResult<Config> {
        self.load_merged(None).await
    }

    /// Load configuration with `local` layered over the global file.
    ///
    /// Keys present in the local file replace the global ones; tables are
    /// merged key by key.
    pub async fn load_merged(&self, local: Option<&Path>) -> SwResult<Config> {
        let mut merged = if self.config_path.exists() {
            read_table(&self.config_path).await?
        } else {
            debug!("Config file not found, using defaults");
            toml::Table::new()
        };

        if let Some(path) = local {
            debug!("Layering local config {}", path.display());
            merge_tables(&mut merged, read_table(path).await?);
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| SwError::ConfigInvalid {
                path: local.map_or_else(|| self.config_path.clone(), Path::to_path_buf),
                reason: e.to_string(),
            })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> SwResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            SwError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> SwResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SwError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_table(path: &Path) -> SwResult<toml::Table> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| SwError::io(format!("reading config from {}", path.display()), e))?;
    content.parse().map_err(|e: toml::de::Error| SwError::ConfigInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let toml::Value::Table(incoming) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, incoming);
            continue;
        }
        base.insert(key, toml::Value::Table(incoming));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.app.cache_prefix, "html");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.app.version = "v9".to_string();

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.app.version, "v9");
    }

    #[tokio::test]
    async fn local_config_overrides_global_keys() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("config.toml");
        std::fs::write(
            &global,
            "[app]\nversion = \"v1\"\ncache_prefix = \"site\"\n[network]\ntimeout_secs = 3\n",
        )
        .unwrap();
        let local = temp.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&local, "[app]\nversion = \"v2\"\n").unwrap();

        let manager = ConfigManager::with_path(global);
        let found = ConfigManager::find_local_config(temp.path()).unwrap();
        let config = manager.load_merged(Some(&found)).await.unwrap();

        assert_eq!(config.app.version, "v2");
        assert_eq!(config.app.cache_prefix, "site");
        assert_eq!(config.network.timeout_secs, 3);
    }

    #[tokio::test]
    async fn invalid_config_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[app\nversion = ").unwrap();

        let err = ConfigManager::with_path(path.clone()).load().await.unwrap_err();
        assert!(matches!(err, SwError::ConfigInvalid { path: p, .. } if p == path));
    }

    #[tokio::test]
    async fn empty_version_loads_but_does_not_validate() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[app]\nversion = \"\"\n").unwrap();

        // Still loadable so `config set` can repair it
        let config = ConfigManager::with_path(path).load().await.unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, SwError::ConfigValue { .. }));
    }

    #[test]
    fn find_local_config_missing() {
        let temp = TempDir::new().unwrap();
        assert!(ConfigManager::find_local_config(temp.path()).is_none());
    }
}
