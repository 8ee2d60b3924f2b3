//! Configuration schema for swcache
//!
//! Configuration is stored at `~/.config/swcache/config.toml`; a
//! `swcache.toml` in the working directory overrides it key by key.

use crate::bootstrap::{RegistrationOptions, UpdateViaCache};
use crate::cache::FallbackPolicy;
use crate::error::{SwError, SwResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// The app whose requests are cached
    pub app: AppConfig,

    /// Cache lookup precedence and offline fallbacks
    pub policy: FallbackPolicy,

    /// Push notification defaults
    pub notifications: NotificationsConfig,

    /// Worker registration
    pub registration: RegistrationConfig,

    /// Network settings
    pub network: NetworkConfig,

    /// Cache storage location
    pub storage: StorageConfig,
}

impl Config {
    /// Reject values that deserialize but cannot drive a cache manager
    pub fn validate(&self) -> SwResult<()> {
        // Every store name contains the empty string, so nothing would
        // ever be purged on activation.
        if self.app.version.trim().is_empty() {
            return Err(SwError::ConfigValue {
                key: "app.version".to_string(),
                reason: "version must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// App served by the worker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// App origin; relative paths resolve against it
    pub origin: String,

    /// Prefix of every cache name (may be empty)
    pub cache_prefix: String,

    /// Version tag embedded in cache names. Bump it to ship new assets.
    pub version: String,

    /// Paths pre-cached at install
    pub static_assets: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: "http://localhost:8080".to_string(),
            cache_prefix: "html".to_string(),
            version: "v2.0.0".to_string(),
            static_assets: [
                "/",
                "/index.html",
                "/manifest.json",
                "/app.js",
                "/icon-300x300.png",
                "/icon-512x512.png",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Defaults for notifications raised by push messages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Title used when the payload has none
    pub default_title: String,

    /// Body used when the payload has none
    pub default_body: String,

    pub icon: Option<String>,

    pub badge: Option<String>,

    /// Page opened on click when no app window exists
    pub open_url: String,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            default_title: "Cheat Sheet".to_string(),
            default_body: "New content available".to_string(),
            icon: Some("/icon-300x300.png".to_string()),
            badge: Some("/icon-300x300.png".to_string()),
            open_url: "/".to_string(),
        }
    }
}

/// Worker registration settings used by the bootstrap
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    pub script_url: String,

    pub scope: String,

    pub update_via_cache: UpdateViaCache,

    /// Unregister existing workers before registering
    pub clean_existing: bool,

    /// Delay before registering, in milliseconds
    pub delay_ms: u64,
}

impl RegistrationConfig {
    /// Registration options for this section
    pub fn options(&self) -> RegistrationOptions {
        RegistrationOptions {
            script_url: self.script_url.clone(),
            scope: self.scope.clone(),
            update_via_cache: self.update_via_cache,
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        let options = RegistrationOptions::default();
        Self {
            script_url: options.script_url,
            scope: options.scope,
            update_via_cache: options.update_via_cache,
            clean_existing: false,
            delay_ms: 0,
        }
    }
}

/// Network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Largest response body accepted, in bytes; unbounded when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<u64>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_body_bytes: None,
        }
    }
}

/// Cache storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage directory (defaults to the user data directory)
    pub dir: Option<PathBuf>,
}
