//! Worker registration interface

use crate::cache::CacheVersion;
use crate::error::SwResult;
use crate::worker::{ActivateReport, InstallReport};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Whether the HTTP cache may be reused when checking the worker for updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateViaCache {
    /// Imported scripts may come from cache, the worker itself never
    Imports,
    /// Everything may come from cache; an existing registration is reused
    All,
    /// Always revalidate
    #[default]
    None,
}

/// Options supplied with a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationOptions {
    /// Worker script location
    pub script_url: String,
    /// Pages the worker controls
    pub scope: String,
    /// Update check caching mode
    pub update_via_cache: UpdateViaCache,
}

impl Default for RegistrationOptions {
    fn default() -> Self {
        Self {
            script_url: "/sw.js".to_string(),
            scope: "/".to_string(),
            update_via_cache: UpdateViaCache::None,
        }
    }
}

/// Result of a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Resolved scope
    pub scope: Url,
    /// Version now active for the scope
    pub version: CacheVersion,
    /// Whether a new worker was installed
    pub update_found: bool,
    /// Install outcome, if a new worker was installed
    pub install: Option<InstallReport>,
    /// Activation outcome, if a new worker was activated
    pub activate: Option<ActivateReport>,
}

/// Something pages can register workers with
#[async_trait]
pub trait Registrar: Send + Sync {
    /// Register (or update) the worker for `options.scope`
    async fn register(&self, options: &RegistrationOptions) -> SwResult<RegistrationReport>;

    /// Scopes with a live registration
    async fn registrations(&self) -> SwResult<Vec<Url>>;

    /// Remove the registration for `scope`; returns whether one existed
    async fn unregister(&self, scope: &Url) -> SwResult<bool>;
}
