//! Wiring of storage, network and platform for one CLI invocation

use crate::cache::DiskStorage;
use crate::config::{Config, ConfigManager};
use crate::error::SwResult;
use crate::fetch::{HttpNetwork, Network, OfflineNetwork};
use crate::platform::HeadlessPlatform;
use crate::worker::{LocalRegistry, ManagerSettings, Registration, ServiceWorker, WorkerEnvironment};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Whether requests may reach the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkMode {
    Online,
    Offline,
}

/// Everything a command needs to drive the worker
pub struct Runtime {
    pub settings: ManagerSettings,
    pub storage: Arc<DiskStorage>,
    pub network: Arc<dyn Network>,
    pub platform: Arc<HeadlessPlatform>,
    pub registry: LocalRegistry,
}

impl Runtime {
    /// Open the disk store and build a registry for the configured app
    pub async fn open(config: &Config, mode: NetworkMode) -> SwResult<Self> {
        let settings = ManagerSettings::from_config(config)?;
        let dir = ConfigManager::storage_dir(config);
        debug!("Cache storage at {}", dir.display());
        let storage = Arc::new(DiskStorage::open_at(dir).await?);

        let network: Arc<dyn Network> = match mode {
            NetworkMode::Online => {
                let http = HttpNetwork::new(Duration::from_secs(config.network.timeout_secs));
                Arc::new(match config.network.max_body_bytes {
                    Some(limit) => http.with_body_limit(limit),
                    None => http,
                })
            }
            NetworkMode::Offline => Arc::new(OfflineNetwork),
        };
        let platform = Arc::new(HeadlessPlatform::new());

        let env = WorkerEnvironment {
            storage: storage.clone(),
            network: network.clone(),
            clients: platform.clone(),
            notifications: platform.clone(),
        };
        let registry = LocalRegistry::new(settings.clone(), env);

        Ok(Self {
            settings,
            storage,
            network,
            platform,
            registry,
        })
    }

    /// Resume the registration installed by an earlier run
    pub async fn resume(&self, config: &Config) -> SwResult<Arc<Registration>> {
        self.registry.resume(&config.registration.options()).await
    }

    /// The active worker of the resumed registration
    pub async fn active_worker(&self, config: &Config) -> SwResult<Arc<ServiceWorker>> {
        let registration = self.resume(config).await?;
        registration
            .active()
            .await
            .ok_or_else(|| crate::error::SwError::NoActiveWorker(registration.scope().to_string()))
    }
}
