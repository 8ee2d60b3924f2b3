//! Registrations: which worker controls which scope
//!
//! A registration holds up to three workers at once. A new worker sits in
//! the installing slot while the previous one keeps serving from the
//! active slot; once the new worker activates it takes over and the old
//! one is retired.

use crate::bootstrap::{Registrar, RegistrationOptions, RegistrationReport, UpdateViaCache};
use crate::cache::CacheStorage;
use crate::error::{SwError, SwResult};
use crate::fetch::{Network, Request};
use crate::platform::{Clients, Notifications};
use crate::worker::manager::{
    ActivateReport, CacheManager, FetchOutcome, InstallReport, ManagerSettings,
};
use crate::worker::service_worker::ServiceWorker;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Platform services shared by every worker of an app
#[derive(Clone)]
pub struct WorkerEnvironment {
    pub storage: Arc<dyn CacheStorage>,
    pub network: Arc<dyn Network>,
    pub clients: Arc<dyn Clients>,
    pub notifications: Arc<dyn Notifications>,
}

impl WorkerEnvironment {
    /// Build a cache manager for `settings` over this environment
    pub fn manager(&self, settings: ManagerSettings) -> CacheManager {
        CacheManager::new(
            settings,
            self.storage.clone(),
            self.network.clone(),
            self.clients.clone(),
            self.notifications.clone(),
        )
    }
}

#[derive(Default)]
struct Slots {
    installing: Option<Arc<ServiceWorker>>,
    waiting: Option<Arc<ServiceWorker>>,
    active: Option<Arc<ServiceWorker>>,
}

/// The workers registered for one scope
pub struct Registration {
    scope: Url,
    options: RegistrationOptions,
    slots: RwLock<Slots>,
}

impl Registration {
    /// Create an empty registration
    pub fn new(scope: Url, options: RegistrationOptions) -> Self {
        Self {
            scope,
            options,
            slots: RwLock::new(Slots::default()),
        }
    }

    /// The controlled scope
    pub fn scope(&self) -> &Url {
        &self.scope
    }

    /// Options the registration was made with
    pub fn options(&self) -> &RegistrationOptions {
        &self.options
    }

    /// Worker currently controlling the scope
    pub async fn active(&self) -> Option<Arc<ServiceWorker>> {
        self.slots.read().await.active.clone()
    }

    /// Worker currently installing
    pub async fn installing(&self) -> Option<Arc<ServiceWorker>> {
        self.slots.read().await.installing.clone()
    }

    /// Installed worker waiting to activate
    pub async fn waiting(&self) -> Option<Arc<ServiceWorker>> {
        self.slots.read().await.waiting.clone()
    }

    /// Whether `url` falls under this registration's scope
    pub fn controls(&self, url: &Url) -> bool {
        url.origin() == self.scope.origin() && url.path().starts_with(self.scope.path())
    }

    /// Put an already-active worker in control, e.g. one resumed from
    /// persisted caches.
    pub async fn adopt(&self, worker: Arc<ServiceWorker>) {
        let previous = self.slots.write().await.active.replace(worker);
        if let Some(previous) = previous {
            previous.make_redundant().await;
        }
    }

    /// Install `worker` and, since workers skip waiting, activate it
    /// right away.
    ///
    /// The previous active worker keeps serving until the new one is
    /// active, then becomes redundant.
    pub async fn install(
        &self,
        worker: Arc<ServiceWorker>,
    ) -> SwResult<(InstallReport, Option<ActivateReport>)> {
        let superseded = self.slots.write().await.installing.replace(worker.clone());
        if let Some(superseded) = superseded {
            superseded.make_redundant().await;
        }

        let install = match worker.install().await {
            Ok(report) => report,
            Err(e) => {
                self.clear_installing(&worker).await;
                return Err(e);
            }
        };

        {
            let mut slots = self.slots.write().await;
            if slots
                .installing
                .as_ref()
                .is_some_and(|w| Arc::ptr_eq(w, &worker))
            {
                slots.installing = None;
            }
            let stale = slots.waiting.replace(worker);
            drop(slots);
            if let Some(stale) = stale {
                stale.make_redundant().await;
            }
        }

        let activate = self.activate_waiting().await?;
        Ok((install, activate))
    }

    /// Activate the waiting worker, if there is one
    pub async fn activate_waiting(&self) -> SwResult<Option<ActivateReport>> {
        let Some(worker) = self.slots.write().await.waiting.take() else {
            return Ok(None);
        };

        let report = worker.activate().await?;
        let previous = self.slots.write().await.active.replace(worker.clone());
        if let Some(previous) = previous {
            debug!(
                "Worker {} ({}) superseded by {}",
                previous.id(),
                previous.version(),
                worker.version()
            );
            previous.make_redundant().await;
        }
        info!("Worker {} active for {}", worker.version(), self.scope);
        Ok(Some(report))
    }

    /// Route a request through the active worker
    pub async fn handle_fetch(&self, request: Request) -> FetchOutcome {
        if !self.controls(&request.url) {
            return FetchOutcome::Passthrough;
        }
        match self.active().await {
            Some(worker) => worker.fetch(request).await,
            None => FetchOutcome::Passthrough,
        }
    }

    /// Retire every worker in the registration
    pub async fn unregister(&self) {
        let slots = std::mem::take(&mut *self.slots.write().await);
        for worker in [slots.installing, slots.waiting, slots.active]
            .into_iter()
            .flatten()
        {
            worker.make_redundant().await;
        }
        info!("Unregistered {}", self.scope);
    }

    async fn clear_installing(&self, worker: &Arc<ServiceWorker>) {
        let mut slots = self.slots.write().await;
        if slots
            .installing
            .as_ref()
            .is_some_and(|w| Arc::ptr_eq(w, worker))
        {
            slots.installing = None;
        }
    }
}

/// In-process registrar for one app origin
pub struct LocalRegistry {
    env: WorkerEnvironment,
    settings: RwLock<ManagerSettings>,
    registrations: RwLock<Vec<Arc<Registration>>>,
}

impl LocalRegistry {
    /// Create a registry serving the app described by `settings`
    pub fn new(settings: ManagerSettings, env: WorkerEnvironment) -> Self {
        Self {
            env,
            settings: RwLock::new(settings),
            registrations: RwLock::new(Vec::new()),
        }
    }

    /// Replace the settings used for the next worker, e.g. after a
    /// version bump
    pub async fn set_settings(&self, settings: ManagerSettings) {
        *self.settings.write().await = settings;
    }

    /// The registration for exactly `scope`
    pub async fn registration(&self, scope: &Url) -> Option<Arc<Registration>> {
        self.registrations
            .read()
            .await
            .iter()
            .find(|r| r.scope() == scope)
            .cloned()
    }

    /// Restore a registration whose worker was activated by an earlier run.
    ///
    /// Fails with `NoActiveWorker` unless the static store for the current
    /// version exists.
    pub async fn resume(&self, options: &RegistrationOptions) -> SwResult<Arc<Registration>> {
        let settings = self.settings.read().await.clone();
        let (_, scope) = resolve(&settings.origin, options)?;
        let static_name = settings.names.static_name();
        if !self.env.storage.has(&static_name).await? {
            return Err(SwError::NoActiveWorker(scope.to_string()));
        }

        let registration = self.find_or_create(scope, options).await;
        if registration.active().await.is_none() {
            let worker = ServiceWorker::resumed(Arc::new(self.env.manager(settings)));
            debug!("Resumed worker {} for {}", worker.version(), registration.scope());
            registration.adopt(Arc::new(worker)).await;
        }
        Ok(registration)
    }

    /// Route a request to the registration with the most specific
    /// matching scope
    pub async fn handle_fetch(&self, request: Request) -> FetchOutcome {
        let registration = self
            .registrations
            .read()
            .await
            .iter()
            .filter(|r| r.controls(&request.url))
            .max_by_key(|r| r.scope().path().len())
            .cloned();
        match registration {
            Some(registration) => registration.handle_fetch(request).await,
            None => FetchOutcome::Passthrough,
        }
    }

    async fn find_or_create(
        &self,
        scope: Url,
        options: &RegistrationOptions,
    ) -> Arc<Registration> {
        let mut registrations = self.registrations.write().await;
        if let Some(existing) = registrations.iter().find(|r| r.scope() == &scope) {
            return existing.clone();
        }
        let registration = Arc::new(Registration::new(scope, options.clone()));
        registrations.push(registration.clone());
        registration
    }
}

/// Resolve script and scope against the app origin
fn resolve(origin: &Url, options: &RegistrationOptions) -> SwResult<(Url, Url)> {
    let script = origin
        .join(&options.script_url)
        .map_err(|e| SwError::invalid_url(&options.script_url, e))?;
    let scope = origin
        .join(&options.scope)
        .map_err(|e| SwError::invalid_url(&options.scope, e))?;

    for url in [&script, &scope] {
        if url.origin() != origin.origin() {
            return Err(SwError::ScopeOutsideOrigin {
                scope: url.to_string(),
                origin: origin.origin().ascii_serialization(),
            });
        }
    }

    let script_dir = &script.path()[..script.path().rfind('/').map_or(0, |i| i + 1)];
    if !scope.path().starts_with(script_dir) {
        return Err(SwError::RegistrationRejected(format!(
            "scope {} is not under the script directory {}",
            scope.path(),
            script_dir
        )));
    }
    Ok((script, scope))
}

#[async_trait]
impl Registrar for LocalRegistry {
    async fn register(&self, options: &RegistrationOptions) -> SwResult<RegistrationReport> {
        let settings = self.settings.read().await.clone();
        let (script, scope) = resolve(&settings.origin, options)?;
        debug!("Registering {} for scope {}", script, scope);

        let registration = self.find_or_create(scope.clone(), options).await;
        if let Some(active) = registration.active().await {
            let reuse = options.update_via_cache == UpdateViaCache::All
                || active.version() == settings.names.version();
            if reuse {
                info!("Worker {} already active for {}", active.version(), scope);
                return Ok(RegistrationReport {
                    scope,
                    version: active.version().clone(),
                    update_found: false,
                    install: None,
                    activate: None,
                });
            }
            info!(
                "Update found for {}: {} -> {}",
                scope,
                active.version(),
                settings.names.version()
            );
        }

        let version = settings.names.version().clone();
        let worker = Arc::new(ServiceWorker::new(Arc::new(self.env.manager(settings))));
        let (install, activate) = registration.install(worker).await.inspect_err(|e| {
            warn!("Registration of {} failed: {}", scope, e);
        })?;

        Ok(RegistrationReport {
            scope,
            version,
            update_found: true,
            install: Some(install),
            activate,
        })
    }

    async fn registrations(&self) -> SwResult<Vec<Url>> {
        Ok(self
            .registrations
            .read()
            .await
            .iter()
            .map(|r| r.scope().clone())
            .collect())
    }

    async fn unregister(&self, scope: &Url) -> SwResult<bool> {
        let removed = {
            let mut registrations = self.registrations.write().await;
            let position = registrations.iter().position(|r| r.scope() == scope);
            position.map(|i| registrations.remove(i))
        };
        match removed {
            Some(registration) => {
                registration.unregister().await;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
