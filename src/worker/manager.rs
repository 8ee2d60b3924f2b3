//! Cache manager: pre-caching, stale-cache purge, and cache-first fetch
//!
//! The manager exclusively owns mutation of the cache stores. Fetch
//! handlers for concurrent requests may interleave at every await, so no
//! handler assumes a store is unchanged across a suspension point.

use crate::cache::{CacheNames, CacheStorage, CacheVersion, FallbackPolicy, ImageFallback};
use crate::config::Config;
use crate::error::{SwError, SwResult};
use crate::fetch::{Destination, Method, Network, Request, Response, ResponseSource};
use crate::platform::{Clients, Notification, Notifications};
use crate::worker::event::ClickOutcome;
use futures_util::future::join_all;
use serde::Deserialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::{Origin, Url};
use uuid::Uuid;

/// Defaults for notifications raised by push messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDefaults {
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
    /// Page opened when a notification is clicked and no window exists
    pub open_url: String,
}

/// Everything a manager needs to know about the app it serves
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    /// App origin; requests elsewhere are never intercepted
    pub origin: Url,
    /// Store names for the current version
    pub names: CacheNames,
    /// Paths pre-cached at install time
    pub static_assets: Vec<String>,
    /// Lookup precedence and offline fallbacks
    pub policy: FallbackPolicy,
    /// Push notification defaults
    pub notifications: NotificationDefaults,
}

impl ManagerSettings {
    /// Build settings from configuration
    pub fn from_config(config: &Config) -> SwResult<Self> {
        config.validate()?;
        let origin = Url::parse(&config.app.origin)
            .map_err(|e| SwError::invalid_url(&config.app.origin, e))?;
        let n = &config.notifications;
        Ok(Self {
            origin,
            names: CacheNames::new(
                config.app.cache_prefix.clone(),
                CacheVersion::new(config.app.version.clone()),
            ),
            static_assets: config.app.static_assets.clone(),
            policy: config.policy.clone(),
            notifications: NotificationDefaults {
                title: n.default_title.clone(),
                body: n.default_body.clone(),
                icon: n.icon.clone(),
                badge: n.badge.clone(),
                open_url: n.open_url.clone(),
            },
        })
    }
}

/// Outcome of pre-caching the static asset list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Static store that was populated
    pub cache: String,
    /// Assets stored
    pub cached: Vec<String>,
    /// Assets dropped, with the reason
    pub failed: Vec<(String, String)>,
}

impl InstallReport {
    /// Whether every asset made it into the static store
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of activation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateReport {
    /// Stale stores deleted
    pub deleted: Vec<String>,
    /// Stale stores that could not be deleted, with the reason
    pub failed: Vec<(String, String)>,
    /// Client pages claimed
    pub claimed: usize,
}

/// Decision of the fetch handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the platform performs the request itself
    Passthrough,
    /// Answered by the worker
    Respond {
        response: Response,
        source: ResponseSource,
    },
}

impl FetchOutcome {
    /// The response, if the request was intercepted
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Passthrough => None,
            Self::Respond { response, .. } => Some(response),
        }
    }

    /// Where the response came from, if the request was intercepted
    pub fn source(&self) -> Option<&ResponseSource> {
        match self {
            Self::Passthrough => None,
            Self::Respond { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
}

/// Owns the versioned cache stores and answers intercepted requests
pub struct CacheManager {
    settings: ManagerSettings,
    origin: Origin,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    clients: Arc<dyn Clients>,
    notifications: Arc<dyn Notifications>,
    // Dynamic-cache writes still in flight
    pending: Mutex<JoinSet<()>>,
}

impl CacheManager {
    /// Create a manager over the given storage and platform
    pub fn new(
        settings: ManagerSettings,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        clients: Arc<dyn Clients>,
        notifications: Arc<dyn Notifications>,
    ) -> Self {
        let origin = settings.origin.origin();
        Self {
            settings,
            origin,
            storage,
            network,
            clients,
            notifications,
            pending: Mutex::new(JoinSet::new()),
        }
    }

    /// The manager's settings
    pub fn settings(&self) -> &ManagerSettings {
        &self.settings
    }

    /// The version this manager serves
    pub fn version(&self) -> &CacheVersion {
        self.settings.names.version()
    }

    /// The cache storage
    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    /// Open the static store and pre-cache every static asset.
    ///
    /// Assets are fetched concurrently. An asset that fails to fetch (or
    /// answers a non-2xx status) is logged and left out; it never aborts
    /// the install. Only a failure to open the store itself is an error.
    pub async fn install(&self) -> SwResult<InstallReport> {
        let name = self.settings.names.static_name();
        info!(
            "Installing {} ({} static assets)",
            self.version(),
            self.settings.static_assets.len()
        );
        self.storage.open(&name).await?;

        let results = join_all(
            self.settings
                .static_assets
                .iter()
                .map(|path| self.precache(&name, path)),
        )
        .await;

        let mut report = InstallReport {
            cache: name,
            ..Default::default()
        };
        for (path, result) in self.settings.static_assets.iter().zip(results) {
            match result {
                Ok(()) => report.cached.push(path.clone()),
                Err(e) => {
                    warn!("Failed to pre-cache {}: {}", path, e);
                    report.failed.push((path.clone(), e.to_string()));
                }
            }
        }

        info!(
            "Cached {}/{} static assets in {}",
            report.cached.len(),
            self.settings.static_assets.len(),
            report.cache
        );
        Ok(report)
    }

    async fn precache(&self, name: &str, path: &str) -> SwResult<()> {
        let request = Request::parse(path, &self.settings.origin)?;
        let response = self.network.fetch(&request).await?;
        if !response.is_success() {
            return Err(SwError::network(
                request.url.as_str(),
                format!("status {}", response.status),
            ));
        }
        self.storage.put(name, &request, &response).await
    }

    /// Delete every store from other versions, then claim open clients.
    ///
    /// Deletions run concurrently; clients are claimed only once all of
    /// them have settled, whether they succeeded or not.
    pub async fn activate(&self) -> SwResult<ActivateReport> {
        let existing = self.storage.keys().await?;
        let stale: Vec<String> = self
            .settings
            .names
            .stale(&existing)
            .into_iter()
            .cloned()
            .collect();

        let results = join_all(stale.iter().map(|name| async move {
            info!("Deleting old cache: {}", name);
            self.storage.delete(name).await
        }))
        .await;

        let mut report = ActivateReport::default();
        for (name, result) in stale.into_iter().zip(results) {
            match result {
                Ok(_) => report.deleted.push(name),
                Err(e) => {
                    error!("Failed to delete cache {}: {}", name, e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        report.claimed = self.clients.claim().await?;
        info!(
            "Activated {}: removed {} stale cache(s), claimed {} client(s)",
            self.version(),
            report.deleted.len(),
            report.claimed
        );
        Ok(report)
    }

    /// Answer an intercepted request, cache first.
    ///
    /// Non-GET and cross-origin requests pass through untouched. A hit in
    /// any store is returned without contacting the network. On a miss the
    /// network answers; a 200 is copied into the dynamic store in the
    /// background. If the network fails, the fallback ladder applies.
    /// Never fails: every error is recovered locally.
    pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
        if request.method != Method::Get {
            debug!("Passing through {} {}", request.method, request.url);
            return FetchOutcome::Passthrough;
        }
        if !request.is_same_origin(&self.origin) {
            debug!("Passing through cross-origin {}", request.url);
            return FetchOutcome::Passthrough;
        }

        if let Some((name, response)) = self.lookup(request).await {
            debug!("Cache hit for {} in {}", request.url, name);
            return FetchOutcome::Respond {
                response,
                source: ResponseSource::Cache { name },
            };
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.status == 200 {
                    self.store_in_background(request.clone(), response.clone());
                }
                FetchOutcome::Respond {
                    response,
                    source: ResponseSource::Network,
                }
            }
            Err(e) => {
                debug!("Network failed for {}: {}", request.url, e);
                self.fallback(request).await
            }
        }
    }

    /// Wait for in-flight dynamic-cache writes to finish
    pub async fn settle(&self) {
        let mut pending = {
            let mut guard = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard)
        };
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                warn!("Cache write task failed: {}", e);
            }
        }
    }

    async fn lookup(&self, request: &Request) -> Option<(String, Response)> {
        let existing = match self.storage.keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Failed to list caches: {}", e);
                return None;
            }
        };
        let order = self.settings.policy.lookup.arrange(&self.settings.names, existing);
        match self.storage.match_first(&order, request).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache lookup failed for {}: {}", request.url, e);
                None
            }
        }
    }

    // Best effort: the response has already been handed back, and there is
    // no ordering guarantee between this write and later lookups.
    fn store_in_background(&self, request: Request, response: Response) {
        let storage = Arc::clone(&self.storage);
        let name = self.settings.names.dynamic_name();
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        while pending.try_join_next().is_some() {}
        pending.spawn(async move {
            match storage.put(&name, &request, &response).await {
                Ok(()) => debug!("Cached {} in {}", request.url, name),
                Err(e) => warn!("Failed to cache {}: {}", request.url, e),
            }
        });
    }

    async fn fallback(&self, request: &Request) -> FetchOutcome {
        let policy = &self.settings.policy;
        let target = match request.destination {
            Destination::Document => policy.document_fallback.clone(),
            Destination::Image => match &policy.image_fallback {
                ImageFallback::Placeholder(path) => Some(path.clone()),
                ImageFallback::Status(status) => {
                    return FetchOutcome::Respond {
                        response: Response::offline(*status, &policy.offline_body),
                        source: ResponseSource::Offline,
                    };
                }
            },
            _ => None,
        };

        if let Some(path) = target {
            match Request::parse(&path, &self.settings.origin) {
                Ok(fallback) => {
                    if let Some((name, response)) = self.lookup(&fallback).await {
                        return FetchOutcome::Respond {
                            response,
                            source: ResponseSource::Fallback {
                                name,
                                key: fallback.cache_key(),
                            },
                        };
                    }
                    debug!("Fallback {} not cached", path);
                }
                Err(e) => warn!("Invalid fallback path {}: {}", path, e),
            }
        }

        FetchOutcome::Respond {
            response: Response::offline(policy.offline_status, &policy.offline_body),
            source: ResponseSource::Offline,
        }
    }

    /// Show a notification for a push message.
    ///
    /// Absent or malformed payloads are ignored. Missing fields take the
    /// configured defaults.
    pub async fn handle_push(&self, payload: Option<&[u8]>) -> SwResult<Option<Notification>> {
        let Some(bytes) = payload else {
            debug!("Push without payload, ignoring");
            return Ok(None);
        };
        let parsed: PushPayload = match serde_json::from_slice(bytes) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Ignoring malformed push payload: {}", e);
                return Ok(None);
            }
        };

        let defaults = &self.settings.notifications;
        let notification = Notification {
            id: Uuid::new_v4(),
            title: parsed.title.unwrap_or_else(|| defaults.title.clone()),
            body: parsed.body.unwrap_or_else(|| defaults.body.clone()),
            icon: defaults.icon.clone(),
            badge: defaults.badge.clone(),
            actions: vec!["open".to_string(), "close".to_string()],
        };
        self.notifications.show(notification.clone()).await?;
        Ok(Some(notification))
    }

    /// Close the notification and, for the open action, bring up the app.
    ///
    /// An absent or empty action counts as "open". An existing window on
    /// the app origin is focused; otherwise a new one is opened.
    pub async fn handle_notification_click(
        &self,
        notification: Uuid,
        action: Option<&str>,
    ) -> SwResult<ClickOutcome> {
        self.notifications.close(notification).await?;

        match action {
            None | Some("") | Some("open") => {}
            Some(other) => {
                debug!("Notification action {}, nothing to open", other);
                return Ok(ClickOutcome::Dismissed);
            }
        }

        let windows = self.clients.windows().await?;
        if let Some(window) = windows.iter().find(|w| w.url.origin() == self.origin) {
            let focused = self.clients.focus(window.id).await?;
            return Ok(ClickOutcome::Focused(focused));
        }

        let url = self
            .settings
            .origin
            .join(&self.settings.notifications.open_url)
            .map_err(|e| SwError::invalid_url(&self.settings.notifications.open_url, e))?;
        let opened = self.clients.open_window(&url).await?;
        Ok(ClickOutcome::Opened(opened))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::{LookupOrder, MemoryStorage};
    use crate::fetch::scripted::ScriptedNetwork;
    use crate::platform::HeadlessPlatform;
    use std::time::Duration;

    pub(crate) fn settings(version: &str, assets: &[&str]) -> ManagerSettings {
        ManagerSettings {
            origin: Url::parse("http://localhost:8080/").unwrap(),
            names: CacheNames::new("", CacheVersion::new(version)),
            static_assets: assets.iter().map(|s| s.to_string()).collect(),
            policy: FallbackPolicy::default(),
            notifications: NotificationDefaults {
                title: "Cheat Sheet".to_string(),
                body: "New content available".to_string(),
                icon: Some("/icon-300x300.png".to_string()),
                badge: None,
                open_url: "/".to_string(),
            },
        }
    }

    struct Fixture {
        manager: CacheManager,
        storage: Arc<MemoryStorage>,
        network: Arc<ScriptedNetwork>,
        platform: Arc<HeadlessPlatform>,
    }

    fn fixture(settings: ManagerSettings, network: ScriptedNetwork) -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let network = Arc::new(network);
        let platform = Arc::new(HeadlessPlatform::new());
        let manager = CacheManager::new(
            settings,
            storage.clone(),
            network.clone(),
            platform.clone(),
            platform.clone(),
        );
        Fixture {
            manager,
            storage,
            network,
            platform,
        }
    }

    fn request(path: &str) -> Request {
        Request::parse(path, &Url::parse("http://localhost:8080/").unwrap()).unwrap()
    }

    #[test]
    fn empty_version_is_not_a_valid_setting() {
        let mut config = Config::default();
        config.app.version = String::new();
        let err = ManagerSettings::from_config(&config).unwrap_err();
        assert!(matches!(err, SwError::ConfigValue { .. }));
    }

    #[tokio::test]
    async fn install_drops_failed_assets() {
        let network = ScriptedNetwork::new().serve("/a", "A").fail("/b");
        let f = fixture(settings("v2", &["/a", "/b"]), network);

        let report = f.manager.install().await.unwrap();

        assert_eq!(report.cache, "static-v2");
        assert_eq!(report.cached, vec!["/a"]);
        assert_eq!(report.failed.len(), 1);
        assert!(!report.is_complete());
        assert!(f.storage.match_in("static-v2", &request("/a")).await.unwrap().is_some());
        assert!(f.storage.match_in("static-v2", &request("/b")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn install_skips_error_statuses() {
        let network = ScriptedNetwork::new().serve("/a", "A");
        let f = fixture(settings("v2", &["/a", "/missing"]), network);

        let report = f.manager.install().await.unwrap();
        assert_eq!(report.cached, vec!["/a"]);
        assert_eq!(report.failed[0].0, "/missing");
    }

    #[tokio::test]
    async fn activate_deletes_other_versions() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new());
        f.storage.open("static-v1").await.unwrap();
        f.storage.open("dynamic-v1").await.unwrap();
        f.storage.open("static-v2").await.unwrap();
        f.platform.add_window(Url::parse("http://localhost:8080/").unwrap()).await;

        let report = f.manager.activate().await.unwrap();

        assert_eq!(report.deleted, vec!["static-v1", "dynamic-v1"]);
        assert_eq!(report.claimed, 1);
        let remaining = f.storage.keys().await.unwrap();
        assert_eq!(remaining, vec!["static-v2"]);
        assert!(!remaining.iter().any(|n| n.contains("v1")));
    }

    #[tokio::test]
    async fn cached_request_skips_network() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new().serve("/a", "net"));
        f.storage
            .put("static-v2", &request("/a"), &Response::ok("cached"))
            .await
            .unwrap();

        let outcome = f.manager.handle_fetch(&request("/a")).await;

        assert_eq!(outcome.response().unwrap().body, "cached");
        assert_eq!(
            outcome.source(),
            Some(&ResponseSource::Cache {
                name: "static-v2".to_string()
            })
        );
        assert_eq!(f.network.calls(), 0);
    }

    #[tokio::test]
    async fn non_get_and_cross_origin_pass_through() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new().serve("/a", "A"));

        let post = request("/a").with_method(Method::Post);
        let remote = Request::get(Url::parse("https://cdn.example.net/a").unwrap());

        assert_eq!(f.manager.handle_fetch(&post).await, FetchOutcome::Passthrough);
        assert_eq!(f.manager.handle_fetch(&remote).await, FetchOutcome::Passthrough);
        f.manager.settle().await;
        assert_eq!(f.network.calls(), 0);
        assert!(f.storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn miss_populates_dynamic_cache() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new().serve("/page", "body"));

        let outcome = f.manager.handle_fetch(&request("/page")).await;
        f.manager.settle().await;

        assert_eq!(outcome.response().unwrap().body, "body");
        assert_eq!(outcome.source(), Some(&ResponseSource::Network));
        assert_eq!(f.storage.entries("dynamic-v2").await.unwrap().len(), 1);
        let stored = f
            .storage
            .match_in("dynamic-v2", &request("/page"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.body, "body");
    }

    #[tokio::test]
    async fn non_200_is_returned_but_not_cached() {
        let network = ScriptedNetwork::new().respond("/empty", Response::new(204, ""));
        let f = fixture(settings("v2", &[]), network);

        let outcome = f.manager.handle_fetch(&request("/empty")).await;
        let missing = f.manager.handle_fetch(&request("/missing")).await;
        f.manager.settle().await;

        assert_eq!(outcome.response().unwrap().status, 204);
        assert_eq!(missing.response().unwrap().status, 404);
        assert!(!f.storage.has("dynamic-v2").await.unwrap());
    }

    #[tokio::test]
    async fn offline_document_gets_root_page() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new().fail("/guide"));
        let root = Response::ok("<html>root</html>");
        f.storage.put("static-v2", &request("/"), &root).await.unwrap();

        let outcome = f
            .manager
            .handle_fetch(&request("/guide").with_destination(Destination::Document))
            .await;

        assert_eq!(outcome.response(), Some(&root));
        assert!(matches!(outcome.source(), Some(ResponseSource::Fallback { .. })));
    }

    #[tokio::test]
    async fn offline_image_gets_placeholder() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new().fail("/photo.png"));
        let icon = Response::ok("png");
        f.storage
            .put("static-v2", &request("/icon-512x512.png"), &icon)
            .await
            .unwrap();

        let outcome = f
            .manager
            .handle_fetch(&request("/photo.png").with_destination(Destination::Image))
            .await;

        assert_eq!(outcome.response(), Some(&icon));
    }

    #[tokio::test]
    async fn offline_image_status_policy() {
        let mut s = settings("v2", &[]);
        s.policy.image_fallback = ImageFallback::Status(408);
        let f = fixture(s, ScriptedNetwork::new().fail("/photo.png"));

        let outcome = f
            .manager
            .handle_fetch(&request("/photo.png").with_destination(Destination::Image))
            .await;

        let response = outcome.response().unwrap();
        assert_eq!(response.status, 408);
        assert!(response.is_offline_marker());
    }

    #[tokio::test]
    async fn offline_other_gets_synthetic_response() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new().fail("/data.json"));

        let outcome = f.manager.handle_fetch(&request("/data.json")).await;

        let response = outcome.response().unwrap();
        assert_eq!(response.status, 503);
        assert!(response.is_offline_marker());
        assert_eq!(outcome.source(), Some(&ResponseSource::Offline));
    }

    #[tokio::test]
    async fn offline_document_without_cached_root_is_synthetic() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new().fail("/guide"));

        let outcome = f
            .manager
            .handle_fetch(&request("/guide").with_destination(Destination::Document))
            .await;

        assert_eq!(outcome.source(), Some(&ResponseSource::Offline));
    }

    #[tokio::test]
    async fn creation_order_prefers_older_store() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new());
        f.storage.put("static-v2", &request("/a"), &Response::ok("static")).await.unwrap();
        f.storage.put("dynamic-v2", &request("/a"), &Response::ok("dynamic")).await.unwrap();

        let outcome = f.manager.handle_fetch(&request("/a")).await;
        assert_eq!(outcome.response().unwrap().body, "static");
    }

    #[tokio::test]
    async fn dynamic_first_policy_prefers_dynamic_store() {
        let mut s = settings("v2", &[]);
        s.policy.lookup = LookupOrder::DynamicFirst;
        let f = fixture(s, ScriptedNetwork::new());
        f.storage.put("static-v2", &request("/a"), &Response::ok("static")).await.unwrap();
        f.storage.put("dynamic-v2", &request("/a"), &Response::ok("dynamic")).await.unwrap();

        let outcome = f.manager.handle_fetch(&request("/a")).await;
        assert_eq!(outcome.response().unwrap().body, "dynamic");
    }

    #[tokio::test]
    async fn concurrent_misses_both_fetch_and_leave_one_entry() {
        let network = ScriptedNetwork::new()
            .serve("/slow", "payload")
            .with_delay(Duration::from_millis(50));
        let f = fixture(settings("v2", &[]), network);

        let (first, second) = (request("/slow"), request("/slow"));
        let (a, b) = tokio::join!(
            f.manager.handle_fetch(&first),
            f.manager.handle_fetch(&second)
        );
        f.manager.settle().await;

        assert_eq!(a.response().unwrap().body, "payload");
        assert_eq!(b.response().unwrap().body, "payload");
        assert_eq!(f.network.calls(), 2);
        assert_eq!(
            f.storage.entries("dynamic-v2").await.unwrap(),
            vec!["http://localhost:8080/slow"]
        );
    }

    /// Reads from memory, refuses every write
    struct ReadOnlyStorage(MemoryStorage);

    #[async_trait::async_trait]
    impl CacheStorage for ReadOnlyStorage {
        async fn open(&self, name: &str) -> SwResult<()> {
            self.0.open(name).await
        }
        async fn has(&self, name: &str) -> SwResult<bool> {
            self.0.has(name).await
        }
        async fn keys(&self) -> SwResult<Vec<String>> {
            self.0.keys().await
        }
        async fn delete(&self, name: &str) -> SwResult<bool> {
            self.0.delete(name).await
        }
        async fn put(&self, name: &str, request: &Request, _response: &Response) -> SwResult<()> {
            Err(SwError::CacheWrite {
                name: name.to_string(),
                key: request.cache_key(),
                reason: "disk full".to_string(),
            })
        }
        async fn match_in(&self, name: &str, request: &Request) -> SwResult<Option<Response>> {
            self.0.match_in(name, request).await
        }
        async fn entries(&self, name: &str) -> SwResult<Vec<String>> {
            self.0.entries(name).await
        }
        fn backend_name(&self) -> &'static str {
            "read-only"
        }
    }

    #[tokio::test]
    async fn failed_dynamic_write_keeps_network_response() {
        let network = Arc::new(ScriptedNetwork::new().serve("/page", "body"));
        let platform = Arc::new(HeadlessPlatform::new());
        let manager = CacheManager::new(
            settings("v2", &[]),
            Arc::new(ReadOnlyStorage(MemoryStorage::new())),
            network.clone(),
            platform.clone(),
            platform,
        );

        let outcome = manager.handle_fetch(&request("/page")).await;
        manager.settle().await;

        let response = outcome.response().unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "body");
        assert_eq!(outcome.source(), Some(&ResponseSource::Network));
        assert_eq!(network.calls(), 1);
    }

    #[tokio::test]
    async fn push_uses_payload_and_defaults() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new());

        let shown = f
            .manager
            .handle_push(Some(br#"{"title":"Hello"}"#.as_slice()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(shown.title, "Hello");
        assert_eq!(shown.body, "New content available");
        assert_eq!(f.platform.notifications().await.len(), 1);
    }

    #[tokio::test]
    async fn push_ignores_missing_or_malformed_payload() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new());

        assert!(f.manager.handle_push(None).await.unwrap().is_none());
        assert!(f.manager.handle_push(Some(b"not json".as_slice())).await.unwrap().is_none());
        assert!(f.manager.handle_push(Some(b"[1, 2]".as_slice())).await.unwrap().is_none());
        assert!(f.platform.notifications().await.is_empty());
    }

    #[tokio::test]
    async fn click_focuses_existing_window() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new());
        let window = f
            .platform
            .add_window(Url::parse("http://localhost:8080/guide").unwrap())
            .await;
        let shown = f.manager.handle_push(Some(b"{}".as_slice())).await.unwrap().unwrap();

        let outcome = f
            .manager
            .handle_notification_click(shown.id, Some("open"))
            .await
            .unwrap();

        match outcome {
            ClickOutcome::Focused(client) => assert_eq!(client.id, window.id),
            other => panic!("expected focus, got {:?}", other),
        }
        assert!(f.platform.notifications().await.is_empty());
    }

    #[tokio::test]
    async fn click_opens_window_when_none_match() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new());
        f.platform
            .add_window(Url::parse("https://elsewhere.example/").unwrap())
            .await;

        let outcome = f
            .manager
            .handle_notification_click(Uuid::new_v4(), None)
            .await
            .unwrap();

        match outcome {
            ClickOutcome::Opened(client) => {
                assert_eq!(client.url.as_str(), "http://localhost:8080/")
            }
            other => panic!("expected open, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn click_with_other_action_only_closes() {
        let f = fixture(settings("v2", &[]), ScriptedNetwork::new());
        let outcome = f
            .manager
            .handle_notification_click(Uuid::new_v4(), Some("close"))
            .await
            .unwrap();
        assert_eq!(outcome, ClickOutcome::Dismissed);
        assert!(f.platform.windows().await.unwrap().is_empty());
    }
}
