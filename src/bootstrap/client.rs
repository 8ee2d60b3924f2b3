//! Page-side bootstrap
//!
//! Registers the worker once at startup, then turns platform signals into
//! toasts and install-button visibility. Registration failures are logged
//! and surfaced as a toast; the app keeps running without offline support.

use crate::bootstrap::registration::{Registrar, RegistrationOptions, RegistrationReport};
use crate::bootstrap::toast::{Severity, Toast};
use crate::config::RegistrationConfig;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, error, info};

/// Signals the platform delivers to the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapSignal {
    /// A new worker version started installing
    UpdateFound,
    Online,
    Offline,
    /// The app became installable
    BeforeInstallPrompt,
    /// The user accepted the install prompt
    InstallAccepted,
    /// The user dismissed the install prompt
    InstallDismissed,
    /// The app was installed
    AppInstalled,
}

/// Visibility of the "install app" button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallButton {
    visible: bool,
}

impl InstallButton {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Client bootstrap state
#[derive(Debug)]
pub struct ClientBootstrap {
    options: RegistrationOptions,
    clean_existing: bool,
    delay: Duration,
    install_button: InstallButton,
    // An install prompt can be shown at most once
    deferred_prompt: bool,
    toasts: Vec<Toast>,
}

impl ClientBootstrap {
    /// Create a bootstrap registering with `options`
    pub fn new(options: RegistrationOptions) -> Self {
        Self {
            options,
            clean_existing: false,
            delay: Duration::ZERO,
            install_button: InstallButton::default(),
            deferred_prompt: false,
            toasts: Vec::new(),
        }
    }

    /// Create a bootstrap from the `[registration]` config section
    pub fn from_config(config: &RegistrationConfig) -> Self {
        Self::new(config.options())
            .with_clean_existing(config.clean_existing)
            .with_delay(Duration::from_millis(config.delay_ms))
    }

    /// Unregister every existing registration before registering
    pub fn with_clean_existing(mut self, clean: bool) -> Self {
        self.clean_existing = clean;
        self
    }

    /// Wait this long before registering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Registration options in use
    pub fn options(&self) -> &RegistrationOptions {
        &self.options
    }

    /// Register the worker.
    ///
    /// Returns `None` when registration failed; the failure is logged and
    /// reported as an error toast, never retried.
    pub async fn start(&mut self, registrar: &dyn Registrar) -> Option<RegistrationReport> {
        if self.clean_existing {
            self.clean(registrar).await;
        }
        if !self.delay.is_zero() {
            debug!("Waiting {:?} before registering", self.delay);
            tokio::time::sleep(self.delay).await;
        }

        match registrar.register(&self.options).await {
            Ok(report) => {
                info!(
                    "Registered {} for scope {} ({})",
                    self.options.script_url, report.scope, report.version
                );
                if report.update_found {
                    self.handle(BootstrapSignal::UpdateFound);
                }
                if report.install.as_ref().is_some_and(|i| !i.is_complete()) {
                    self.toast(
                        Severity::Warning,
                        "Some content could not be saved for offline use",
                    );
                } else {
                    self.toast(Severity::Success, "App ready to work offline");
                }
                Some(report)
            }
            Err(e) => {
                error!("Service worker registration failed: {}", e);
                self.toast(Severity::Error, "Offline support unavailable");
                None
            }
        }
    }

    async fn clean(&self, registrar: &dyn Registrar) {
        let scopes = match registrar.registrations().await {
            Ok(scopes) => scopes,
            Err(e) => {
                debug!("No existing registrations to clean: {}", e);
                return;
            }
        };
        let mut removed = 0;
        for scope in &scopes {
            match registrar.unregister(scope).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) => debug!("Failed to unregister {}: {}", scope, e),
            }
        }
        info!("Cleaned {} existing registration(s)", removed);
    }

    /// React to a platform signal
    pub fn handle(&mut self, signal: BootstrapSignal) {
        debug!("Bootstrap signal: {:?}", signal);
        match signal {
            BootstrapSignal::UpdateFound => {
                self.toast(Severity::Info, "New version available");
            }
            BootstrapSignal::Online => self.toast(Severity::Success, "Back online"),
            BootstrapSignal::Offline => self.toast(
                Severity::Warning,
                "You are offline. Cached content is still available",
            ),
            BootstrapSignal::BeforeInstallPrompt => {
                self.deferred_prompt = true;
                self.install_button.visible = true;
            }
            BootstrapSignal::InstallAccepted => {
                self.deferred_prompt = false;
                self.install_button.visible = false;
                self.toast(Severity::Success, "Installing app");
            }
            BootstrapSignal::InstallDismissed => {
                self.deferred_prompt = false;
                self.install_button.visible = false;
            }
            BootstrapSignal::AppInstalled => {
                self.deferred_prompt = false;
                self.install_button.visible = false;
                self.toast(Severity::Success, "App installed");
            }
        }
    }

    /// Whether an install prompt is being held for the button
    pub fn can_prompt(&self) -> bool {
        self.deferred_prompt
    }

    pub fn install_button(&self) -> InstallButton {
        self.install_button
    }

    /// Toasts still on screen at `now`
    pub fn visible_toasts(&self, now: DateTime<Utc>) -> Vec<&Toast> {
        self.toasts.iter().filter(|t| !t.is_expired(now)).collect()
    }

    /// Drain every toast raised so far
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    fn toast(&mut self, severity: Severity, message: &str) {
        self.toasts.push(Toast::new(severity, message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;
    use crate::fetch::scripted::ScriptedNetwork;
    use crate::platform::HeadlessPlatform;
    use crate::worker::manager::tests::settings;
    use crate::worker::{LocalRegistry, WorkerEnvironment};
    use std::sync::Arc;

    fn registry(network: ScriptedNetwork) -> LocalRegistry {
        let platform = Arc::new(HeadlessPlatform::new());
        let env = WorkerEnvironment {
            storage: Arc::new(MemoryStorage::new()),
            network: Arc::new(network),
            clients: platform.clone(),
            notifications: platform,
        };
        LocalRegistry::new(settings("v1", &["/", "/app.js"]), env)
    }

    fn severities(toasts: &[Toast]) -> Vec<Severity> {
        toasts.iter().map(|t| t.severity).collect()
    }

    #[tokio::test]
    async fn start_registers_and_announces() {
        let registry = registry(ScriptedNetwork::new().serve("/", "root").serve("/app.js", "js"));
        let mut bootstrap = ClientBootstrap::new(RegistrationOptions::default());

        let report = bootstrap.start(&registry).await.unwrap();
        assert!(report.update_found);

        let toasts = bootstrap.take_toasts();
        assert_eq!(severities(&toasts), vec![Severity::Info, Severity::Success]);
        assert!(bootstrap.take_toasts().is_empty());
    }

    #[tokio::test]
    async fn partial_precache_warns() {
        let registry = registry(ScriptedNetwork::new().serve("/", "root").fail("/app.js"));
        let mut bootstrap = ClientBootstrap::new(RegistrationOptions::default());

        bootstrap.start(&registry).await.unwrap();
        let toasts = bootstrap.take_toasts();
        assert_eq!(toasts.last().unwrap().severity, Severity::Warning);
    }

    #[tokio::test]
    async fn failed_registration_is_not_fatal() {
        let registry = registry(ScriptedNetwork::new());
        let mut bootstrap = ClientBootstrap::new(RegistrationOptions {
            scope: "https://elsewhere.example/".to_string(),
            ..Default::default()
        });

        assert!(bootstrap.start(&registry).await.is_none());
        assert_eq!(severities(&bootstrap.take_toasts()), vec![Severity::Error]);
    }

    #[tokio::test]
    async fn clean_existing_reinstalls() {
        let registry = registry(ScriptedNetwork::new().serve("/", "root").serve("/app.js", "js"));
        ClientBootstrap::new(RegistrationOptions::default())
            .start(&registry)
            .await
            .unwrap();

        let mut plain = ClientBootstrap::new(RegistrationOptions::default());
        assert!(!plain.start(&registry).await.unwrap().update_found);

        let mut cleaning = ClientBootstrap::new(RegistrationOptions::default())
            .with_clean_existing(true)
            .with_delay(Duration::from_millis(5));
        assert!(cleaning.start(&registry).await.unwrap().update_found);
        assert_eq!(registry.registrations().await.unwrap().len(), 1);
    }

    #[test]
    fn install_button_follows_prompt() {
        let mut bootstrap = ClientBootstrap::new(RegistrationOptions::default());
        assert!(!bootstrap.install_button().is_visible());

        bootstrap.handle(BootstrapSignal::BeforeInstallPrompt);
        assert!(bootstrap.install_button().is_visible());
        assert!(bootstrap.can_prompt());

        bootstrap.handle(BootstrapSignal::InstallAccepted);
        assert!(!bootstrap.install_button().is_visible());
        assert!(!bootstrap.can_prompt());

        bootstrap.handle(BootstrapSignal::BeforeInstallPrompt);
        bootstrap.handle(BootstrapSignal::AppInstalled);
        assert!(!bootstrap.install_button().is_visible());
    }

    #[test]
    fn connectivity_signals_raise_toasts() {
        let mut bootstrap = ClientBootstrap::new(RegistrationOptions::default());
        bootstrap.handle(BootstrapSignal::Offline);
        bootstrap.handle(BootstrapSignal::Online);

        let now = Utc::now();
        assert_eq!(bootstrap.visible_toasts(now).len(), 2);
        assert!(bootstrap
            .visible_toasts(now + chrono::Duration::seconds(4))
            .is_empty());
        assert_eq!(
            severities(&bootstrap.take_toasts()),
            vec![Severity::Warning, Severity::Success]
        );
    }
}
