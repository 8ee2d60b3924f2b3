//! In-process platform with no real windows or notification center
//!
//! Keeps clients and notifications in memory and logs every action.

use crate::error::{SwError, SwResult};
use crate::platform::{Clients, Notification, Notifications, WindowClient};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use url::Url;
use uuid::Uuid;

/// Headless platform
#[derive(Debug, Default)]
pub struct HeadlessPlatform {
    windows: RwLock<Vec<WindowClient>>,
    shown: RwLock<Vec<Notification>>,
}

impl HeadlessPlatform {
    /// Create an empty platform
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an open, uncontrolled page
    pub async fn add_window(&self, url: Url) -> WindowClient {
        let client = WindowClient {
            id: Uuid::new_v4(),
            url,
            focused: false,
            controlled: false,
        };
        self.windows.write().await.push(client.clone());
        client
    }

    /// Notifications currently displayed
    pub async fn notifications(&self) -> Vec<Notification> {
        self.shown.read().await.clone()
    }
}

#[async_trait]
impl Clients for HeadlessPlatform {
    async fn claim(&self) -> SwResult<usize> {
        let mut windows = self.windows.write().await;
        let mut claimed = 0;
        for window in windows.iter_mut().filter(|w| !w.controlled) {
            window.controlled = true;
            claimed += 1;
        }
        Ok(claimed)
    }

    async fn windows(&self) -> SwResult<Vec<WindowClient>> {
        Ok(self.windows.read().await.clone())
    }

    async fn focus(&self, id: Uuid) -> SwResult<WindowClient> {
        let mut windows = self.windows.write().await;
        for window in windows.iter_mut() {
            window.focused = window.id == id;
        }
        let focused = windows
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| SwError::ClientNotFound(id.to_string()))?;
        info!("Focused window {}", focused.url);
        Ok(focused)
    }

    async fn open_window(&self, url: &Url) -> SwResult<WindowClient> {
        let mut windows = self.windows.write().await;
        for window in windows.iter_mut() {
            window.focused = false;
        }
        let client = WindowClient {
            id: Uuid::new_v4(),
            url: url.clone(),
            focused: true,
            controlled: true,
        };
        windows.push(client.clone());
        info!("Opened window {}", url);
        Ok(client)
    }
}

#[async_trait]
impl Notifications for HeadlessPlatform {
    async fn show(&self, notification: Notification) -> SwResult<()> {
        info!("Notification: {} - {}", notification.title, notification.body);
        self.shown.write().await.push(notification);
        Ok(())
    }

    async fn close(&self, id: Uuid) -> SwResult<()> {
        self.shown.write().await.retain(|n| n.id != id);
        Ok(())
    }
}
