//! Platform collaborators: open client windows and user notifications
//!
//! The cache manager only talks to these through traits so it can be
//! driven headless from the CLI or by tests.

pub mod headless;

pub use headless::HeadlessPlatform;

use crate::error::SwResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// A window client the worker can control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowClient {
    /// Client ID
    pub id: Uuid,
    /// Current page URL
    pub url: Url,
    /// Whether the window has focus
    pub focused: bool,
    /// Whether this worker controls the page
    pub controlled: bool,
}

/// A notification displayed to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification ID
    pub id: Uuid,
    /// Title line
    pub title: String,
    /// Body text
    pub body: String,
    /// Icon path
    pub icon: Option<String>,
    /// Badge path
    pub badge: Option<String>,
    /// Actions offered to the user
    pub actions: Vec<String>,
}

/// Open client pages
#[async_trait]
pub trait Clients: Send + Sync {
    /// Take control of every open page; returns how many were claimed
    async fn claim(&self) -> SwResult<usize>;

    /// Window clients, controlled or not
    async fn windows(&self) -> SwResult<Vec<WindowClient>>;

    /// Focus an existing window
    async fn focus(&self, id: Uuid) -> SwResult<WindowClient>;

    /// Open a new window at `url`
    async fn open_window(&self, url: &Url) -> SwResult<WindowClient>;
}

/// User-visible notifications
#[async_trait]
pub trait Notifications: Send + Sync {
    /// Display a notification
    async fn show(&self, notification: Notification) -> SwResult<()>;

    /// Close a displayed notification
    async fn close(&self, id: Uuid) -> SwResult<()>;
}
