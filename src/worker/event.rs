//! Lifecycle and functional events delivered to a worker

use crate::fetch::Request;
use crate::platform::{Notification, WindowClient};
use crate::worker::manager::{ActivateReport, FetchOutcome, InstallReport};
use bytes::Bytes;
use std::fmt;
use uuid::Uuid;

/// Kind of event, used to look up the handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Push,
    NotificationClick,
    Sync,
    PeriodicSync,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch => "fetch",
            Self::Push => "push",
            Self::NotificationClick => "notificationclick",
            Self::Sync => "sync",
            Self::PeriodicSync => "periodicsync",
        };
        f.write_str(name)
    }
}

/// An event with its payload
#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    Push(Option<Bytes>),
    NotificationClick {
        notification: Uuid,
        action: Option<String>,
    },
    Sync {
        tag: String,
    },
    PeriodicSync {
        tag: String,
    },
}

impl Event {
    /// The event kind
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Install => EventKind::Install,
            Self::Activate => EventKind::Activate,
            Self::Fetch(_) => EventKind::Fetch,
            Self::Push(_) => EventKind::Push,
            Self::NotificationClick { .. } => EventKind::NotificationClick,
            Self::Sync { .. } => EventKind::Sync,
            Self::PeriodicSync { .. } => EventKind::PeriodicSync,
        }
    }
}

/// What a notification click did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An existing app window was focused
    Focused(WindowClient),
    /// A new app window was opened
    Opened(WindowClient),
    /// The notification was only closed
    Dismissed,
}

/// Result of a handled event
///
/// The dispatcher returns only once the handler's work has settled, which
/// is the extended lifetime the platform grants an event.
#[derive(Debug)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Fetched(FetchOutcome),
    Pushed(Option<Notification>),
    Clicked(ClickOutcome),
    Acknowledged,
}
