//! Worker lifecycle state machine

use crate::error::{SwError, SwResult};
use crate::worker::event::EventKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one worker instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Created, not yet installing
    Parsed,
    /// Pre-caching static assets
    Installing,
    /// Installed, waiting to activate
    Installed,
    /// Purging stale caches and claiming clients
    Activating,
    /// Serving events
    Active,
    /// Replaced, unregistered, or failed to install
    Redundant,
}

impl WorkerState {
    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Parsed, Installing)
                | (Installing, Installed)
                | (Installed, Activating)
                | (Activating, Active)
        ) || (next == Redundant && self != Redundant)
    }

    /// Move to `next`, rejecting illegal transitions
    pub fn transition(&mut self, next: WorkerState) -> SwResult<()> {
        if !self.can_transition_to(next) {
            return Err(SwError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// Whether a worker in this state handles events of `kind`
    pub fn accepts(self, kind: EventKind) -> bool {
        match kind {
            EventKind::Install => self == Self::Installing,
            EventKind::Activate => self == Self::Activating,
            EventKind::Fetch
            | EventKind::Push
            | EventKind::NotificationClick
            | EventKind::Sync
            | EventKind::PeriodicSync => self == Self::Active,
        }
    }

    /// Whether the worker is finished for good
    pub fn is_terminal(self) -> bool {
        self == Self::Redundant
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Active => "active",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}
