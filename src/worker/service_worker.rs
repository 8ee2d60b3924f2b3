//! One worker instance: a state machine in front of a cache manager

use crate::cache::CacheVersion;
use crate::error::{SwError, SwResult};
use crate::fetch::Request;
use crate::worker::event::{Event, EventKind, EventOutcome};
use crate::worker::manager::{ActivateReport, CacheManager, FetchOutcome, InstallReport};
use crate::worker::state::WorkerState;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A worker instance serving one cache version
pub struct ServiceWorker {
    id: Uuid,
    state: RwLock<WorkerState>,
    manager: Arc<CacheManager>,
}

impl ServiceWorker {
    /// Create a worker that still has to install
    pub fn new(manager: Arc<CacheManager>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: RwLock::new(WorkerState::Parsed),
            manager,
        }
    }

    /// Restore a worker whose version was installed and activated earlier
    ///
    /// Used when a process starts over caches persisted by a previous run.
    pub fn resumed(manager: Arc<CacheManager>) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: RwLock::new(WorkerState::Active),
            manager,
        }
    }

    /// Worker ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Cache version served by this worker
    pub fn version(&self) -> &CacheVersion {
        self.manager.version()
    }

    /// The cache manager behind this worker
    pub fn manager(&self) -> &Arc<CacheManager> {
        &self.manager
    }

    /// Current lifecycle state
    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    async fn transition(&self, next: WorkerState) -> SwResult<()> {
        let mut state = self.state.write().await;
        let previous = *state;
        state.transition(next)?;
        debug!("Worker {} ({}): {} -> {}", self.id, self.version(), previous, next);
        Ok(())
    }

    /// Deliver an event to its handler.
    ///
    /// Each event kind maps to exactly one handler; events the current
    /// state does not accept are rejected. Returns once the handler's work
    /// has settled.
    pub async fn dispatch(&self, event: Event) -> SwResult<EventOutcome> {
        let kind = event.kind();
        let state = self.state().await;
        if !state.accepts(kind) {
            return Err(SwError::EventRejected {
                event: kind.to_string(),
                state,
            });
        }

        match event {
            Event::Install => self.manager.install().await.map(EventOutcome::Installed),
            Event::Activate => self.manager.activate().await.map(EventOutcome::Activated),
            Event::Fetch(request) => Ok(EventOutcome::Fetched(
                self.manager.handle_fetch(&request).await,
            )),
            Event::Push(payload) => self
                .manager
                .handle_push(payload.as_deref())
                .await
                .map(EventOutcome::Pushed),
            Event::NotificationClick {
                notification,
                action,
            } => self
                .manager
                .handle_notification_click(notification, action.as_deref())
                .await
                .map(EventOutcome::Clicked),
            Event::Sync { tag } | Event::PeriodicSync { tag } => {
                info!("Received {} event (tag: {}), nothing to do", kind, tag);
                Ok(EventOutcome::Acknowledged)
            }
        }
    }

    /// Run the install phase: parsed -> installing -> installed.
    ///
    /// A failed install leaves the worker redundant.
    pub async fn install(&self) -> SwResult<InstallReport> {
        self.transition(WorkerState::Installing).await?;
        match self.dispatch(Event::Install).await {
            Ok(EventOutcome::Installed(report)) => {
                self.transition(WorkerState::Installed).await?;
                Ok(report)
            }
            Ok(other) => Err(SwError::User(format!(
                "unexpected install outcome: {:?}",
                other
            ))),
            Err(e) => {
                warn!("Install of {} failed: {}", self.version(), e);
                self.transition(WorkerState::Redundant).await?;
                Err(e)
            }
        }
    }

    /// Run the activate phase: installed -> activating -> active.
    pub async fn activate(&self) -> SwResult<ActivateReport> {
        self.transition(WorkerState::Activating).await?;
        match self.dispatch(Event::Activate).await {
            Ok(EventOutcome::Activated(report)) => {
                self.transition(WorkerState::Active).await?;
                Ok(report)
            }
            Ok(other) => Err(SwError::User(format!(
                "unexpected activate outcome: {:?}",
                other
            ))),
            Err(e) => {
                warn!("Activation of {} failed: {}", self.version(), e);
                self.transition(WorkerState::Redundant).await?;
                Err(e)
            }
        }
    }

    /// Serve a fetch; a worker that isn't active leaves the request alone
    pub async fn fetch(&self, request: Request) -> FetchOutcome {
        match self.dispatch(Event::Fetch(request)).await {
            Ok(EventOutcome::Fetched(outcome)) => outcome,
            Ok(_) | Err(_) => FetchOutcome::Passthrough,
        }
    }

    /// Retire the worker
    pub async fn make_redundant(&self) {
        let mut state = self.state.write().await;
        if state.transition(WorkerState::Redundant).is_ok() {
            debug!("Worker {} ({}) is redundant", self.id, self.version());
        }
    }

    /// Whether the worker accepts events of `kind` right now
    pub async fn accepts(&self, kind: EventKind) -> bool {
        self.state().await.accepts(kind)
    }
}
