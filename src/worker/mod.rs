//! Worker lifecycle and the cache manager it drives
//!
//! # States
//!
//! | State | Handles | Next |
//! |-------|---------|------|
//! | parsed | - | installing |
//! | installing | install | installed, redundant |
//! | installed | - | activating, redundant |
//! | activating | activate | active, redundant |
//! | active | fetch, push, notificationclick, sync, periodicsync | redundant |
//! | redundant | - | - |
//!
//! Install always skips waiting, so a registration moves a new worker
//! straight from installed to activating. The previous active worker keeps
//! serving fetches until the new one reaches active.

pub mod event;
pub mod manager;
pub mod registry;
pub mod service_worker;
pub mod state;

pub use event::{ClickOutcome, Event, EventKind, EventOutcome};
pub use manager::{
    ActivateReport, CacheManager, FetchOutcome, InstallReport, ManagerSettings,
    NotificationDefaults,
};
pub use registry::{LocalRegistry, Registration, WorkerEnvironment};
pub use service_worker::ServiceWorker;
pub use state::WorkerState;
