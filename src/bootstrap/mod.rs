//! Client bootstrap: registers the worker and relays lifecycle and
//! connectivity signals to the user as transient toasts.
//!
//! The bootstrap never touches caches or fetches. It only talks to a
//! [`Registrar`], which is how pages reach the worker.

pub mod client;
pub mod registration;
pub mod toast;

pub use client::{BootstrapSignal, ClientBootstrap, InstallButton};
pub use registration::{Registrar, RegistrationOptions, RegistrationReport, UpdateViaCache};
pub use toast::{Severity, Toast, TOAST_SECONDS};
