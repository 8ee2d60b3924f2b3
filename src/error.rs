//! Error types for swcache
//!
//! All modules use `SwResult<T>` as their return type.

use crate::worker::WorkerState;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for swcache operations
pub type SwResult<T> = Result<T, SwError>;

/// All errors that can occur in swcache
#[derive(Error, Debug)]
pub enum SwError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown config key: {0}")]
    ConfigKey(String),

    #[error("Invalid value for {key}: {reason}")]
    ConfigValue { key: String, reason: String },

    // Request errors
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported request method: {0}")]
    InvalidMethod(String),

    // Cache storage errors
    #[error("Cache not found: {0}")]
    CacheNotFound(String),

    #[error("Cache index corrupt for {name}: {reason}")]
    CacheCorrupt { name: String, reason: String },

    #[error("Failed to store {key} in cache {name}: {reason}")]
    CacheWrite {
        name: String,
        key: String,
        reason: String,
    },

    // Network errors
    #[error("Network request failed for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Network unavailable (offline)")]
    Offline,

    #[error("Background task failed: {0}")]
    Task(String),

    // Lifecycle errors
    #[error("Invalid worker state transition: {from} -> {to}")]
    InvalidTransition { from: WorkerState, to: WorkerState },

    #[error("Worker is {state}, cannot handle {event} events")]
    EventRejected { event: String, state: WorkerState },

    #[error("Registration rejected: {0}")]
    RegistrationRejected(String),

    #[error("Scope {scope} is outside origin {origin}")]
    ScopeOutsideOrigin { scope: String, origin: String },

    #[error("No active worker for scope {0}")]
    NoActiveWorker(String),

    // Platform errors
    #[error("Client not found: {0}")]
    ClientNotFound(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML edit error: {0}")]
    TomlEdit(#[from] toml_edit::TomlError),

    // General errors
    #[error("{0}")]
    User(String),
}

impl SwError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Offline | Self::Task(_))
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigInvalid { .. } => Some("Run: swcache config show"),
            Self::ConfigKey(_) => Some("Run: swcache config show to list available keys"),
            Self::ConfigValue { .. } => Some("Run: swcache config set <key> <value> to fix it"),
            Self::CacheCorrupt { .. } => Some("Run: swcache cache clear --yes"),
            Self::NoActiveWorker(_) => Some("Run: swcache install"),
            Self::Offline => Some("Drop --offline to use the network"),
            Self::ScopeOutsideOrigin { .. } => Some("Scope and script must share the app origin"),
            _ => None,
        }
    }
}
