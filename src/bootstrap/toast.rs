//! Transient user-facing messages

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long a toast stays on screen
pub const TOAST_SECONDS: i64 = 3;

/// Toast severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

impl Severity {
    /// Background colour for this severity
    pub fn color(&self) -> &'static str {
        match self {
            Self::Success => "#4CAF50",
            Self::Warning => "#FF9800",
            Self::Error => "#f44336",
            Self::Info => "#2196F3",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A non-blocking message that dismisses itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    /// Create a toast shown from now
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    /// When the toast is dismissed
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(TOAST_SECONDS)
    }

    /// Whether the toast has been dismissed at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_colors() {
        assert_eq!(Severity::Success.color(), "#4CAF50");
        assert_eq!(Severity::Warning.color(), "#FF9800");
        assert_eq!(Severity::Error.color(), "#f44336");
        assert_eq!(Severity::Info.color(), "#2196F3");
    }

    #[test]
    fn toast_expires_after_three_seconds() {
        let toast = Toast::new(Severity::Info, "hello");
        assert!(!toast.is_expired(toast.created_at + Duration::seconds(2)));
        assert!(toast.is_expired(toast.created_at + Duration::seconds(3)));
    }
}
