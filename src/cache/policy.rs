//! Lookup precedence and offline fallback policy

use crate::cache::names::CacheNames;
use serde::{Deserialize, Serialize};

/// Order in which stores are consulted on a cache match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupOrder {
    /// Every store in creation order (the platform's `caches.match`)
    #[default]
    CreationOrder,
    /// Current static store, then current dynamic store, then the rest
    StaticFirst,
    /// Current dynamic store, then current static store, then the rest
    DynamicFirst,
}

impl LookupOrder {
    /// Arrange `existing` store names into lookup order
    pub fn arrange(&self, names: &CacheNames, existing: Vec<String>) -> Vec<String> {
        let (first, second) = match self {
            Self::CreationOrder => return existing,
            Self::StaticFirst => (names.static_name(), names.dynamic_name()),
            Self::DynamicFirst => (names.dynamic_name(), names.static_name()),
        };

        let mut ordered = Vec::with_capacity(existing.len());
        for preferred in [first, second] {
            if existing.contains(&preferred) {
                ordered.push(preferred);
            }
        }
        for name in existing {
            if !ordered.contains(&name) {
                ordered.push(name);
            }
        }
        ordered
    }
}

/// What an image request gets when the network fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFallback {
    /// Serve this cached placeholder path
    Placeholder(String),
    /// Answer with a synthetic response carrying this status
    Status(u16),
}

impl Default for ImageFallback {
    fn default() -> Self {
        Self::Placeholder("/icon-512x512.png".to_string())
    }
}

/// Fallback ladder used when a network fetch fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPolicy {
    /// Store precedence for cache matches
    pub lookup: LookupOrder,

    /// Cached page served to document requests (None = synthetic response)
    pub document_fallback: Option<String>,

    /// Image request fallback
    pub image_fallback: ImageFallback,

    /// Status of the synthetic offline response
    pub offline_status: u16,

    /// Body of the synthetic offline response
    pub offline_body: String,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            lookup: LookupOrder::CreationOrder,
            document_fallback: Some("/".to_string()),
            image_fallback: ImageFallback::default(),
            offline_status: 503,
            offline_body: "Offline - content not available".to_string(),
        }
    }
}
