//! Cache naming and version tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag identifying the current generation of cached assets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheVersion(String);

impl CacheVersion {
    /// Create a version tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The raw tag
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheVersion {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Role of a cache store within one version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheRole {
    /// Pre-populated at install time
    Static,
    /// Grows as live traffic succeeds
    Dynamic,
}

impl fmt::Display for CacheRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Derives store names for one version and classifies existing stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    prefix: String,
    version: CacheVersion,
}

impl CacheNames {
    /// Create a namer; an empty prefix yields `{role}-{version}` names
    pub fn new(prefix: impl Into<String>, version: CacheVersion) -> Self {
        Self {
            prefix: prefix.into(),
            version,
        }
    }

    /// The current version
    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    /// Name of the store for `role` in the current version
    pub fn name_for(&self, role: CacheRole) -> String {
        if self.prefix.is_empty() {
            format!("{}-{}", role, self.version)
        } else {
            format!("{}-{}-{}", self.prefix, role, self.version)
        }
    }

    /// Name of the current static store
    pub fn static_name(&self) -> String {
        self.name_for(CacheRole::Static)
    }

    /// Name of the current dynamic store
    pub fn dynamic_name(&self) -> String {
        self.name_for(CacheRole::Dynamic)
    }

    /// A store is current when its name embeds the current version
    pub fn is_current(&self, name: &str) -> bool {
        name.contains(self.version.as_str())
    }

    /// Stores from other versions, eligible for deletion
    pub fn stale<'a>(&self, names: &'a [String]) -> Vec<&'a String> {
        names.iter().filter(|n| !self.is_current(n)).collect()
    }
}
