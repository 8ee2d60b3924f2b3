//! Versioned cache stores
//!
//! Two named stores exist per version: a static store filled eagerly at
//! install time and a dynamic store filled lazily by successful fetches.
//!
//! # Naming
//!
//! | Role | Name |
//! |------|------|
//! | Static | `{prefix}-static-{version}` |
//! | Dynamic | `{prefix}-dynamic-{version}` |
//!
//! Any store whose name does not contain the current version is stale and
//! is deleted on activation. There is no per-entry expiry.

pub mod disk;
pub mod memory;
pub mod names;
pub mod policy;
pub mod storage;

pub use disk::DiskStorage;
pub use memory::MemoryStorage;
pub use names::{CacheNames, CacheRole, CacheVersion};
pub use policy::{FallbackPolicy, ImageFallback, LookupOrder};
pub use storage::CacheStorage;
