//! swcache - offline-first cache manager
//!
//! Pre-caches an app's static assets into versioned caches, serves
//! requests cache-first with a network and offline fallback ladder, and
//! purges caches left behind by earlier versions.

pub mod bootstrap;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod platform;
pub mod ui;
pub mod worker;

pub use error::{SwError, SwResult};
