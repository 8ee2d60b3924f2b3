//! Cache storage abstraction
//!
//! Mirrors the platform cache API: a set of named stores, each mapping a
//! request key to a response. `put` and `match_in` are atomic units; no
//! transactions span several calls.

use crate::error::SwResult;
use crate::fetch::{Request, Response};
use async_trait::async_trait;

/// Abstract cache storage interface
///
/// Implemented in memory (tests, embedding) and on disk (CLI).
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named store if it doesn't exist
    async fn open(&self, name: &str) -> SwResult<()>;

    /// Whether the named store exists
    async fn has(&self, name: &str) -> SwResult<bool>;

    /// All store names in creation order
    async fn keys(&self) -> SwResult<Vec<String>>;

    /// Delete a store and all its entries; returns whether it existed
    async fn delete(&self, name: &str) -> SwResult<bool>;

    /// Store `response` under `request` in the named store, creating the
    /// store if needed. Replaces any existing entry for the same key.
    ///
    /// Only GET requests can be stored.
    async fn put(&self, name: &str, request: &Request, response: &Response) -> SwResult<()>;

    /// Look up `request` in one store
    async fn match_in(&self, name: &str, request: &Request) -> SwResult<Option<Response>>;

    /// Request keys held by the named store, sorted
    async fn entries(&self, name: &str) -> SwResult<Vec<String>>;

    /// Look up `request` in each of `names` in turn, returning the first hit
    async fn match_first(
        &self,
        names: &[String],
        request: &Request,
    ) -> SwResult<Option<(String, Response)>> {
        for name in names {
            if let Some(response) = self.match_in(name, request).await? {
                return Ok(Some((name.clone(), response)));
            }
        }
        Ok(None)
    }

    /// Human-readable backend name
    fn backend_name(&self) -> &'static str;
}
