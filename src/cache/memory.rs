//! In-memory cache storage

use crate::cache::storage::CacheStorage;
use crate::error::{SwError, SwResult};
use crate::fetch::{Method, Request, Response};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct NamedCache {
    name: String,
    entries: HashMap<String, Response>,
}

/// Cache storage held entirely in memory
///
/// Stores are kept in a vector so `keys()` reports creation order.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    caches: RwLock<Vec<NamedCache>>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> SwResult<()> {
        let mut caches = self.caches.write().await;
        if !caches.iter().any(|c| c.name == name) {
            caches.push(NamedCache {
                name: name.to_string(),
                entries: HashMap::new(),
            });
        }
        Ok(())
    }

    async fn has(&self, name: &str) -> SwResult<bool> {
        Ok(self.caches.read().await.iter().any(|c| c.name == name))
    }

    async fn keys(&self) -> SwResult<Vec<String>> {
        Ok(self
            .caches
            .read()
            .await
            .iter()
            .map(|c| c.name.clone())
            .collect())
    }

    async fn delete(&self, name: &str) -> SwResult<bool> {
        let mut caches = self.caches.write().await;
        let before = caches.len();
        caches.retain(|c| c.name != name);
        Ok(caches.len() != before)
    }

    async fn put(&self, name: &str, request: &Request, response: &Response) -> SwResult<()> {
        if request.method != Method::Get {
            return Err(SwError::CacheWrite {
                name: name.to_string(),
                key: request.cache_key(),
                reason: format!("{} requests cannot be cached", request.method),
            });
        }

        let mut caches = self.caches.write().await;
        let index = match caches.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                caches.push(NamedCache {
                    name: name.to_string(),
                    entries: HashMap::new(),
                });
                caches.len() - 1
            }
        };
        caches[index]
            .entries
            .insert(request.cache_key(), response.clone());
        Ok(())
    }

    async fn match_in(&self, name: &str, request: &Request) -> SwResult<Option<Response>> {
        if request.method != Method::Get {
            return Ok(None);
        }
        let key = request.cache_key();
        Ok(self
            .caches
            .read()
            .await
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.entries.get(&key).cloned()))
    }

    async fn entries(&self, name: &str) -> SwResult<Vec<String>> {
        let caches = self.caches.read().await;
        let cache = caches
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SwError::CacheNotFound(name.to_string()))?;
        let mut keys: Vec<String> = cache.entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request(path: &str) -> Request {
        Request::parse(path, &Url::parse("http://localhost:8080/").unwrap()).unwrap()
    }

    #[tokio::test]
    async fn keys_in_creation_order() {
        let storage = MemoryStorage::new();
        storage.open("b").await.unwrap();
        storage.open("a").await.unwrap();
        storage.open("b").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn put_then_match() {
        let storage = MemoryStorage::new();
        storage
            .put("static-v1", &request("/a"), &Response::ok("A"))
            .await
            .unwrap();

        let hit = storage.match_in("static-v1", &request("/a")).await.unwrap();
        assert_eq!(hit.unwrap().body, "A");
        assert!(storage
            .match_in("static-v1", &request("/b"))
            .await
            .unwrap()
            .is_none());
        assert!(storage.has("static-v1").await.unwrap());
    }

    #[tokio::test]
    async fn put_replaces_entry() {
        let storage = MemoryStorage::new();
        storage.put("c", &request("/a"), &Response::ok("old")).await.unwrap();
        storage.put("c", &request("/a"), &Response::ok("new")).await.unwrap();

        assert_eq!(storage.entries("c").await.unwrap().len(), 1);
        let hit = storage.match_in("c", &request("/a")).await.unwrap().unwrap();
        assert_eq!(hit.body, "new");
    }

    #[tokio::test]
    async fn put_rejects_non_get() {
        let storage = MemoryStorage::new();
        let post = request("/form").with_method(Method::Post);
        assert!(storage.put("c", &post, &Response::ok("")).await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_store() {
        let storage = MemoryStorage::new();
        storage.open("static-v1").await.unwrap();
        assert!(storage.delete("static-v1").await.unwrap());
        assert!(!storage.delete("static-v1").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn match_first_respects_order() {
        let storage = MemoryStorage::new();
        storage.put("one", &request("/a"), &Response::ok("1")).await.unwrap();
        storage.put("two", &request("/a"), &Response::ok("2")).await.unwrap();

        let order = vec!["two".to_string(), "one".to_string()];
        let (name, response) = storage
            .match_first(&order, &request("/a"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(name, "two");
        assert_eq!(response.body, "2");
    }

    #[tokio::test]
    async fn entries_of_missing_store_fails() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.entries("nope").await,
            Err(SwError::CacheNotFound(_))
        ));
    }
}
