//! Persistent cache storage on the local filesystem
//!
//! # Layout
//!
//! ```text
//! <root>/caches.json             store names in creation order
//! <root>/<dir>/index.json        request key -> entry metadata
//! <root>/<dir>/<sha256>.body     response body, named by key hash
//! ```
//!
//! Files are replaced by writing a temporary sibling and renaming it over
//! the target, so a crash mid-write never leaves a torn index.

use crate::cache::storage::CacheStorage;
use crate::error::{SwError, SwResult};
use crate::fetch::{Method, Request, Response};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

const MANIFEST_FILE: &str = "caches.json";
const INDEX_FILE: &str = "index.json";

/// One store in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestEntry {
    name: String,
    dir: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    caches: Vec<ManifestEntry>,
}

/// Stored response metadata; the body lives in its own file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase
    pub status_text: String,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Body file name within the store directory
    pub body_file: String,
    /// Body length in bytes
    pub size: u64,
    /// When the entry was written
    pub stored_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Index {
    entries: BTreeMap<String, EntryMeta>,
}

/// Cache storage persisted under a root directory
pub struct DiskStorage {
    root: PathBuf,
    // Serialises manifest and index read-modify-write cycles
    lock: Mutex<()>,
}

impl DiskStorage {
    /// Open (creating if needed) a storage rooted at `root`
    pub async fn open_at(root: impl Into<PathBuf>) -> SwResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| SwError::io(format!("creating cache root {}", root.display()), e))?;
        Ok(Self {
            root,
            lock: Mutex::new(()),
        })
    }

    /// The storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Metadata for every entry of a store, keyed by request key
    pub async fn entry_metadata(&self, name: &str) -> SwResult<BTreeMap<String, EntryMeta>> {
        let _guard = self.lock.lock().await;
        let entry = self
            .find(name)
            .await?
            .ok_or_else(|| SwError::CacheNotFound(name.to_string()))?;
        Ok(self.load_index(&entry).await?.entries)
    }

    /// Total size of stored bodies for a store
    pub async fn size_of(&self, name: &str) -> SwResult<u64> {
        Ok(self
            .entry_metadata(name)
            .await?
            .values()
            .map(|meta| meta.size)
            .sum())
    }

    fn dir_name(name: &str) -> String {
        let digest = Sha256::digest(name.as_bytes());
        hex::encode(&digest[..8])
    }

    fn body_file_name(key: &str) -> String {
        format!("{}.body", hex::encode(Sha256::digest(key.as_bytes())))
    }

    fn manifest_path(&self) -> PathBuf {
        self.root.join(MANIFEST_FILE)
    }

    fn store_dir(&self, entry: &ManifestEntry) -> PathBuf {
        self.root.join(&entry.dir)
    }

    async fn load_json<T: DeserializeOwned + Default>(path: &Path, owner: &str) -> SwResult<T> {
        if !path.exists() {
            return Ok(T::default());
        }
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| SwError::io(format!("reading {}", path.display()), e))?;
        serde_json::from_str(&content).map_err(|e| SwError::CacheCorrupt {
            name: owner.to_string(),
            reason: e.to_string(),
        })
    }

    async fn write_atomic(path: &Path, contents: &[u8]) -> SwResult<()> {
        let tmp = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, contents)
            .await
            .map_err(|e| SwError::io(format!("writing {}", tmp.display()), e))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| SwError::io(format!("replacing {}", path.display()), e))
    }

    async fn load_manifest(&self) -> SwResult<Manifest> {
        Self::load_json(&self.manifest_path(), MANIFEST_FILE).await
    }

    async fn save_manifest(&self, manifest: &Manifest) -> SwResult<()> {
        let content = serde_json::to_vec_pretty(manifest)?;
        Self::write_atomic(&self.manifest_path(), &content).await
    }

    async fn load_index(&self, entry: &ManifestEntry) -> SwResult<Index> {
        Self::load_json(&self.store_dir(entry).join(INDEX_FILE), &entry.name).await
    }

    async fn save_index(&self, entry: &ManifestEntry, index: &Index) -> SwResult<()> {
        let content = serde_json::to_vec_pretty(index)?;
        Self::write_atomic(&self.store_dir(entry).join(INDEX_FILE), &content).await
    }

    async fn find(&self, name: &str) -> SwResult<Option<ManifestEntry>> {
        Ok(self
            .load_manifest()
            .await?
            .caches
            .into_iter()
            .find(|c| c.name == name))
    }

    /// Find or create a store; caller must hold the lock
    async fn ensure(&self, name: &str) -> SwResult<ManifestEntry> {
        let mut manifest = self.load_manifest().await?;
        if let Some(entry) = manifest.caches.iter().find(|c| c.name == name) {
            return Ok(entry.clone());
        }

        let entry = ManifestEntry {
            name: name.to_string(),
            dir: Self::dir_name(name),
            created_at: Utc::now(),
        };
        let dir = self.store_dir(&entry);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| SwError::io(format!("creating cache dir {}", dir.display()), e))?;
        manifest.caches.push(entry.clone());
        self.save_manifest(&manifest).await?;
        debug!("Created cache {} at {}", name, dir.display());
        Ok(entry)
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, name: &str) -> SwResult<()> {
        let _guard = self.lock.lock().await;
        self.ensure(name).await.map(|_| ())
    }

    async fn has(&self, name: &str) -> SwResult<bool> {
        let _guard = self.lock.lock().await;
        Ok(self.find(name).await?.is_some())
    }

    async fn keys(&self) -> SwResult<Vec<String>> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load_manifest()
            .await?
            .caches
            .into_iter()
            .map(|c| c.name)
            .collect())
    }

    async fn delete(&self, name: &str) -> SwResult<bool> {
        let _guard = self.lock.lock().await;
        let mut manifest = self.load_manifest().await?;
        let Some(position) = manifest.caches.iter().position(|c| c.name == name) else {
            return Ok(false);
        };

        let entry = manifest.caches.remove(position);
        self.save_manifest(&manifest).await?;

        let dir = self.store_dir(&entry);
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| SwError::io(format!("removing cache dir {}", dir.display()), e))?;
        }
        debug!("Deleted cache {}", name);
        Ok(true)
    }

    async fn put(&self, name: &str, request: &Request, response: &Response) -> SwResult<()> {
        let key = request.cache_key();
        if request.method != Method::Get {
            return Err(SwError::CacheWrite {
                name: name.to_string(),
                key,
                reason: format!("{} requests cannot be cached", request.method),
            });
        }

        let _guard = self.lock.lock().await;
        let entry = self.ensure(name).await?;
        let body_file = Self::body_file_name(&key);
        Self::write_atomic(&self.store_dir(&entry).join(&body_file), &response.body).await?;

        let mut index = self.load_index(&entry).await?;
        index.entries.insert(
            key,
            EntryMeta {
                status: response.status,
                status_text: response.status_text.clone(),
                headers: response.headers.clone(),
                body_file,
                size: response.body.len() as u64,
                stored_at: Utc::now(),
            },
        );
        self.save_index(&entry, &index).await
    }

    async fn match_in(&self, name: &str, request: &Request) -> SwResult<Option<Response>> {
        if request.method != Method::Get {
            return Ok(None);
        }

        let _guard = self.lock.lock().await;
        let Some(entry) = self.find(name).await? else {
            return Ok(None);
        };
        let index = self.load_index(&entry).await?;
        let Some(meta) = index.entries.get(&request.cache_key()) else {
            return Ok(None);
        };

        let body_path = self.store_dir(&entry).join(&meta.body_file);
        let body = fs::read(&body_path).await.map_err(|e| SwError::CacheCorrupt {
            name: name.to_string(),
            reason: format!("missing body {}: {}", body_path.display(), e),
        })?;

        Ok(Some(Response {
            status: meta.status,
            status_text: meta.status_text.clone(),
            headers: meta.headers.clone(),
            body: body.into(),
        }))
    }

    async fn entries(&self, name: &str) -> SwResult<Vec<String>> {
        Ok(self.entry_metadata(name).await?.into_keys().collect())
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}
