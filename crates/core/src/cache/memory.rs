//! In-memory cache store.
//!
//! Uses a HashMap per version with a tokio RwLock for concurrent access.
//! Contents are lost when the process exits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{CacheStore, CacheVersion, CachedResponse, RequestKey, VersionInfo};
use crate::Error;

#[derive(Debug)]
struct VersionSlot {
    ready: bool,
    created_at: String,
    entries: HashMap<RequestKey, CachedResponse>,
}

impl VersionSlot {
    fn new() -> Self {
        Self { ready: false, created_at: chrono::Utc::now().to_rfc3339(), entries: HashMap::new() }
    }
}

/// Process-local [`CacheStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    versions: Arc<RwLock<HashMap<CacheVersion, VersionSlot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, version: &CacheVersion) -> Result<(), Error> {
        let mut versions = self.versions.write().await;
        versions.entry(version.clone()).or_insert_with(VersionSlot::new);
        Ok(())
    }

    async fn get(&self, version: &CacheVersion, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        let versions = self.versions.read().await;
        Ok(versions.get(version).and_then(|slot| slot.entries.get(key)).cloned())
    }

    async fn put(&self, version: &CacheVersion, key: &RequestKey, response: &CachedResponse) -> Result<(), Error> {
        let mut versions = self.versions.write().await;
        let slot = versions
            .get_mut(version)
            .ok_or_else(|| Error::CacheMiss(version.to_string()))?;
        slot.entries.insert(key.clone(), response.clone());
        Ok(())
    }

    async fn put_all(&self, version: &CacheVersion, entries: Vec<(RequestKey, CachedResponse)>) -> Result<(), Error> {
        let mut versions = self.versions.write().await;
        let slot = versions.entry(version.clone()).or_insert_with(VersionSlot::new);
        slot.entries.extend(entries);
        slot.ready = true;
        Ok(())
    }

    async fn delete(&self, version: &CacheVersion, key: &RequestKey) -> Result<bool, Error> {
        let mut versions = self.versions.write().await;
        Ok(versions
            .get_mut(version)
            .is_some_and(|slot| slot.entries.remove(key).is_some()))
    }

    async fn list_versions(&self) -> Result<Vec<CacheVersion>, Error> {
        let versions = self.versions.read().await;
        let mut names: Vec<CacheVersion> = versions.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete_version(&self, version: &CacheVersion) -> Result<bool, Error> {
        let mut versions = self.versions.write().await;
        Ok(versions.remove(version).is_some())
    }

    async fn is_ready(&self, version: &CacheVersion) -> Result<bool, Error> {
        let versions = self.versions.read().await;
        Ok(versions.get(version).is_some_and(|slot| slot.ready))
    }

    async fn describe(&self) -> Result<Vec<VersionInfo>, Error> {
        let versions = self.versions.read().await;
        let mut infos: Vec<VersionInfo> = versions
            .iter()
            .map(|(name, slot)| VersionInfo {
                name: name.to_string(),
                ready: slot.ready,
                entries: slot.entries.len() as u64,
                created_at: slot.created_at.clone(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(name: &str) -> CacheVersion {
        CacheVersion::new(name).unwrap()
    }

    fn entry(url: &str) -> (RequestKey, CachedResponse) {
        (RequestKey::new("GET", url), CachedResponse::new(url, 200, url.as_bytes()))
    }

    #[tokio::test]
    async fn test_put_requires_open_version() {
        let store = MemoryStore::new();
        let v1 = version("v1");
        let (key, response) = entry("http://localhost:8080/a.css");

        let result = store.put(&v1, &key, &response).await;
        assert!(matches!(result, Err(Error::CacheMiss(_))));

        store.open(&v1).await.unwrap();
        store.put(&v1, &key, &response).await.unwrap();
        assert_eq!(store.get(&v1, &key).await.unwrap(), Some(response));
    }

    #[tokio::test]
    async fn test_open_does_not_mark_ready() {
        let store = MemoryStore::new();
        let v1 = version("v1");
        store.open(&v1).await.unwrap();
        assert!(!store.is_ready(&v1).await.unwrap());

        store.put_all(&v1, vec![entry("http://localhost:8080/a.css")]).await.unwrap();
        assert!(store.is_ready(&v1).await.unwrap());
    }

    #[tokio::test]
    async fn test_versions_are_isolated() {
        let store = MemoryStore::new();
        let (v1, v2) = (version("v1"), version("v2"));
        let (key, response) = entry("http://localhost:8080/a.css");

        store.put_all(&v1, vec![(key.clone(), response)]).await.unwrap();
        store.open(&v2).await.unwrap();

        assert!(store.get(&v1, &key).await.unwrap().is_some());
        assert!(store.get(&v2, &key).await.unwrap().is_none());
        assert_eq!(store.list_versions().await.unwrap(), vec![v1.clone(), v2]);

        assert!(store.delete_version(&v1).await.unwrap());
        assert!(!store.delete_version(&v1).await.unwrap());
        assert!(store.get(&v1, &key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let store = MemoryStore::new();
        let v1 = version("v1");
        let (key, response) = entry("http://localhost:8080/a.css");
        store.put_all(&v1, vec![(key.clone(), response)]).await.unwrap();

        assert!(store.delete(&v1, &key).await.unwrap());
        assert!(!store.delete(&v1, &key).await.unwrap());

        let info = store.describe().await.unwrap();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].entries, 0);
        assert!(info[0].ready);
    }
}
