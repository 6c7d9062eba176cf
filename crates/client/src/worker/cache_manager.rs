//! Cache manager: versioned precache lifecycle and the cache-first asset strategy.

use std::sync::Arc;

use futures_util::future::try_join_all;
use shellcache_core::{CacheStore, CacheVersion, CachedResponse, Error, RequestKey};

use super::manifest::AssetManifest;
use super::{ResponseSource, Served};
use crate::fetch::Fetcher;
use crate::request::{InterceptedRequest, RequestMode};

/// Owns one named cache version and serves non-navigation requests from it.
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    version: CacheVersion,
    manifest: AssetManifest,
}

impl CacheManager {
    pub fn new(
        store: Arc<dyn CacheStore>, fetcher: Arc<dyn Fetcher>, version: CacheVersion, manifest: AssetManifest,
    ) -> Self {
        Self { store, fetcher, version, manifest }
    }

    pub fn version(&self) -> &CacheVersion {
        &self.version
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// Populate the current version with every manifest asset.
    ///
    /// All manifest URLs are fetched concurrently; a transport failure or a
    /// non-2xx status on any of them aborts the install before anything is
    /// written. On success the whole set is committed and the version marked
    /// ready in one store call. Returns the number of cached entries.
    pub async fn install(&self) -> Result<usize, Error> {
        self.store.open(&self.version).await?;

        let fetches = self.manifest.urls().iter().map(|url| async move {
            let request = InterceptedRequest::from_url(url.clone(), RequestMode::NoCors);
            let failed = |reason: String| Error::InstallFailed {
                version: self.version.to_string(),
                url: url.to_string(),
                reason,
            };

            let response = self.fetcher.fetch(&request).await.map_err(|e| failed(e.to_string()))?;
            if !response.is_ok() {
                return Err(failed(format!("status {}", response.status)));
            }
            Ok::<_, Error>((request.cache_key(), response))
        });

        let entries = try_join_all(fetches).await?;
        let cached = entries.len();
        self.store.put_all(&self.version, entries).await?;

        Ok(cached)
    }

    /// Delete every stored version except the current one.
    ///
    /// Returns the names that were purged.
    pub async fn activate(&self) -> Result<Vec<CacheVersion>, Error> {
        let mut purged = Vec::new();
        for name in self.store.list_versions().await? {
            if name == self.version {
                continue;
            }
            if self.store.delete_version(&name).await? {
                tracing::debug!(version = %name, "purged stale cache version");
                purged.push(name);
            }
        }
        Ok(purged)
    }

    /// Whether the current version holds a committed manifest set.
    pub async fn is_ready(&self) -> Result<bool, Error> {
        self.store.is_ready(&self.version).await
    }

    pub async fn lookup(&self, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        self.store.get(&self.version, key).await
    }

    /// Cache-first strategy for sub-resource requests.
    ///
    /// A cached entry always wins, even when the network is reachable. On a
    /// miss the network response is returned as-is and is not written back,
    /// so later identical requests miss again. Network failures propagate.
    pub async fn handle_generic_fetch(&self, request: &InterceptedRequest) -> Result<Served, Error> {
        if let Some(response) = self.lookup(&request.cache_key()).await? {
            tracing::debug!("cache hit for {}", request.url);
            return Ok(Served { response, source: ResponseSource::Cache });
        }

        tracing::debug!("cache miss for {}, going to network", request.url);
        let response = self.fetcher.fetch(request).await?;
        Ok(Served { response, source: ResponseSource::Network })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubFetcher;
    use shellcache_core::{CacheDb, MemoryStore};
    use url::Url;

    const ORIGIN: &str = "http://localhost:8080";

    fn manifest(assets: &[&str]) -> AssetManifest {
        AssetManifest::new(&Url::parse(ORIGIN).unwrap(), "/offline.html", assets).unwrap()
    }

    fn version(name: &str) -> CacheVersion {
        CacheVersion::new(name).unwrap()
    }

    async fn stub_with(paths: &[&str]) -> StubFetcher {
        let fetcher = StubFetcher::new();
        for path in paths {
            fetcher.serve(&format!("{ORIGIN}{path}"), 200, path).await;
        }
        fetcher
    }

    #[tokio::test]
    async fn test_install_caches_every_manifest_url() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = stub_with(&["/offline.html", "/css/style.css", "/js/app.js"]).await;
        let manager = CacheManager::new(
            store.clone(),
            Arc::new(fetcher),
            version("v1"),
            manifest(&["/css/style.css", "/js/app.js"]),
        );

        assert_eq!(manager.install().await.unwrap(), 3);
        assert!(manager.is_ready().await.unwrap());

        for url in manager.manifest().urls() {
            let key = RequestKey::new("GET", url.as_str());
            let cached = manager.lookup(&key).await.unwrap().unwrap();
            assert_eq!(cached.body, url.path().as_bytes());
        }
    }

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let store = Arc::new(CacheDb::open_in_memory().await.unwrap());
        let fetcher = stub_with(&["/offline.html", "/css/style.css"]).await;
        let manager =
            CacheManager::new(store.clone(), Arc::new(fetcher), version("v1"), manifest(&["/css/style.css"]));

        manager.install().await.unwrap();
        manager.install().await.unwrap();

        let info = store.describe().await.unwrap();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].entries, 2);
        assert!(info[0].ready);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = stub_with(&["/offline.html", "/css/style.css"]).await;
        fetcher.fail(&format!("{ORIGIN}/js/app.js")).await;
        let manager = CacheManager::new(
            store.clone(),
            Arc::new(fetcher),
            version("v1"),
            manifest(&["/css/style.css", "/js/app.js"]),
        );

        let err = manager.install().await.unwrap_err();
        assert!(matches!(&err, Error::InstallFailed { url, .. } if url.ends_with("/js/app.js")));
        assert!(!manager.is_ready().await.unwrap());

        let offline = RequestKey::new("GET", &format!("{ORIGIN}/offline.html"));
        assert!(manager.lookup(&offline).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_install_rejects_error_status() {
        let store = Arc::new(MemoryStore::new());
        // "/favicon.ico" is not served, so the stub answers 404.
        let fetcher = stub_with(&["/offline.html"]).await;
        let manager = CacheManager::new(store, Arc::new(fetcher), version("v1"), manifest(&["/favicon.ico"]));

        let err = manager.install().await.unwrap_err();
        assert!(matches!(&err, Error::InstallFailed { reason, .. } if reason == "status 404"));
        assert!(!manager.is_ready().await.unwrap());
    }

    #[tokio::test]
    async fn test_activate_purges_all_other_versions() {
        let store = Arc::new(MemoryStore::new());
        for name in ["v0", "v1", "legacy-cache"] {
            store.open(&version(name)).await.unwrap();
        }
        let fetcher = stub_with(&["/offline.html"]).await;
        let manager = CacheManager::new(store.clone(), Arc::new(fetcher), version("v2"), manifest(&[]));
        manager.install().await.unwrap();

        let mut purged = manager.activate().await.unwrap();
        purged.sort();
        assert_eq!(purged, vec![version("legacy-cache"), version("v0"), version("v1")]);
        assert_eq!(store.list_versions().await.unwrap(), vec![version("v2")]);
    }

    #[tokio::test]
    async fn test_cache_hit_never_touches_network() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = stub_with(&["/offline.html", "/css/style.css"]).await;
        let manager =
            CacheManager::new(store, Arc::new(fetcher.clone()), version("v1"), manifest(&["/css/style.css"]));
        manager.install().await.unwrap();
        fetcher.reset_calls();

        // A newer copy on the network must not replace the cached one.
        fetcher.serve(&format!("{ORIGIN}/css/style.css"), 200, "body{color:red}").await;

        let request = InterceptedRequest::asset(&format!("{ORIGIN}/css/style.css")).unwrap();
        let served = manager.handle_generic_fetch(&request).await.unwrap();

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.body, b"/css/style.css");
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_miss_goes_to_network_without_write_back() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = stub_with(&["/offline.html", "/api/orders.json"]).await;
        let manager = CacheManager::new(store, Arc::new(fetcher.clone()), version("v1"), manifest(&[]));
        manager.install().await.unwrap();
        fetcher.reset_calls();

        let request = InterceptedRequest::asset(&format!("{ORIGIN}/api/orders.json")).unwrap();

        let first = manager.handle_generic_fetch(&request).await.unwrap();
        assert_eq!(first.source, ResponseSource::Network);
        assert_eq!(fetcher.calls(), 1);

        let second = manager.handle_generic_fetch(&request).await.unwrap();
        assert_eq!(second.source, ResponseSource::Network);
        assert_eq!(fetcher.calls(), 2);
        assert!(manager.lookup(&request.cache_key()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_miss_with_network_failure_propagates() {
        let store = Arc::new(MemoryStore::new());
        let fetcher = stub_with(&["/offline.html"]).await;
        let manager = CacheManager::new(store, Arc::new(fetcher.clone()), version("v1"), manifest(&[]));
        manager.install().await.unwrap();
        fetcher.set_offline(true);

        let request = InterceptedRequest::asset(&format!("{ORIGIN}/img/logo.png")).unwrap();
        let err = manager.handle_generic_fetch(&request).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
