//! Shared runtime state handed to every tool call.

use std::sync::Arc;

use shellcache_client::{FetchConfig, Fetcher, HttpFetcher, LifecycleEvent, Registration, Worker};
use shellcache_core::{AppConfig, CacheDb, CacheStore, Error, MemoryStore, StoreBackend};

/// Store, fetcher, and registration for one server process.
#[derive(Clone)]
pub struct ShellContext {
    pub config: AppConfig,
    pub store: Arc<dyn CacheStore>,
    pub fetcher: Arc<dyn Fetcher>,
    pub registration: Arc<Registration>,
}

impl ShellContext {
    pub fn new(config: AppConfig, store: Arc<dyn CacheStore>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { config, store, fetcher, registration: Arc::new(Registration::new()) }
    }

    /// Open the configured store backend and build the HTTP fetcher.
    pub async fn open(config: AppConfig) -> Result<Self, Error> {
        let store: Arc<dyn CacheStore> = match config.store {
            StoreBackend::Sqlite => Arc::new(CacheDb::open(&config.db_path).await?),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
        };
        let fetcher = Arc::new(HttpFetcher::new(FetchConfig::from(&config))?);
        Ok(Self::new(config, store, fetcher))
    }

    /// A fresh generation for `version`, or for the configured version when `None`.
    pub fn worker(&self, version: Option<&str>) -> Result<Arc<Worker>, Error> {
        let mut config = self.config.clone();
        if let Some(version) = version {
            config.cache_version = version.to_string();
        }
        let worker = Worker::from_config(&config, self.store.clone(), self.fetcher.clone())?;
        Ok(Arc::new(worker))
    }

    /// Bring the configured generation up at startup.
    ///
    /// A version already installed by a previous run is resumed without
    /// touching the network; otherwise it is installed from scratch.
    pub async fn start(&self) -> Result<Vec<LifecycleEvent>, Error> {
        match self.registration.resume(self.worker(None)?).await {
            Err(Error::CacheMiss(_)) => self.registration.register(self.worker(None)?).await,
            other => other,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// An origin serving the default shell assets plus one dynamic page.
    pub(crate) async fn shell_origin() -> MockServer {
        let server = MockServer::start().await;
        for asset in AppConfig::default().precache {
            Mock::given(method("GET"))
                .and(path(asset.clone()))
                .respond_with(ResponseTemplate::new(200).set_body_string(format!("asset {asset}")))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_string("live dashboard"))
            .mount(&server)
            .await;
        server
    }

    pub(crate) fn memory_context(origin: &str) -> ShellContext {
        let config = AppConfig { origin: origin.to_string(), store: StoreBackend::Memory, ..Default::default() };
        let fetcher = Arc::new(HttpFetcher::new(FetchConfig::from(&config)).unwrap());
        ShellContext::new(config, Arc::new(MemoryStore::new()), fetcher)
    }

    #[tokio::test]
    async fn test_start_installs_then_resumes() {
        let server = shell_origin().await;
        let context = memory_context(&server.uri());

        let events = context.start().await.unwrap();
        assert!(matches!(events[0], LifecycleEvent::InstallComplete { cached: 6, .. }));

        // Same store, new process: the installed version is adopted as-is.
        let restarted = ShellContext::new(context.config.clone(), context.store.clone(), context.fetcher.clone());
        let events = restarted.start().await.unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], LifecycleEvent::ActivateComplete { .. }));
    }

    #[tokio::test]
    async fn test_start_fails_when_origin_unreachable() {
        let context = memory_context("http://127.0.0.1:1");
        let err = context.start().await.unwrap_err();
        assert!(matches!(err, Error::InstallFailed { .. }));
        assert!(context.registration.active().await.is_none());
    }

    #[tokio::test]
    async fn test_worker_version_override() {
        let context = memory_context("http://localhost:8080");
        assert_eq!(context.worker(None).unwrap().version().as_str(), "shell-v1");
        assert_eq!(context.worker(Some("shell-v2")).unwrap().version().as_str(), "shell-v2");
        assert!(matches!(context.worker(Some("bad name")), Err(Error::InvalidInput(_))));
    }
}
