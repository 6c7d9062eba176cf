//! Navigation fallback resolver.
//!
//! Top-level navigations always try the network first. Only a transport
//! failure substitutes the cached offline page; HTTP error statuses are
//! live responses and pass through untouched. A response over the body
//! limit surfaces as `FETCH_TOO_LARGE`.

use std::sync::Arc;
use std::time::Duration;

use shellcache_core::{CacheStore, CacheVersion, CachedResponse, Error, RequestKey};
use url::Url;

use super::{ResponseSource, Served};
use crate::fetch::Fetcher;
use crate::request::InterceptedRequest;

pub struct NavigationResolver {
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    version: CacheVersion,
    offline_page: Url,
    timeout: Option<Duration>,
}

impl NavigationResolver {
    pub fn new(store: Arc<dyn CacheStore>, fetcher: Arc<dyn Fetcher>, version: CacheVersion, offline_page: Url) -> Self {
        Self { store, fetcher, version, offline_page, timeout: None }
    }

    /// Bound the network attempt; an elapsed deadline counts as a network failure.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn offline_page(&self) -> &Url {
        &self.offline_page
    }

    pub async fn handle_navigation(&self, request: &InterceptedRequest) -> Result<Served, Error> {
        let err = match self.network(request).await {
            Ok(response) => return Ok(Served { response, source: ResponseSource::Network }),
            Err(err) if err.is_network_failure() => err,
            Err(err) => return Err(err),
        };

        tracing::warn!(
            url = %request.url,
            version = %self.version,
            error = %err,
            "navigation failed, serving offline page"
        );

        let key = RequestKey::new("GET", self.offline_page.as_str());
        match self.store.get(&self.version, &key).await? {
            Some(page) => Ok(Served { response: page, source: ResponseSource::OfflineFallback }),
            None => Err(Error::OfflinePageMissing(format!(
                "{} not cached in {} ({})",
                self.offline_page, self.version, err
            ))),
        }
    }

    async fn network(&self, request: &InterceptedRequest) -> Result<CachedResponse, Error> {
        match self.timeout {
            Some(deadline) => tokio::time::timeout(deadline, self.fetcher.fetch(request))
                .await
                .map_err(|_| Error::FetchTimeout(format!("{} after {:?}", request.url, deadline)))?,
            None => self.fetcher.fetch(request).await,
        }
    }
}
