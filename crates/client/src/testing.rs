//! Test doubles shared by the worker tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shellcache_core::{CachedResponse, Error};
use tokio::sync::RwLock;

use crate::fetch::Fetcher;
use crate::request::InterceptedRequest;

/// Scripted [`Fetcher`] that counts network calls.
///
/// Unknown URLs answer 404, like a real origin would.
#[derive(Clone, Default)]
pub(crate) struct StubFetcher {
    routes: Arc<RwLock<HashMap<String, CachedResponse>>>,
    failing: Arc<RwLock<Vec<String>>>,
    offline: Arc<AtomicBool>,
    delay: Arc<RwLock<Option<Duration>>>,
    calls: Arc<AtomicUsize>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn serve(&self, url: &str, status: u16, body: &str) {
        let response = CachedResponse::new(url, status, body).with_header("content-type", "text/html");
        self.routes.write().await.insert(url.to_string(), response);
    }

    /// Make every request to `url` fail at the transport level.
    pub(crate) async fn fail(&self, url: &str) {
        self.failing.write().await.push(url.to_string());
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<CachedResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let url = request.url.as_str();
        if self.offline.load(Ordering::SeqCst) || self.failing.read().await.iter().any(|u| u == url) {
            return Err(Error::Network(format!("{url}: connection refused")));
        }

        let routes = self.routes.read().await;
        Ok(routes
            .get(url)
            .cloned()
            .unwrap_or_else(|| CachedResponse::new(url, 404, "not found")))
    }
}
