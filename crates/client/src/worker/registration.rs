//! Registration: which generation currently controls intercepted requests.

use std::sync::Arc;

use shellcache_core::{CacheStore, CacheVersion, Error};
use tokio::sync::{Mutex, RwLock};

use super::{LifecycleEvent, Served, Worker};
use crate::request::InterceptedRequest;

/// Outcome of dispatching one intercepted request.
#[derive(Debug)]
pub enum Dispatch {
    /// The active generation produced a response.
    Handled(Served),
    /// No generation is active; the host should fetch the request itself.
    PassThrough,
}

/// Holds the active worker generation and serializes lifecycle changes.
#[derive(Default)]
pub struct Registration {
    active: RwLock<Option<Arc<Worker>>>,
    lifecycle: Mutex<()>,
}

impl Registration {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn active(&self) -> Option<Arc<Worker>> {
        self.active.read().await.clone()
    }

    /// Install `worker` and, because installs always skip waiting, activate it right away.
    ///
    /// If install fails the current generation stays active and the error is returned.
    pub async fn register(&self, worker: Arc<Worker>) -> Result<Vec<LifecycleEvent>, Error> {
        let _guard = self.lifecycle.lock().await;

        let installed = match worker.install().await {
            Ok(event) => event,
            Err(err) => {
                if let Some(current) = self.active().await {
                    tracing::warn!(
                        version = %worker.version(),
                        active = %current.version(),
                        "install failed, previous generation stays active"
                    );
                }
                return Err(err);
            }
        };

        let activated = self.promote(worker).await?;
        Ok(vec![installed, activated])
    }

    /// Activate a generation whose version a previous run already installed.
    pub async fn resume(&self, worker: Arc<Worker>) -> Result<Vec<LifecycleEvent>, Error> {
        let _guard = self.lifecycle.lock().await;
        worker.resume().await?;
        let activated = self.promote(worker).await?;
        Ok(vec![activated])
    }

    async fn promote(&self, worker: Arc<Worker>) -> Result<LifecycleEvent, Error> {
        let activated = worker.activate().await?;
        let previous = self.active.write().await.replace(worker);
        if let Some(previous) = previous {
            previous.retire().await;
            tracing::debug!(worker = previous.id(), version = %previous.version(), "generation retired");
        }
        Ok(activated)
    }

    /// Delete a stored version that no generation controls.
    ///
    /// Runs under the lifecycle lock so a concurrent `register` cannot promote
    /// `version` between the check and the delete. Returns how many entries
    /// the version held.
    pub async fn purge_inactive(&self, store: &dyn CacheStore, version: &CacheVersion) -> Result<u64, Error> {
        let _guard = self.lifecycle.lock().await;

        if let Some(active) = self.active().await
            && active.version() == version
        {
            return Err(Error::InvalidInput(format!("{version} is the active cache version")));
        }

        let entries = store
            .describe()
            .await?
            .into_iter()
            .find(|info| info.name == version.as_str())
            .map(|info| info.entries)
            .ok_or_else(|| Error::CacheMiss(version.to_string()))?;

        store.delete_version(version).await?;
        tracing::info!(version = %version, entries, "cache version purged");
        Ok(entries)
    }

    /// Route a request to the active generation, or signal pass-through.
    pub async fn dispatch(&self, request: &InterceptedRequest) -> Result<Dispatch, Error> {
        let Some(worker) = self.active().await else {
            tracing::debug!("no active generation, passing {} through", request.url);
            return Ok(Dispatch::PassThrough);
        };

        worker.handle_fetch(request).await.map(Dispatch::Handled)
    }
}
