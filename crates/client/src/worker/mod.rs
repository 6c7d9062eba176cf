//! Worker generations: one cache version plus its install, activate, and fetch handlers.
//!
//! ```text
//! parsed ──install──▶ installing ──▶ installed ──activate──▶ activating ──▶ activated
//!                          │                                     │
//!                          └────────── failure ──▶ redundant ◀───┘
//! ```
//!
//! Once activated a worker routes every intercepted request by class:
//! navigations go network-first with an offline fallback, everything else
//! goes cache-first.

pub mod cache_manager;
pub mod manifest;
pub mod navigation;
pub mod registration;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{AppConfig, CacheStore, CacheVersion, CachedResponse, Error};
use tokio::sync::RwLock;

pub use cache_manager::CacheManager;
pub use manifest::AssetManifest;
pub use navigation::NavigationResolver;
pub use registration::{Dispatch, Registration};

use crate::fetch::Fetcher;
use crate::request::{InterceptedRequest, RequestClass};

/// Lifecycle state of a worker generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Replaced by a newer generation or failed its lifecycle.
    Redundant,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseSource {
    Cache,
    Network,
    OfflineFallback,
}

/// Terminal result of a handled request.
#[derive(Debug, Clone)]
pub struct Served {
    pub response: CachedResponse,
    pub source: ResponseSource,
}

/// Signals reported to the host when a lifecycle phase completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum LifecycleEvent {
    InstallComplete {
        version: CacheVersion,
        cached: usize,
        /// The host should activate this generation without waiting for old clients.
        skip_waiting: bool,
    },
    ActivateComplete {
        version: CacheVersion,
        purged: Vec<CacheVersion>,
        /// Open clients are controlled by this generation immediately.
        clients_claimed: bool,
    },
}

/// One generation of the offline shell.
pub struct Worker {
    id: u64,
    cache: CacheManager,
    navigation: NavigationResolver,
    state: RwLock<WorkerState>,
}

impl Worker {
    pub fn new(
        store: Arc<dyn CacheStore>, fetcher: Arc<dyn Fetcher>, version: CacheVersion, manifest: AssetManifest,
    ) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);

        let navigation =
            NavigationResolver::new(store.clone(), fetcher.clone(), version.clone(), manifest.offline_page().clone());
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
            cache: CacheManager::new(store, fetcher, version, manifest),
            navigation,
            state: RwLock::new(WorkerState::Parsed),
        }
    }

    /// Build the generation described by `config`.
    pub fn from_config(config: &AppConfig, store: Arc<dyn CacheStore>, fetcher: Arc<dyn Fetcher>) -> Result<Self, Error> {
        let version = CacheVersion::new(config.cache_version.clone())?;
        let manifest = AssetManifest::from_config(config)?;
        Ok(Self::new(store, fetcher, version, manifest).with_navigation_timeout(config.navigation_timeout()))
    }

    pub fn with_navigation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.navigation = self.navigation.with_timeout(timeout);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn version(&self) -> &CacheVersion {
        self.cache.version()
    }

    pub fn manifest(&self) -> &AssetManifest {
        self.cache.manifest()
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Move `from → to`, failing if the worker is not currently in `from`.
    async fn transition(&self, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::InvalidState { expected: from.to_string(), actual: state.to_string() });
        }
        *state = to;
        Ok(())
    }

    pub(crate) async fn retire(&self) {
        *self.state.write().await = WorkerState::Redundant;
    }

    /// Precache the manifest under this generation's version.
    ///
    /// On failure the worker becomes redundant; whatever generation was
    /// active before keeps serving.
    pub async fn install(&self) -> Result<LifecycleEvent, Error> {
        self.transition(WorkerState::Parsed, WorkerState::Installing).await?;

        match self.cache.install().await {
            Ok(cached) => {
                self.transition(WorkerState::Installing, WorkerState::Installed).await?;
                tracing::info!(worker = self.id, version = %self.version(), cached, "install complete");
                Ok(LifecycleEvent::InstallComplete { version: self.version().clone(), cached, skip_waiting: true })
            }
            Err(err) => {
                self.retire().await;
                tracing::warn!(worker = self.id, version = %self.version(), error = %err, "install failed");
                Err(err)
            }
        }
    }

    /// Adopt a version that a previous run already installed, without refetching.
    ///
    /// Fails with `CACHE_MISS` if the store holds no ready set for this version.
    pub async fn resume(&self) -> Result<(), Error> {
        if !self.cache.is_ready().await? {
            return Err(Error::CacheMiss(self.version().to_string()));
        }
        self.transition(WorkerState::Parsed, WorkerState::Installed).await?;
        tracing::info!(worker = self.id, version = %self.version(), "resumed installed cache version");
        Ok(())
    }

    /// Purge every other cache version and start controlling requests.
    pub async fn activate(&self) -> Result<LifecycleEvent, Error> {
        self.transition(WorkerState::Installed, WorkerState::Activating).await?;

        match self.cache.activate().await {
            Ok(purged) => {
                self.transition(WorkerState::Activating, WorkerState::Activated).await?;
                tracing::info!(
                    worker = self.id,
                    version = %self.version(),
                    purged = purged.len(),
                    "activate complete"
                );
                Ok(LifecycleEvent::ActivateComplete { version: self.version().clone(), purged, clients_claimed: true })
            }
            Err(err) => {
                self.retire().await;
                tracing::warn!(worker = self.id, version = %self.version(), error = %err, "activate failed");
                Err(err)
            }
        }
    }

    /// Produce exactly one response (or one error) for an intercepted request.
    pub async fn handle_fetch(&self, request: &InterceptedRequest) -> Result<Served, Error> {
        let state = self.state().await;
        if state != WorkerState::Activated {
            return Err(Error::InvalidState { expected: WorkerState::Activated.to_string(), actual: state.to_string() });
        }

        match request.class() {
            RequestClass::Navigation => self.navigation.handle_navigation(request).await,
            RequestClass::Asset => self.cache.handle_generic_fetch(request).await,
        }
    }
}
