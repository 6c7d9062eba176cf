//! Cache store capability shared by the cache manager and navigation resolver.

use async_trait::async_trait;

use super::{CacheVersion, CachedResponse, RequestKey, VersionInfo};
use crate::Error;

/// Thread-safe, versioned key-value store for cached responses.
///
/// Implementations must make each call atomic; concurrent handlers share one
/// store through `Arc<dyn CacheStore>` without extra locking.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the store for `version` if it does not exist. Never marks it ready.
    async fn open(&self, version: &CacheVersion) -> Result<(), Error>;

    /// Look up an entry. Returns `None` when the version or the key is absent.
    async fn get(&self, version: &CacheVersion, key: &RequestKey) -> Result<Option<CachedResponse>, Error>;

    /// Insert or replace a single entry. Fails with `CACHE_MISS` if the version was never opened.
    async fn put(&self, version: &CacheVersion, key: &RequestKey, response: &CachedResponse) -> Result<(), Error>;

    /// Write every entry and mark the version ready, all or nothing.
    ///
    /// Creates the version if it was not opened first.
    async fn put_all(&self, version: &CacheVersion, entries: Vec<(RequestKey, CachedResponse)>) -> Result<(), Error>;

    /// Remove one entry. Returns whether it existed.
    async fn delete(&self, version: &CacheVersion, key: &RequestKey) -> Result<bool, Error>;

    /// Names of every stored version, sorted.
    async fn list_versions(&self) -> Result<Vec<CacheVersion>, Error>;

    /// Drop a version and all of its entries. Returns whether it existed.
    async fn delete_version(&self, version: &CacheVersion) -> Result<bool, Error>;

    /// Whether `put_all` has completed for this version.
    async fn is_ready(&self, version: &CacheVersion) -> Result<bool, Error>;

    /// Per-version summaries for status reporting.
    async fn describe(&self) -> Result<Vec<VersionInfo>, Error>;
}
