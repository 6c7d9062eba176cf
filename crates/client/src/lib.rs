//! Request-handling runtime for shellcache.
//!
//! This crate provides the network fetcher, request classification, and the
//! worker generations that serve intercepted requests from the versioned
//! cache (cache-first for assets, network-first with an offline fallback
//! for navigations).

pub mod fetch;
pub mod request;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use fetch::{FetchConfig, Fetcher, HttpFetcher};
pub use request::{InterceptedRequest, RequestClass, RequestMode};
pub use worker::{
    AssetManifest, CacheManager, Dispatch, LifecycleEvent, NavigationResolver, Registration, ResponseSource, Served,
    Worker, WorkerState,
};
