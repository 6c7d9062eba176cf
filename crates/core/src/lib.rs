//! Core types and shared functionality for shellcache.
//!
//! This crate provides:
//! - Versioned cache store abstraction with SQLite and in-memory backends
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CacheStore, CacheVersion, CachedResponse, MemoryStore, RequestKey, VersionInfo};
pub use config::{AppConfig, ConfigError, StoreBackend};
pub use error::Error;
