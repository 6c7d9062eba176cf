//! Versioned cache store for the application shell.
//!
//! A cache store holds one named collection of request → response entries
//! per [`CacheVersion`]. Two backends implement [`CacheStore`]:
//!
//! - [`CacheDb`]: SQLite via tokio-rusqlite, WAL mode, automatic migrations
//! - [`MemoryStore`]: process-local map behind a tokio `RwLock`
//!
//! Both guarantee per-operation atomicity; `put_all` writes a whole
//! manifest set and marks the version ready in a single step.

pub mod connection;
pub mod entries;
pub mod entry;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use entry::{CacheVersion, CachedResponse, VersionInfo};
pub use hash::RequestKey;
pub use memory::MemoryStore;
pub use store::CacheStore;
