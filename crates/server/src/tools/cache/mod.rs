//! Cache-related MCP tools.
//!
//! Read-only inspection and manual cleanup of stored cache versions.

pub mod get;
pub mod purge;

pub use get::{CacheGetParams, get_impl};
pub use purge::{CachePurgeParams, purge_impl};
