//! Request key generation for cache entries.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content-addressed key for one request inside a cache version.
///
/// Derived from the upper-cased method and the canonical URL, so
/// `get` and `GET` for the same URL share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey(String);

impl RequestKey {
    /// Compute the key for a method and canonical URL.
    pub fn new(method: &str, url: &str) -> Self {
        Self(compute_request_key(method, url))
    }

    /// Wrap an already computed hex digest.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash a method and URL into a hex request key.
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
