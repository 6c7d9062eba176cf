//! Unified error types for shellcache.
//!
//! Every variant renders as `CODE: detail` and maps onto a JSON-RPC error
//! code when surfaced through the MCP server.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the shellcache runtime.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., unknown request mode).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure: DNS, connect, reset. HTTP error statuses are not network errors.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// A manifest asset could not be fetched; the version was not populated.
    #[error("INSTALL_FAILED: {version}: {url}: {reason}")]
    InstallFailed { version: String, url: String, reason: String },

    /// Navigation failed and the offline page is not in the current cache.
    #[error("OFFLINE_PAGE_MISSING: {0}")]
    OfflinePageMissing(String),

    /// Lifecycle operation attempted from the wrong worker state.
    #[error("INVALID_STATE: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    /// No cache store exists under the given version.
    #[error("CACHE_MISS: {0}")]
    CacheMiss(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),
}

impl Error {
    /// Whether the fetch never produced a response: transport failure or deadline.
    ///
    /// An oversized body is not one; the server did answer.
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Error::Network(_) | Error::FetchTimeout(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let message = err.to_string();
        let code = match &err {
            Error::InvalidInput(_) => -32602,
            Error::CacheMiss(_) => -32001,
            Error::Database(_) | Error::MigrationFailed(_) => -32002,
            Error::InvalidUrl(_) => -32003,
            Error::FetchTimeout(_) => -32006,
            Error::FetchTooLarge(_) => -32007,
            Error::Network(_) => -32008,
            Error::InstallFailed { .. } => -32020,
            Error::OfflinePageMissing(_) => -32021,
            Error::InvalidState { .. } => -32022,
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::OfflinePageMissing("http://localhost:8080/offline.html".to_string());
        assert!(err.to_string().starts_with("OFFLINE_PAGE_MISSING"));
        assert!(err.to_string().contains("/offline.html"));
    }

    #[test]
    fn test_install_failed_display() {
        let err = Error::InstallFailed {
            version: "shell-v2".into(),
            url: "http://localhost:8080/js/app.js".into(),
            reason: "status 404".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("INSTALL_FAILED"));
        assert!(msg.contains("shell-v2"));
        assert!(msg.contains("status 404"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::Network("connection refused".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32008);
        assert!(mcp_err.message.contains("connection refused"));
    }

    #[test]
    fn test_network_failure_classification() {
        assert!(Error::Network("reset".into()).is_network_failure());
        assert!(Error::FetchTimeout("20s".into()).is_network_failure());
        assert!(!Error::FetchTooLarge("64 bytes exceeds 16".into()).is_network_failure());
        assert!(!Error::CacheMiss("v1".into()).is_network_failure());
        assert!(!Error::InvalidInput("mode".into()).is_network_failure());
    }
}
