//! MCP tool implementations.
//!
//! This module contains all tools exposed by the shellcache server.

pub mod cache;
pub mod shell_fetch;
pub mod shell_install;
pub mod shell_status;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::fetch::resolve;
use shellcache_core::{CachedResponse, Error};
use url::Url;

pub use shell_fetch::ShellFetchParams;
pub use shell_install::ShellInstallParams;

/// A response rendered for tool output. Bodies are decoded lossily as UTF-8.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseView {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub body_bytes: usize,
}

impl From<&CachedResponse> for ResponseView {
    fn from(response: &CachedResponse) -> Self {
        Self {
            url: response.url.clone(),
            status: response.status,
            content_type: response.content_type().map(str::to_string),
            headers: response.headers.clone(),
            body: String::from_utf8_lossy(&response.body).into_owned(),
            body_bytes: response.body.len(),
        }
    }
}

/// Resolve a tool URL argument; bare paths are taken relative to the app origin.
pub(crate) fn resolve_url(origin: &str, input: &str) -> Result<Url, Error> {
    let origin = Url::parse(origin).map_err(|e| Error::InvalidUrl(format!("{origin}: {e}")))?;
    resolve(&origin, input).map_err(|e| Error::InvalidUrl(e.to_string()))
}

/// Serialize `output` as the single text content of a successful result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) fn output_of<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
    let content_val = serde_json::to_value(&result.content[0]).unwrap();
    let text = content_val
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url_paths_and_absolute() {
        let url = resolve_url("http://localhost:8080", "/css/style.css").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/css/style.css");

        let url = resolve_url("http://localhost:8080", "https://cdn.example.com/app.js").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/app.js");
    }

    #[test]
    fn test_response_view_decodes_lossily() {
        let response = CachedResponse::new("http://localhost:8080/logo.png", 200, vec![0x89, b'P', b'N', b'G', 0xff])
            .with_header("Content-Type", "image/png");
        let view = ResponseView::from(&response);
        assert_eq!(view.content_type.as_deref(), Some("image/png"));
        assert_eq!(view.body_bytes, 5);
        assert!(view.body.contains("PNG"));
    }
}
