//! shell_fetch tool implementation.
//!
//! Dispatches one request through the active shell generation, the same way
//! an intercepted page load or asset load would be handled.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::{Dispatch, InterceptedRequest, RequestMode, ResponseSource};

use super::{ResponseView, json_result, resolve_url};
use crate::context::ShellContext;

/// Input parameters for shell_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShellFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// Request mode: "navigate", "same-origin", "no-cors" (default) or "cors".
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    RequestMode::NoCors.as_str().into()
}

/// Where the returned response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FetchSource {
    Cache,
    Network,
    OfflineFallback,
    /// No generation was active; the request went straight to the network.
    PassThrough,
}

impl From<ResponseSource> for FetchSource {
    fn from(source: ResponseSource) -> Self {
        match source {
            ResponseSource::Cache => FetchSource::Cache,
            ResponseSource::Network => FetchSource::Network,
            ResponseSource::OfflineFallback => FetchSource::OfflineFallback,
        }
    }
}

/// Output structure for shell_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShellFetchOutput {
    pub request_url: String,
    pub mode: String,
    pub source: FetchSource,
    /// Active cache version, if any.
    pub version: Option<String>,
    pub response: ResponseView,
}

/// Implementation of the shell_fetch tool.
pub async fn fetch_impl(context: &ShellContext, params: ShellFetchParams) -> Result<CallToolResult, McpError> {
    let mode: RequestMode = params.mode.parse()?;
    let url = resolve_url(&context.config.origin, &params.url)?;
    let request = InterceptedRequest::from_url(url, mode);

    let version = context.registration.active().await.map(|w| w.version().to_string());
    let (response, source) = match context.registration.dispatch(&request).await? {
        Dispatch::Handled(served) => (served.response, FetchSource::from(served.source)),
        Dispatch::PassThrough => (context.fetcher.fetch(&request).await?, FetchSource::PassThrough),
    };

    tracing::info!(url = %request.url, mode = %mode, source = ?source, status = response.status, "shell_fetch");

    let output = ShellFetchOutput {
        request_url: request.url.to_string(),
        mode: mode.to_string(),
        source,
        version,
        response: ResponseView::from(&response),
    };
    json_result(&output)
}
