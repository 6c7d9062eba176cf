//! cache_get tool implementation.
//!
//! Reads one stored response from a cache version without touching the network.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::{CacheVersion, Error, RequestKey};

use crate::context::ShellContext;
use crate::tools::{ResponseView, json_result, resolve_url};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// Cache version to read. Defaults to the active version, then the configured one.
    #[serde(default)]
    pub version: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub version: String,
    pub request_key: String,
    pub response: ResponseView,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(context: &ShellContext, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let version = match params.version {
        Some(name) => CacheVersion::new(name)?,
        None => match context.registration.active().await {
            Some(worker) => worker.version().clone(),
            None => CacheVersion::new(context.config.cache_version.clone())?,
        },
    };

    let url = resolve_url(&context.config.origin, &params.url)?;
    let key = RequestKey::new("GET", url.as_str());
    let response = context
        .store
        .get(&version, &key)
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{url} in {version}")))?;

    let output = CacheGetOutput {
        version: version.to_string(),
        request_key: key.to_string(),
        response: ResponseView::from(&response),
    };
    json_result(&output)
}
