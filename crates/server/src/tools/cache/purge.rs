//! cache_purge tool implementation.
//!
//! Deletes a stored cache version. The active version cannot be purged.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::CacheVersion;

use crate::context::ShellContext;
use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Name of the cache version to delete.
    pub version: String,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    pub version: String,
    /// Number of entries that were stored under the version.
    pub deleted: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(context: &ShellContext, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let version = CacheVersion::new(params.version)?;
    let deleted = context
        .registration
        .purge_inactive(context.store.as_ref(), &version)
        .await?;

    json_result(&CachePurgeOutput { version: version.to_string(), deleted })
}
