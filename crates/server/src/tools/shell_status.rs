//! shell_status tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::VersionInfo;

use super::json_result;
use crate::context::ShellContext;

/// The generation currently controlling requests.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActiveGeneration {
    pub worker_id: u64,
    pub version: String,
    pub state: String,
    pub offline_page: String,
    pub manifest: Vec<String>,
}

/// Output structure for shell_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShellStatusOutput {
    pub origin: String,
    pub active: Option<ActiveGeneration>,
    /// Every cache version present in the store.
    pub versions: Vec<VersionInfo>,
}

/// Implementation of the shell_status tool.
pub async fn status_impl(context: &ShellContext) -> Result<CallToolResult, McpError> {
    let mut active = None;
    if let Some(worker) = context.registration.active().await {
        active = Some(ActiveGeneration {
            worker_id: worker.id(),
            version: worker.version().to_string(),
            state: worker.state().await.to_string(),
            offline_page: worker.manifest().offline_page().to_string(),
            manifest: worker.manifest().urls().iter().map(|u| u.to_string()).collect(),
        });
    }

    let output = ShellStatusOutput {
        origin: context.config.origin.clone(),
        active,
        versions: context.store.describe().await?,
    };
    json_result(&output)
}
