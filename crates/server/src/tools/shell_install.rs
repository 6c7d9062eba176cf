//! shell_install tool implementation.
//!
//! Installs a new shell generation and activates it immediately, purging
//! every other cache version.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::LifecycleEvent;

use super::json_result;
use crate::context::ShellContext;

/// Input parameters for shell_install tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ShellInstallParams {
    /// Cache version to install. Defaults to the configured version.
    #[serde(default)]
    pub cache_version: Option<String>,
}

/// Output structure for shell_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShellInstallOutput {
    pub version: String,
    pub events: Vec<LifecycleEvent>,
}

/// Implementation of the shell_install tool.
///
/// A failed install leaves the currently active generation in control.
pub async fn install_impl(context: &ShellContext, params: ShellInstallParams) -> Result<CallToolResult, McpError> {
    let worker = context.worker(params.cache_version.as_deref())?;
    let version = worker.version().to_string();

    let events = context.registration.register(worker).await.inspect_err(|err| {
        tracing::warn!(version = %version, error = %err, "shell_install failed");
    })?;

    tracing::info!(version = %version, "shell_install complete");
    json_result(&ShellInstallOutput { version, events })
}
