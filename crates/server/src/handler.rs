//! MCP server handler implementation.
//!
//! Routes tool calls onto the shared [`ShellContext`].

use crate::context::ShellContext;
use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, purge_impl};
use crate::tools::shell_fetch::fetch_impl;
use crate::tools::shell_install::install_impl;
use crate::tools::shell_status::status_impl;
use crate::tools::{ShellFetchParams, ShellInstallParams};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for shellcache.
#[derive(Clone)]
pub struct ShellCacheServer {
    context: ShellContext,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ShellCacheServer {
    pub fn new(context: ShellContext) -> Self {
        Self { context, tool_router: Self::tool_router() }
    }

    /// Dispatch a request through the active shell generation.
    ///
    /// Navigations go network-first with the offline page as fallback; every
    /// other mode is served cache-first.
    #[tool(
        description = "Fetch a URL through the offline shell. mode=navigate is network-first with an offline fallback; other modes are cache-first."
    )]
    async fn shell_fetch(&self, params: Parameters<ShellFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.context, params.0).await
    }

    #[tool(description = "Install and activate a cache version, precaching the shell assets and purging other versions.")]
    async fn shell_install(&self, params: Parameters<ShellInstallParams>) -> Result<CallToolResult, McpError> {
        install_impl(&self.context, params.0).await
    }

    #[tool(description = "Report the active shell generation and every stored cache version.")]
    async fn shell_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.context).await
    }

    #[tool(description = "Read a cached response by URL from a cache version. No network requests are made.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.context, params.0).await
    }

    #[tool(description = "Delete a stored cache version. The active version cannot be purged.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.context, params.0).await
    }
}

impl ServerHandler for ShellCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shellcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
