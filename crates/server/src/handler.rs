//! MCP server handler implementation.
//!
//! The host adapter: each tool delivers one lifecycle event or intercepted
//! request to the shared router.

use std::sync::Arc;

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
use shellcache_core::Router;

use crate::tools::cache::{CacheGetParams, get_impl, stores_impl};
use crate::tools::fetch::{SwFetchParams, fetch_impl};
use crate::tools::lifecycle::{activate_impl, install_impl, status_impl};

/// The MCP server handler for shellcache.
#[derive(Clone)]
pub struct ShellcacheServer {
    router: Arc<Router>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ShellcacheServer {
    pub fn new(router: Arc<Router>) -> Self {
        Self { router, tool_router: Self::tool_router() }
    }

    #[tool(description = "Install event: fetch every configured asset into the current cache store (all or nothing). Activates immediately when skip_waiting is set.")]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.router).await
    }

    #[tool(description = "Activate event: delete every cache store not named by the current version and start serving from the cache.")]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.router).await
    }

    /// Resolve one intercepted request.
    ///
    /// Navigations get the cached shell document; other requests are cache-first
    /// with a single network attempt and a per-class fallback.
    #[tool(description = "Fetch event: resolve one intercepted request cache-first. Returns the response and where it came from (cache, network, shell_fallback, offline_page, passthrough).")]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.router, params.0).await
    }

    #[tool(description = "Report the version tag, scope, lifecycle state and cache contents.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.router).await
    }

    #[tool(description = "List cache stores and the entries of the current store.")]
    async fn cache_stores(&self) -> Result<CallToolResult, McpError> {
        stores_impl(&self.router).await
    }

    #[tool(description = "Get a cached response from the current store by URL. Never touches the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.router, params.0).await
    }
}

impl ServerHandler for ShellcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shellcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Offline app-shell cache. Call sw_install then sw_activate (or rely on skip_waiting), \
                 then route each page request through sw_fetch."
                    .into(),
            ),
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
