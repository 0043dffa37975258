//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::tools::{
    SharedWorker, SwFetchParams, activate_impl,
    cache::{CacheDeleteParams, CacheGetParams, delete_impl, get_impl, stores_impl},
    fetch_impl, install_impl, status_impl,
};

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

/// The main MCP server handler for swcache.
#[derive(Clone)]
pub struct SwCacheServer {
    tool_router: ToolRouter<Self>,
    worker: SharedWorker,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SwCacheServer {
    /// Create a new server handler around a worker.
    pub fn new(worker: SharedWorker) -> Self {
        Self { tool_router: Self::tool_router(), worker }
    }

    #[tool(
        description = "Run the worker's install step: open the active cache generation and prefetch the manifest. Prefetch failure is reported, not raised. The server installs and activates at startup, so this returns INVALID_STATE unless the worker is in the parsed or redundant state."
    )]
    async fn sw_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.worker).await
    }

    #[tool(
        description = "Run the worker's activate step: delete every cache store except the active generation. Requires a prior install; safe to repeat once activated."
    )]
    async fn sw_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.worker).await
    }

    /// Dispatch an intercepted request to the worker.
    ///
    /// GET requests are answered cache-first, then from the network, then with
    /// the offline page (entry points) or an empty 503 (everything else).
    #[tool(
        description = "Send a request through the worker. Returns the response and its source (cache, network, offline_page, unavailable), or intercepted=false when the worker passes it through."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.worker, params.0).await
    }

    #[tool(description = "Report the worker's lifecycle state, active generation, entry points and manifest.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.worker).await
    }

    #[tool(description = "Read the stored GET entry for a URL from the active generation or a named store.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.worker, params.0).await
    }

    #[tool(description = "List cache stores with their entry counts and the active generation.")]
    async fn cache_stores(&self) -> Result<CallToolResult, McpError> {
        stores_impl(&self.worker).await
    }

    #[tool(description = "Delete a cache store and all of its entries by name.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.worker, params.0).await
    }
}

impl ServerHandler for SwCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "swcache".into(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{RoutedNetwork, worker};

    #[tokio::test]
    async fn test_router_lists_every_tool() {
        let (worker, _db) = worker(RoutedNetwork(Vec::new())).await;
        let server = SwCacheServer::new(worker);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(
            names,
            ["cache_delete", "cache_get", "cache_stores", "sw_activate", "sw_fetch", "sw_install", "sw_status"]
        );
    }

    #[tokio::test]
    async fn test_install_description_mentions_startup() {
        let (worker, _db) = worker(RoutedNetwork(Vec::new())).await;
        let server = SwCacheServer::new(worker);

        let install = server.tool_router.list_all().into_iter().find(|t| t.name == "sw_install").unwrap();
        let description = install.description.unwrap_or_default();
        assert!(description.contains("INVALID_STATE"));
    }

    #[tokio::test]
    async fn test_server_info() {
        let (worker, _db) = worker(RoutedNetwork(Vec::new())).await;
        let info = SwCacheServer::new(worker).get_info();
        assert_eq!(info.server_info.name, "swcache");
        assert!(info.capabilities.tools.is_some());
    }
}
