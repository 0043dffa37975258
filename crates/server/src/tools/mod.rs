//! MCP tool implementations.
//!
//! Lifecycle tools drive the worker host; cache tools inspect and manage
//! the stores directly.

use std::sync::Arc;

use swcache_core::{Network, ServiceWorker, WorkerHost};

pub mod cache;
pub mod lifecycle;
pub mod sw_fetch;

pub use lifecycle::{activate_impl, boot, install_impl, status_impl};
pub use sw_fetch::{SwFetchParams, fetch_impl};

/// The worker every tool operates on.
pub type SharedWorker = Arc<WorkerHost<ServiceWorker<Arc<dyn Network>>>>;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: serde::Serialize>(
    output: &T,
) -> Result<rmcp::model::CallToolResult, rmcp::ErrorData> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| swcache_core::Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(rmcp::model::CallToolResult::success(vec![rmcp::model::Content::text(json)]))
}
