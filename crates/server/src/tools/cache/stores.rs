//! cache_stores tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::cache::StoreInfo;

use crate::tools::{SharedWorker, json_result};

/// Output from the cache_stores tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStoresOutput {
    /// Name of the active generation.
    pub active: String,

    /// Every store, oldest first.
    pub stores: Vec<StoreInfo>,
}

/// Implementation of the cache_stores tool.
pub async fn stores_impl(worker: &SharedWorker) -> Result<CallToolResult, McpError> {
    let sw = worker.handler();
    let output = CacheStoresOutput {
        active: sw.config().generation().to_string(),
        stores: sw.db().describe_stores().await?,
    };
    json_result(&output)
}
