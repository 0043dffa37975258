//! cache_delete tool implementation.
//!
//! Deletes a store and every entry in it. Deleting the active generation is
//! allowed; the gateway then treats every lookup as a miss.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::Error;

use crate::tools::{SharedWorker, json_result};

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Name of the store to delete.
    pub store: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub store: String,

    /// False if no store had that name.
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(worker: &SharedWorker, params: CacheDeleteParams) -> Result<CallToolResult, McpError> {
    if params.store.trim().is_empty() {
        return Err(Error::InvalidInput("store must not be empty".into()).into());
    }

    let deleted = worker.handler().db().delete_store(&params.store).await?;
    tracing::info!(store = %params.store, deleted, "cache_delete");

    json_result(&CacheDeleteOutput { store: params.store, deleted })
}
