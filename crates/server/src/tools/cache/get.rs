//! cache_get tool implementation.
//!
//! Reads the stored entry for a URL from a named store, or from the active
//! generation when no store is given.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::Error;

use crate::tools::sw_fetch::ResponseView;
use crate::tools::{SharedWorker, json_result};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// Store to read from (default: the active generation).
    #[serde(default)]
    pub store: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub store: String,
    pub key: String,
    pub method: String,
    pub url: String,

    /// RFC 3339 timestamp of the write.
    pub stored_at: String,
    pub response: ResponseView,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(worker: &SharedWorker, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url must not be empty".into()).into());
    }

    let sw = worker.handler();
    let store = params.store.unwrap_or_else(|| sw.config().generation().to_string());
    let url = sw.config().resolve(&params.url)?;

    let entry = sw
        .db()
        .get_entry(&store, "GET", url.as_str())
        .await?
        .ok_or_else(|| Error::CacheMiss(format!("{url} in {store}")))?;

    let output = CacheGetOutput {
        store,
        key: entry.key,
        method: entry.method,
        url: entry.url,
        stored_at: entry.stored_at,
        response: ResponseView::from(&entry.response),
    };
    json_result(&output)
}
