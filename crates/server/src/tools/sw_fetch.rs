//! sw_fetch tool implementation.
//!
//! Dispatches a request to the worker as an intercepted fetch and reports
//! what the worker answered with.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{Error, FetchDisposition, GatewayRequest, GatewayResponse, Header, ResponseSource};

use super::{SharedWorker, json_result};

/// Parameters for the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers forwarded on a live fetch.
    #[serde(default)]
    pub headers: Vec<Header>,
}

fn default_method() -> String {
    "GET".to_string()
}

/// A response rendered for tool output.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseView {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<Header>,

    /// Body decoded as UTF-8, lossily.
    pub body: String,

    /// Body length in bytes before decoding.
    pub body_bytes: usize,
}

impl From<&GatewayResponse> for ResponseView {
    fn from(response: &GatewayResponse) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text.clone(),
            headers: response.headers.clone(),
            body: response.body_text().into_owned(),
            body_bytes: response.body.len(),
        }
    }
}

/// Output from the sw_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwFetchOutput {
    /// The resolved request URL.
    pub url: String,

    /// False when the worker let the request pass through.
    pub intercepted: bool,

    /// Where the response came from, when intercepted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ResponseSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseView>,
}

/// Implementation of the sw_fetch tool.
pub async fn fetch_impl(worker: &SharedWorker, params: SwFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(Error::InvalidInput("url must not be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(Error::InvalidInput("method must not be empty".into()).into());
    }

    let url = worker.handler().config().resolve(&params.url)?;
    let mut request = GatewayRequest::new(&params.method, url);
    request.headers = params.headers;

    let output = match worker.dispatch_fetch(&request).await {
        FetchDisposition::PassThrough => {
            SwFetchOutput { url: request.url.to_string(), intercepted: false, source: None, response: None }
        }
        FetchDisposition::Respond { response, source } => SwFetchOutput {
            url: request.url.to_string(),
            intercepted: true,
            source: Some(source),
            response: Some(ResponseView::from(&response)),
        },
    };

    json_result(&output)
}
