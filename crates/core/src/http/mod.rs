//! Request and response types exchanged between the host, the gateway,
//! the store and the network.

pub mod url;

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub use self::url::{UrlError, canonicalize, resolve};

/// A single header line. Order and duplicates are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// An intercepted outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Canonical absolute URL (fragment stripped).
    pub url: ::url::Url,
    pub headers: Vec<Header>,
}

impl GatewayRequest {
    /// The fragment never reaches the store or the network.
    pub fn new(method: &str, mut url: ::url::Url) -> Self {
        url.set_fragment(None);
        Self { method: method.trim().to_ascii_uppercase(), url, headers: Vec::new() }
    }

    pub fn get(url: ::url::Url) -> Self {
        Self::new("GET", url)
    }

    /// Only GET requests are safe reads the gateway will answer.
    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }
}

/// A response as stored, fetched, or synthesized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<Header>,
    pub body: Vec<u8>,
}

impl GatewayResponse {
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { status, status_text: status_text.into(), headers: Vec::new(), body: body.into() }
    }

    /// Empty-bodied `503 Service Unavailable`.
    pub fn service_unavailable() -> Self {
        Self::new(503, "Service Unavailable", Vec::new())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// First header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Status in the 200-299 range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
