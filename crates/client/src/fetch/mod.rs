//! Live network access for the worker.
//!
//! [`FetchClient`] implements the core [`Network`] trait over reqwest:
//!
//! - Any HTTP status is a response; only transport errors fail
//! - Timeouts, redirect limit and user agent come from [`FetchConfig`]
//! - Bodies larger than `max_bytes` are rejected
//! - Request headers are forwarded; response headers are kept in order

use reqwest::{Client, Method};
use std::time::{Duration, Instant};

use swcache_core::{AppConfig, Error, GatewayRequest, GatewayResponse, Header, Network, NetworkError};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "swcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "swcache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            max_redirects: config.max_redirects,
        }
    }
}

/// reqwest-backed network client.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn too_large(&self, len: usize) -> NetworkError {
        NetworkError::TooLarge { len, max: self.config.max_bytes }
    }
}

fn classify(err: reqwest::Error) -> NetworkError {
    if err.is_timeout() {
        NetworkError::Timeout(err.to_string())
    } else if err.is_builder() {
        NetworkError::InvalidUrl(err.to_string())
    } else {
        NetworkError::Offline(err.to_string())
    }
}

#[async_trait::async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &GatewayRequest) -> Result<GatewayResponse, NetworkError> {
        let start = Instant::now();
        let method =
            Method::from_bytes(request.method.as_bytes()).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;

        let mut builder = self.http.request(method, request.url.clone());
        for h in request.headers.iter().filter(|h| !is_hop_by_hop(&h.name)) {
            builder = builder.header(h.name.as_str(), h.value.as_str());
        }

        let response = builder.send().await.map_err(classify)?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(self.too_large(len as usize));
        }

        let status = response.status();
        let headers: Vec<Header> = response
            .headers()
            .iter()
            .map(|(name, value)| Header::new(name.as_str(), String::from_utf8_lossy(value.as_bytes())))
            .collect();

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() { NetworkError::Timeout(e.to_string()) } else { NetworkError::Body(e.to_string()) }
        })?;

        if bytes.len() > self.config.max_bytes {
            return Err(self.too_large(bytes.len()));
        }

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status.as_u16(),
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(GatewayResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: bytes.to_vec(),
        })
    }
}

/// Headers reqwest manages itself; never forwarded from the intercepted request.
fn is_hop_by_hop(name: &str) -> bool {
    const HOP: &[&str] = &["connection", "keep-alive", "transfer-encoding", "upgrade", "host", "content-length"];
    HOP.iter().any(|h| name.eq_ignore_ascii_case(h))
}
