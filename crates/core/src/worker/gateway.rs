//! Cache-first request handling with an offline fallback.
//!
//! For every intercepted GET:
//!
//! 1. a stored entry in the active store is returned verbatim, with no
//!    freshness check and no network call
//! 2. otherwise the request goes to the network and the live response is
//!    returned as-is; it is not written back to the store
//! 3. if the network fails, entry points get the offline page and every
//!    other resource gets an empty `503`
//!
//! Non-GET requests are passed through untouched.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::WorkerConfig;
use super::fallback::offline_page;
use crate::cache::CacheDb;
use crate::http::{GatewayRequest, GatewayResponse};
use crate::network::Network;

/// Where a gateway response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Stored entry in the active store.
    Cache,
    /// Live network response.
    Network,
    /// Synthesized offline page for an entry point.
    OfflinePage,
    /// Synthesized empty `503` for any other resource.
    Unavailable,
}

/// What the host should do with an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDisposition {
    /// Not intercepted; the host performs the request itself.
    PassThrough,
    Respond { response: GatewayResponse, source: ResponseSource },
}

impl FetchDisposition {
    fn respond(response: GatewayResponse, source: ResponseSource) -> Self {
        Self::Respond { response, source }
    }

    pub fn response(&self) -> Option<&GatewayResponse> {
        match self {
            Self::PassThrough => None,
            Self::Respond { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            Self::PassThrough => None,
            Self::Respond { source, .. } => Some(*source),
        }
    }
}

/// Answers requests from the active store, then the network, then a fallback.
pub struct OfflineCacheGateway<N> {
    db: CacheDb,
    network: N,
    config: Arc<WorkerConfig>,
}

impl<N: Network> OfflineCacheGateway<N> {
    pub fn new(db: CacheDb, network: N, config: Arc<WorkerConfig>) -> Self {
        Self { db, network, config }
    }

    /// Decide the response for one intercepted request.
    ///
    /// Never fails: store read errors count as misses and network errors
    /// resolve to one of the two fallback shapes.
    pub async fn handle_request(&self, request: &GatewayRequest) -> FetchDisposition {
        if !request.is_get() {
            tracing::debug!(method = %request.method, url = %request.url, "not intercepted");
            return FetchDisposition::PassThrough;
        }

        let generation = self.config.generation();
        match self
            .db
            .match_request(generation, &request.method, request.url.as_str())
            .await
        {
            Ok(Some(response)) => {
                tracing::debug!("cache hit for {}", request.url);
                return FetchDisposition::respond(response, ResponseSource::Cache);
            }
            Ok(None) => tracing::debug!("cache miss for {}", request.url),
            Err(e) => tracing::warn!(store = generation, error = %e, "cache lookup failed for {}", request.url),
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                tracing::debug!("network {} for {}", response.status, request.url);
                FetchDisposition::respond(response, ResponseSource::Network)
            }
            Err(e) if self.config.is_entry_point(&request.url) => {
                tracing::warn!(error = %e, "serving offline page for {}", request.url);
                FetchDisposition::respond(offline_page(), ResponseSource::OfflinePage)
            }
            Err(e) => {
                tracing::warn!(error = %e, "network failed for {}, responding 503", request.url);
                FetchDisposition::respond(GatewayResponse::service_unavailable(), ResponseSource::Unavailable)
            }
        }
    }
}
