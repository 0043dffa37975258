//! Install-time prefetch of the manifest into the active store.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::cache::{CacheDb, NewEntry};
use crate::http::GatewayRequest;
use crate::network::{Network, NetworkError};

/// Result of one populate run. Failure is reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PopulateOutcome {
    Populated { stored: usize },
    Failed { reason: String },
}

impl PopulateOutcome {
    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Populated { .. })
    }
}

/// Stores every manifest URL in the active store as one atomic batch.
pub struct PrefetchPopulator<N> {
    db: CacheDb,
    network: N,
    generation: String,
}

impl<N: Network> PrefetchPopulator<N> {
    pub fn new(db: CacheDb, network: N, generation: impl Into<String>) -> Self {
        Self { db, network, generation: generation.into() }
    }

    /// Open the active store and fill it with the manifest.
    ///
    /// All URLs are fetched concurrently. If any of them fails or answers
    /// with a non-2xx status nothing is written; the store is still created.
    pub async fn populate(&self, manifest: &[Url]) -> PopulateOutcome {
        match self.try_populate(manifest).await {
            Ok(stored) => {
                tracing::info!(store = %self.generation, stored, "prefetched manifest");
                PopulateOutcome::Populated { stored }
            }
            Err(e) => {
                tracing::error!(store = %self.generation, error = %e, "failed to prefetch manifest");
                PopulateOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    async fn try_populate(&self, manifest: &[Url]) -> Result<usize, Error> {
        self.db.open_store(&self.generation).await?;

        let requests: Vec<GatewayRequest> = manifest.iter().cloned().map(GatewayRequest::get).collect();
        let results = join_all(requests.iter().map(|request| self.network.fetch(request))).await;

        let mut entries = Vec::with_capacity(requests.len());
        for (request, result) in requests.iter().zip(results) {
            let response = result.map_err(|e| fetch_failed(&request.url, e))?;
            if !response.is_ok() {
                return Err(Error::Network(format!("{}: status {}", request.url, response.status)));
            }
            entries.push(NewEntry::get(request.url.as_str(), response));
        }

        self.db.put_all(&self.generation, entries).await
    }
}

/// Convert a fetch failure, keeping its code and naming the URL.
fn fetch_failed(url: &Url, err: NetworkError) -> Error {
    match Error::from(err) {
        Error::FetchTimeout(msg) => Error::FetchTimeout(format!("{url}: {msg}")),
        Error::FetchTooLarge(msg) => Error::FetchTooLarge(format!("{url}: {msg}")),
        Error::InvalidUrl(msg) => Error::InvalidUrl(format!("{url}: {msg}")),
        Error::Network(msg) => Error::Network(format!("{url}: {msg}")),
        other => other,
    }
}
