//! Scripted network double and fixtures for worker tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use url::Url;

use super::WorkerConfig;
use crate::http::{GatewayRequest, GatewayResponse, resolve};
use crate::network::{Network, NetworkError};

/// Worker config for a site at `https://game.example/` with entry points
/// `/app/` and `/app/index.html` and generation `gen-2`.
pub(crate) fn app_config(manifest: &[&str]) -> WorkerConfig {
    let origin = Url::parse("https://game.example/").unwrap();
    let manifest = manifest.iter().map(|m| resolve(&origin, m).unwrap()).collect();
    WorkerConfig::new("gen-2", origin, vec!["/app/".into(), "/app/index.html".into()], manifest)
}

/// Answers routed URLs; everything else is a 404 when online or a
/// transport failure when offline.
pub(crate) struct StubNetwork {
    routes: HashMap<String, Result<GatewayResponse, NetworkError>>,
    online: bool,
    calls: AtomicUsize,
}

impl StubNetwork {
    pub(crate) fn online() -> Self {
        Self { routes: HashMap::new(), online: true, calls: AtomicUsize::new(0) }
    }

    pub(crate) fn offline() -> Self {
        Self { online: false, ..Self::online() }
    }

    pub(crate) fn route(mut self, url: &str, response: GatewayResponse) -> Self {
        self.routes.insert(url.to_string(), Ok(response));
        self
    }

    pub(crate) fn fail(self, url: &str) -> Self {
        let err = NetworkError::Offline(format!("connection refused: {url}"));
        self.fail_with(url, err)
    }

    pub(crate) fn fail_with(mut self, url: &str, err: NetworkError) -> Self {
        self.routes.insert(url.to_string(), Err(err));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &GatewayRequest) -> Result<GatewayResponse, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.routes.get(request.url.as_str()) {
            Some(result) => result.clone(),
            None if self.online => Ok(GatewayResponse::new(404, "Not Found", Vec::new())),
            None => Err(NetworkError::Offline(format!("no route to {}", request.url))),
        }
    }
}
