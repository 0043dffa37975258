//! The live-network collaborator used by the gateway and the populator.

use crate::http::{GatewayRequest, GatewayResponse};

/// Why a live fetch produced no response.
///
/// HTTP error statuses are not failures; a 404 is still a response.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    #[error("network unreachable: {0}")]
    Offline(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("response too large: {len} bytes exceeds {max}")]
    TooLarge { len: usize, max: usize },

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("failed to read response: {0}")]
    Body(String),
}

/// Issues live requests on behalf of the worker.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &GatewayRequest) -> Result<GatewayResponse, NetworkError>;
}

#[async_trait::async_trait]
impl<N: Network + ?Sized> Network for std::sync::Arc<N> {
    async fn fetch(&self, request: &GatewayRequest) -> Result<GatewayResponse, NetworkError> {
        (**self).fetch(request).await
    }
}
