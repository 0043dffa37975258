//! Lifecycle state machine and event dispatch.
//!
//! The host moves a worker through `parsed -> installing -> installed ->
//! activating -> activated` and awaits each handler to completion before the
//! transition finishes. Only an activated worker receives fetch events.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::gateway::FetchDisposition;
use super::populate::PopulateOutcome;
use crate::Error;
use crate::http::GatewayRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install handler failed; the worker may be installed again.
    Redundant,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// What an install handler did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct InstallReport {
    pub generation: String,
    pub prefetch: PopulateOutcome,
}

/// What an activate handler did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ActivateReport {
    pub generation: String,
    pub deleted: Vec<String>,
}

/// One method per lifecycle signal. The host awaits the returned future
/// before it considers the transition finished.
#[async_trait::async_trait]
pub trait LifecycleHandler: Send + Sync {
    async fn on_install(&self) -> Result<InstallReport, Error>;

    async fn on_activate(&self) -> Result<ActivateReport, Error>;

    async fn on_fetch(&self, request: &GatewayRequest) -> FetchDisposition;
}

/// Drives a [`LifecycleHandler`] through its lifecycle.
pub struct WorkerHost<H> {
    handler: H,
    state: RwLock<LifecycleState>,
}

impl<H: LifecycleHandler> WorkerHost<H> {
    pub fn new(handler: H) -> Self {
        Self { handler, state: RwLock::new(LifecycleState::Parsed) }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    async fn begin(
        &self, action: &'static str, from: &[LifecycleState], to: LifecycleState,
    ) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !from.contains(&*state) {
            return Err(Error::InvalidState { action, state: state.to_string() });
        }
        tracing::info!("worker {} -> {}", *state, to);
        *state = to;
        Ok(())
    }

    async fn finish(&self, to: LifecycleState) {
        let mut state = self.state.write().await;
        tracing::info!("worker {} -> {}", *state, to);
        *state = to;
    }

    /// Run the install handler.
    ///
    /// The worker ends `installed`, or `redundant` if the handler failed.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        self.begin("install", &[LifecycleState::Parsed, LifecycleState::Redundant], LifecycleState::Installing)
            .await?;

        let result = self.handler.on_install().await;
        let next = if result.is_ok() { LifecycleState::Installed } else { LifecycleState::Redundant };
        self.finish(next).await;

        result
    }

    /// Run the activate handler.
    ///
    /// The worker ends `activated` even if the handler failed; the handler's
    /// error is returned to the caller. An activated worker may be
    /// activated again.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        self.begin("activate", &[LifecycleState::Installed, LifecycleState::Activated], LifecycleState::Activating)
            .await?;

        let result = self.handler.on_activate().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "activate handler failed");
        }
        self.finish(LifecycleState::Activated).await;

        result
    }

    /// Route an intercepted request to the worker.
    ///
    /// Until the worker is activated it controls nothing and every request
    /// passes through.
    pub async fn dispatch_fetch(&self, request: &GatewayRequest) -> FetchDisposition {
        let state = self.state().await;
        if state != LifecycleState::Activated {
            tracing::debug!(%state, "worker not active, passing {} through", request.url);
            return FetchDisposition::PassThrough;
        }
        self.handler.on_fetch(request).await
    }
}
