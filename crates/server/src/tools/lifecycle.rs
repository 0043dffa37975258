//! sw_install, sw_activate and sw_status tool implementations.
//!
//! Install and activate forward to the worker host, which enforces the
//! lifecycle order. Status reports the current state and configuration.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use swcache_core::{Error, LifecycleState};

use super::{SharedWorker, json_result};

/// Output from the sw_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SwStatusOutput {
    /// Current lifecycle state.
    pub state: LifecycleState,

    /// Name of the active cache generation.
    pub generation: String,

    /// Site origin requests are resolved against.
    pub origin: String,

    /// Paths that receive the offline page when the network is down.
    pub entry_points: Vec<String>,

    /// URLs stored at install time.
    pub manifest: Vec<String>,
}

/// Install and activate the worker before any tool call is served.
///
/// After this, `sw_install` fails with `INVALID_STATE`; `sw_activate` may
/// still be called to rerun the generation cleanup.
pub async fn boot(worker: &SharedWorker) -> Result<(), Error> {
    let installed = worker.install().await?;
    if !installed.prefetch.is_populated() {
        tracing::warn!(prefetch = ?installed.prefetch, "worker installed without a full manifest");
    }
    let activated = worker.activate().await?;
    tracing::info!(generation = %activated.generation, deleted = ?activated.deleted, "worker ready");
    Ok(())
}

/// Implementation of the sw_install tool.
pub async fn install_impl(worker: &SharedWorker) -> Result<CallToolResult, McpError> {
    let report = worker.install().await?;
    json_result(&report)
}

/// Implementation of the sw_activate tool.
pub async fn activate_impl(worker: &SharedWorker) -> Result<CallToolResult, McpError> {
    let report = worker.activate().await?;
    json_result(&report)
}

/// Implementation of the sw_status tool.
pub async fn status_impl(worker: &SharedWorker) -> Result<CallToolResult, McpError> {
    let config = worker.handler().config();
    let output = SwStatusOutput {
        state: worker.state().await,
        generation: config.generation().to_string(),
        origin: config.origin().to_string(),
        entry_points: config.entry_points().to_vec(),
        manifest: config.manifest().iter().map(|u| u.to_string()).collect(),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{RoutedNetwork, output, page, worker};

    #[tokio::test]
    async fn test_install_then_activate() {
        let (worker, db) = worker(RoutedNetwork(vec![("https://game.example/app/index.html", page("index"))])).await;
        db.open_store("gen-1").await.unwrap();

        let installed = output(&install_impl(&worker).await.unwrap());
        assert_eq!(installed["generation"], "gen-2");
        assert_eq!(installed["prefetch"]["status"], "populated");
        assert_eq!(installed["prefetch"]["stored"], 1);

        let activated = output(&activate_impl(&worker).await.unwrap());
        assert_eq!(activated["deleted"], serde_json::json!(["gen-1"]));

        let status = output(&status_impl(&worker).await.unwrap());
        assert_eq!(status["state"], "activated");
    }

    #[tokio::test]
    async fn test_boot_leaves_worker_activated() {
        let (worker, db) = worker(RoutedNetwork(vec![("https://game.example/app/index.html", page("index"))])).await;
        db.open_store("gen-1").await.unwrap();

        boot(&worker).await.unwrap();
        assert_eq!(worker.state().await, LifecycleState::Activated);
        assert_eq!(db.list_stores().await.unwrap(), vec!["gen-2".to_string()]);

        let err = install_impl(&worker).await.unwrap_err();
        assert!(err.message.contains("cannot install while activated"), "{}", err.message);

        let activated = output(&activate_impl(&worker).await.unwrap());
        assert_eq!(activated["deleted"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_activate_before_install_is_error() {
        let (worker, _db) = worker(RoutedNetwork(Vec::new())).await;

        let err = activate_impl(&worker).await.unwrap_err();
        assert!(err.message.contains("activate"));
    }

    #[tokio::test]
    async fn test_install_reports_prefetch_failure() {
        let (worker, _db) = worker(RoutedNetwork(Vec::new())).await;

        let installed = output(&install_impl(&worker).await.unwrap());
        assert_eq!(installed["prefetch"]["status"], "failed");
        assert_eq!(worker.state().await, LifecycleState::Installed);
    }

    #[tokio::test]
    async fn test_status_before_install() {
        let (worker, _db) = worker(RoutedNetwork(Vec::new())).await;

        let status = output(&status_impl(&worker).await.unwrap());
        assert_eq!(status["state"], "parsed");
        assert_eq!(status["origin"], "https://game.example/");
        assert_eq!(status["manifest"], serde_json::json!(["https://game.example/app/index.html"]));
    }
}
