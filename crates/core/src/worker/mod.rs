//! The offline cache worker.
//!
//! A [`ServiceWorker`] bundles the three responsibilities bound to the
//! lifecycle signals a [`WorkerHost`] dispatches:
//!
//! - install: [`PrefetchPopulator`] stores the manifest in the active store
//! - activate: [`CacheGenerationManager`] deletes every other store
//! - fetch: [`OfflineCacheGateway`] answers GET requests cache-first
//!
//! All of them read one immutable [`WorkerConfig`].

pub mod fallback;
pub mod gateway;
pub mod generations;
pub mod host;
pub mod populate;

#[cfg(test)]
pub(crate) mod stub;

use std::sync::Arc;

use url::Url;

use crate::cache::CacheDb;
use crate::http::{GatewayRequest, resolve};
use crate::network::Network;
use crate::Error;

pub use fallback::{OFFLINE_ERROR_CODE, offline_page};
pub use gateway::{FetchDisposition, OfflineCacheGateway, ResponseSource};
pub use generations::CacheGenerationManager;
pub use host::{ActivateReport, InstallReport, LifecycleHandler, LifecycleState, WorkerHost};
pub use populate::{PopulateOutcome, PrefetchPopulator};

/// Immutable settings shared by every worker component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    generation: String,
    origin: Url,
    entry_points: Vec<String>,
    manifest: Vec<Url>,
}

impl WorkerConfig {
    pub fn new(generation: impl Into<String>, origin: Url, entry_points: Vec<String>, manifest: Vec<Url>) -> Self {
        Self { generation: generation.into(), origin, entry_points, manifest }
    }

    /// Name of the one store that survives activation.
    pub fn generation(&self) -> &str {
        &self.generation
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn entry_points(&self) -> &[String] {
        &self.entry_points
    }

    pub fn manifest(&self) -> &[Url] {
        &self.manifest
    }

    /// Resolve a path or absolute URL against the origin.
    pub fn resolve(&self, input: &str) -> Result<Url, Error> {
        Ok(resolve(&self.origin, input)?)
    }

    /// Whether a URL is one of the document entry points.
    ///
    /// Matches on same origin and exact path; query string is ignored.
    pub fn is_entry_point(&self, url: &Url) -> bool {
        url.origin() == self.origin.origin() && self.entry_points.iter().any(|path| path == url.path())
    }
}

/// The worker a host drives through install, activate and fetch.
pub struct ServiceWorker<N> {
    config: Arc<WorkerConfig>,
    db: CacheDb,
    gateway: OfflineCacheGateway<Arc<N>>,
    populator: PrefetchPopulator<Arc<N>>,
    generations: CacheGenerationManager,
}

impl<N: Network + 'static> ServiceWorker<N> {
    pub fn new(config: WorkerConfig, db: CacheDb, network: N) -> Self {
        let config = Arc::new(config);
        let network = Arc::new(network);
        Self {
            gateway: OfflineCacheGateway::new(db.clone(), Arc::clone(&network), Arc::clone(&config)),
            populator: PrefetchPopulator::new(db.clone(), network, config.generation()),
            generations: CacheGenerationManager::new(db.clone()),
            config,
            db,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }
}

#[async_trait::async_trait]
impl<N: Network + 'static> LifecycleHandler for ServiceWorker<N> {
    async fn on_install(&self) -> Result<InstallReport, Error> {
        let prefetch = self.populator.populate(self.config.manifest()).await;
        Ok(InstallReport { generation: self.config.generation().to_string(), prefetch })
    }

    async fn on_activate(&self) -> Result<ActivateReport, Error> {
        let deleted = self.generations.reconcile(self.config.generation()).await?;
        Ok(ActivateReport { generation: self.config.generation().to_string(), deleted })
    }

    async fn on_fetch(&self, request: &GatewayRequest) -> FetchDisposition {
        self.gateway.handle_request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::GatewayResponse;
    use stub::{StubNetwork, app_config};

    #[test]
    fn test_is_entry_point() {
        let config = app_config(&[]);
        assert!(config.is_entry_point(&Url::parse("https://game.example/app/index.html").unwrap()));
        assert!(config.is_entry_point(&Url::parse("https://game.example/app/?utm=x").unwrap()));
        assert!(!config.is_entry_point(&Url::parse("https://game.example/app/logo.png").unwrap()));
        assert!(!config.is_entry_point(&Url::parse("https://game.example/app").unwrap()));
        assert!(!config.is_entry_point(&Url::parse("https://cdn.example/app/index.html").unwrap()));
    }

    #[test]
    fn test_resolve_against_origin() {
        let config = app_config(&[]);
        let url = config.resolve("/app/logo.png").unwrap();
        assert_eq!(url.as_str(), "https://game.example/app/logo.png");
        assert!(matches!(config.resolve(""), Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_full_lifecycle_then_offline() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("gen-1").await.unwrap();

        let index = GatewayResponse::new(200, "OK", "<h1>game</h1>").with_header("Content-Type", "text/html");
        let network = Arc::new(
            StubNetwork::offline()
                .route("https://game.example/app/", index.clone())
                .route("https://game.example/app/index.html", index.clone()),
        );

        let worker =
            ServiceWorker::new(app_config(&["/app/", "/app/index.html"]), db.clone(), Arc::clone(&network));
        let host = WorkerHost::new(worker);

        let report = host.install().await.unwrap();
        assert_eq!(report.prefetch, PopulateOutcome::Populated { stored: 2 });

        let report = host.activate().await.unwrap();
        assert_eq!(report.deleted, vec!["gen-1".to_string()]);
        assert_eq!(db.list_stores().await.unwrap(), vec!["gen-2".to_string()]);

        let calls = network.calls();
        let request = GatewayRequest::get(Url::parse("https://game.example/app/index.html").unwrap());
        match host.dispatch_fetch(&request).await {
            FetchDisposition::Respond { response, source } => {
                assert_eq!(source, ResponseSource::Cache);
                assert_eq!(response, index);
            }
            FetchDisposition::PassThrough => panic!("expected a response"),
        }
        assert_eq!(network.calls(), calls);
    }

    #[tokio::test]
    async fn test_install_with_manifest_failure_still_installs() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::offline().route(
            "https://game.example/app/",
            GatewayResponse::new(200, "OK", "root").with_header("Content-Type", "text/html"),
        );
        let host = WorkerHost::new(ServiceWorker::new(
            app_config(&["/app/", "/app/missing.js"]),
            db.clone(),
            network,
        ));

        let report = host.install().await.unwrap();
        assert!(matches!(report.prefetch, PopulateOutcome::Failed { .. }));
        assert_eq!(host.state().await, LifecycleState::Installed);
        assert_eq!(db.count_entries("gen-2").await.unwrap(), 0);

        host.activate().await.unwrap();
        assert_eq!(host.state().await, LifecycleState::Activated);
    }

    #[tokio::test]
    async fn test_prefetched_entries_use_canonical_urls() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::offline().route("https://game.example/app/", GatewayResponse::new(200, "OK", "x"));
        let worker = ServiceWorker::new(app_config(&["/app/#top"]), db.clone(), network);

        worker.on_install().await.unwrap();

        let entries = db.list_entries("gen-2").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://game.example/app/");
    }
}
