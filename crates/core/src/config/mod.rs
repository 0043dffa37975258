//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The loaded [`AppConfig`] is turned into an immutable
//! [`WorkerConfig`](crate::worker::WorkerConfig) once at startup.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::http::resolve;
use crate::worker::WorkerConfig;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site origin that relative entry points and manifest paths resolve against.
    ///
    /// Set via SWCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Name of the active cache generation. Every other store is deleted on activate.
    ///
    /// Set via SWCACHE_GENERATION environment variable.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Paths served the offline fallback page when uncached and unreachable.
    #[serde(default = "default_entry_points")]
    pub entry_points: Vec<String>,

    /// URLs stored at install time. Empty means "the entry points".
    #[serde(default)]
    pub manifest: Vec<String>,

    /// Path to SQLite cache database.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for live requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to read per live response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Live request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Redirects followed per live request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_origin() -> String {
    "https://animelka.github.io/".into()
}

fn default_generation() -> String {
    "ultimate-sky-diver-cache-v1".into()
}

fn default_entry_points() -> Vec<String> {
    vec!["/Scamlinktester/".into(), "/Scamlinktester/index.html".into()]
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            generation: default_generation(),
            entry_points: default_entry_points(),
            manifest: Vec::new(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Manifest entries, falling back to the entry points when none are listed.
    pub fn effective_manifest(&self) -> &[String] {
        if self.manifest.is_empty() { &self.entry_points } else { &self.manifest }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWCACHE_`
    /// 2. TOML file from `SWCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a source cannot be read or parsed, or if
    /// validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Build the immutable worker configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin or a manifest entry
    /// does not resolve to an http(s) URL.
    pub fn worker_config(&self) -> Result<WorkerConfig, ConfigError> {
        let origin = url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;

        let manifest = self
            .effective_manifest()
            .iter()
            .map(|entry| {
                resolve(&origin, entry)
                    .map_err(|e| ConfigError::Invalid { field: "manifest".into(), reason: format!("{entry}: {e}") })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WorkerConfig::new(self.generation.clone(), origin, self.entry_points.clone(), manifest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.generation, "ultimate-sky-diver-cache-v1");
        assert_eq!(config.entry_points, vec!["/Scamlinktester/", "/Scamlinktester/index.html"]);
        assert!(config.manifest.is_empty());
        assert_eq!(config.db_path, PathBuf::from("./swcache.sqlite"));
        assert_eq!(config.user_agent, "swcache/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_effective_manifest_defaults_to_entry_points() {
        let config = AppConfig::default();
        assert_eq!(config.effective_manifest(), config.entry_points.as_slice());

        let config = AppConfig { manifest: vec!["/app/logo.png".into()], ..Default::default() };
        assert_eq!(config.effective_manifest(), ["/app/logo.png".to_string()]);
    }

    #[test]
    fn test_worker_config_resolves_manifest() {
        let worker = AppConfig::default().worker_config().unwrap();
        assert_eq!(worker.generation(), "ultimate-sky-diver-cache-v1");
        let manifest: Vec<&str> = worker.manifest().iter().map(|u| u.as_str()).collect();
        assert_eq!(
            manifest,
            vec![
                "https://animelka.github.io/Scamlinktester/",
                "https://animelka.github.io/Scamlinktester/index.html"
            ]
        );
    }

    #[test]
    fn test_worker_config_rejects_bad_manifest() {
        let config = AppConfig { manifest: vec!["ftp://example.com/x".into()], ..Default::default() };
        let result = config.worker_config();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "manifest"));
    }

    #[test]
    fn test_load_layers_toml_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "swcache.toml",
                r#"
                generation = "gen-from-file"
                entry_points = ["/app/", "/app/index.html"]
                timeout_ms = 9000
                "#,
            )?;
            jail.set_env("SWCACHE_CONFIG_FILE", "swcache.toml");
            jail.set_env("SWCACHE_GENERATION", "gen-from-env");

            let config = AppConfig::load().map_err(|e| e.to_string())?;

            assert_eq!(config.generation, "gen-from-env");
            assert_eq!(config.entry_points, vec!["/app/", "/app/index.html"]);
            assert_eq!(config.timeout_ms, 9000);
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SWCACHE_TIMEOUT_MS", "50");
            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
            Ok(())
        });
    }
}
