//! Core of swcache, an offline-first request cache modelled on a service worker.
//!
//! This crate provides:
//! - Named cache stores with a SQLite backend
//! - The worker: cache-first gateway, install-time prefetch, activate-time
//!   generation cleanup, and the lifecycle host that drives them
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod network;
pub mod worker;

pub use cache::{CacheDb, NewEntry, StoredEntry};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use http::{GatewayRequest, GatewayResponse, Header};
pub use network::{Network, NetworkError};
pub use worker::{
    FetchDisposition, LifecycleHandler, LifecycleState, PopulateOutcome, ResponseSource, ServiceWorker, WorkerConfig,
    WorkerHost,
};
