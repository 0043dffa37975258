//! SQLite-backed named cache stores.
//!
//! Each store maps a request identity to a stored response. Stores are
//! created by name and deleted wholesale; entries are written either one at
//! a time or as a single transactional batch.
//!
//! - Request keys are SHA-256 over method and canonical URL
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod stores;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::{NewEntry, StoredEntry};
pub use stores::StoreInfo;
