//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and deleting the named stores.

pub mod delete;
pub mod get;
pub mod stores;

pub use delete::{CacheDeleteParams, delete_impl};
pub use get::{CacheGetParams, get_impl};
pub use stores::stores_impl;
