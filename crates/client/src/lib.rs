//! Network client for swcache.
//!
//! This crate provides the reqwest-backed implementation of the worker's
//! `Network` trait.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
