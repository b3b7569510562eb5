//! REST gateway for bond credit-rating data
//!
//! This crate exposes the reference-data pipeline of [`ratings_core`] over
//! HTTP: a health probe, an explicit connect endpoint, the screened bond
//! list and single-bond lookups.

pub mod config;
pub mod demo;
pub mod routes;
pub mod server;

pub use ratings_core;

/// Server version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
