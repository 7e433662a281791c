//! AWS-oriented adapters and handlers for the email site.
//!
//! This crate owns runtime integration details (Lambda handlers, store
//! adapters, configuration, and logging) and exposes a single runtime module
//! boundary for the contract, key, event, and rendering primitives.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod runtime;
pub mod telemetry;
