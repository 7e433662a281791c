//! Shared email-site domain primitives.
//!
//! This crate owns the stored-message contracts, key derivation, inbound event
//! decoding, and page rendering. It intentionally excludes AWS SDK and Lambda
//! runtime concerns.

pub mod contract;
pub mod error;
pub mod events;
pub mod keys;
pub mod render;
