//! Core types for proof-of-work difficulty validation
//!
//! Block headers and their stored form, network parameter sets, the storage
//! contract used to read chain history, and the error types shared by the
//! consensus crates.

pub mod api;
pub mod config;
pub mod errors;
pub mod hashing;
pub mod header;
pub mod network;

pub use crypto_hashes::{Hash, ZERO_HASH};
pub use consensus_pow::Target;

/// Cumulative chain work type
pub type ChainWork = primitive_types::U256;
