//! Storage module for consensus
//!
//! In-memory header storage implementing the read contract used by the
//! difficulty rules.

pub mod header_store;

pub use header_store::HeaderStore;
