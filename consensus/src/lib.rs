//! Difficulty transition validation for a proof-of-work header chain
//!
//! This library checks that a candidate header declares the difficulty target
//! the network's retargeting policy requires, walking chain history through a
//! caller supplied header store.

pub mod consensus;

// Re-export key types for easier access
pub use consensus_core::Hash;
pub use consensus::difficulty::{check_difficulty_transition, ChainWalker, DifficultyVerifier};
pub use consensus::storage::HeaderStore;
