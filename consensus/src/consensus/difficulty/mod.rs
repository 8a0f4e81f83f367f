//! Difficulty adjustment module for consensus
//!
//! This module validates the difficulty target declared by a candidate block
//! against the retargeting rules of its network.

pub mod verifier;
pub mod walker;


pub use verifier::{check_difficulty_transition, DifficultyVerifier};
pub use walker::ChainWalker;
