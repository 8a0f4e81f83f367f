//! Consensus module for the proof-of-work header chain
//!
//! Difficulty retargeting rules and the header storage they read from.

pub mod difficulty;
pub mod storage;

pub use difficulty::{check_difficulty_transition, ChainWalker, DifficultyVerifier};
pub use storage::HeaderStore;
