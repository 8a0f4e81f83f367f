use crate::{Hash, Target};
use consensus_pow::CompactTargetError;
use std::fmt;
use thiserror::Error;

/// Difficulty rule that accepted or rejected a candidate header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifficultyRule {
    /// Timestamp gap allowed the candidate to declare the network's maximum target
    MinimumDifficultyException,
    /// Previous height is below the policy threshold, retargeting is not enforced
    BootstrapSkip,
    /// Target recomputed from the elapsed interval timespan
    RetargetBoundary,
    /// Target carried over unchanged from the previous header
    NonBoundaryEquality,
}

impl fmt::Display for DifficultyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyRule::MinimumDifficultyException => write!(f, "minimum-difficulty exception"),
            DifficultyRule::BootstrapSkip => write!(f, "bootstrap skip"),
            DifficultyRule::RetargetBoundary => write!(f, "retarget boundary"),
            DifficultyRule::NonBoundaryEquality => write!(f, "non-boundary equality"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DifficultyError {
    #[error("Malformed compact target: {0}")]
    MalformedCompactTarget(#[from] CompactTargetError),

    #[error("Ancestor {depth} blocks behind {start} not found, missing header {missing}")]
    AncestorNotFound { start: Hash, depth: u64, missing: Hash },

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Difficulty mismatch ({rule}) at height {height}: expected bits {expected:#010x}, got {actual:#010x}")]
    DifficultyMismatch { rule: DifficultyRule, height: u64, expected: u32, actual: u32 },

    #[error("Target {target:#x} exceeds network maximum {max_target:#x}")]
    TargetExceedsMaximum { target: Target, max_target: Target },
}

pub type DifficultyResult<T> = Result<T, DifficultyError>;

/// Failures reported by a header storage back-end
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Header not found: {0}")]
    NotFound(Hash),

    #[error("Header already stored: {0}")]
    AlreadyExists(Hash),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse network config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed maximum target: {0}")]
    MaxTarget(#[from] CompactTargetError),

    #[error("Invalid network parameters: {0}")]
    Invalid(String),
}
