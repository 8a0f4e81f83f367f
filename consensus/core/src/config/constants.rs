//! Consensus constants for the built-in networks

/// Blocks between difficulty recomputations
pub const RETARGET_INTERVAL: u64 = 2016;

/// Expected seconds between blocks
pub const TARGET_SPACING: u64 = 10 * 60;

/// Expected seconds for one retarget interval (two weeks)
pub const TARGET_TIMESPAN: u64 = RETARGET_INTERVAL * TARGET_SPACING;

/// Compact form of the mainnet maximum target
pub const MAINNET_MAX_TARGET_BITS: u32 = 0x1d00_ffff;

/// Compact form of the testnet maximum target
pub const TESTNET_MAX_TARGET_BITS: u32 = 0x1e00_ffff;

/// Testnet enforces standard retargeting once the previous block is at or above this height
pub const TESTNET_RETARGET_ENFORCEMENT_HEIGHT: u64 = 99_999;

/// A block arriving more than this many spacings after its parent may use minimum difficulty
pub const MIN_DIFFICULTY_GAP_SPACINGS: u64 = 2;

/// The recomputed timespan is clamped to within this factor of the target timespan
pub const RETARGET_CLAMP_FACTOR: u64 = 4;

/// Upper bound accepted for configured timespans and spacings, in seconds
pub const MAX_CONFIG_SECONDS: u64 = u32::MAX as u64;
