//! Proof-of-work target arithmetic
//!
//! Conversion between the compact 32-bit "bits" encoding carried in block
//! headers and full 256-bit targets, plus the per-block work derived from a
//! target.

pub mod compact;
pub mod work;

pub use compact::{bits_to_target, target_to_bits, CompactTargetError, Target};
pub use work::{calc_work, target_work};
