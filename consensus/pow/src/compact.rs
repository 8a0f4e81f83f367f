//! Compact target codec
//!
//! A compact target packs a 256-bit target into 32 bits: the high byte is a
//! base-256 exponent (the length of the value in bytes) and the low three
//! bytes are the mantissa. Bit 23 of the mantissa is a sign bit inherited from
//! the signed big-number format; targets never use it.

use primitive_types::U256;
use thiserror::Error;

/// Full precision difficulty target. A header hash must not exceed it.
pub type Target = U256;

/// Sign bit of the 24-bit mantissa
pub const SIGN_BIT: u32 = 0x0080_0000;

/// Mantissa bits without the sign
pub const MANTISSA_MASK: u32 = 0x007f_ffff;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactTargetError {
    #[error("compact target {0:#010x} has the sign bit set")]
    Negative(u32),

    #[error("compact target {0:#010x} overflows 256 bits")]
    Overflow(u32),

    /// Decodes cleanly, but no header hash can meet a zero target
    #[error("compact target {0:#010x} decodes to zero")]
    Zero(u32),
}

/// Convert compact bits representation to a target.
pub fn bits_to_target(bits: u32) -> Result<Target, CompactTargetError> {
    let size = (bits >> 24) as usize;
    let mut word = bits & MANTISSA_MASK;

    // Sign and overflow are judged on the mantissa after the small-exponent
    // right shift, so e.g. 0x00923456 decodes to zero rather than failing.
    if size <= 3 {
        word >>= 8 * (3 - size);
    }
    if word == 0 {
        return Ok(Target::zero());
    }
    if bits & SIGN_BIT != 0 {
        return Err(CompactTargetError::Negative(bits));
    }
    if size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32) {
        return Err(CompactTargetError::Overflow(bits));
    }

    if size <= 3 {
        Ok(Target::from(word))
    } else {
        Ok(Target::from(word) << (8 * (size - 3)))
    }
}

/// Convert a target to its compact bits representation.
///
/// Uses the smallest exponent whose mantissa fits in three bytes with the sign
/// bit clear. Bits below the mantissa are truncated, so the encoding is lossy.
pub fn target_to_bits(target: &Target) -> u32 {
    let mut size = (target.bits() + 7) / 8;
    let mut compact = if size <= 3 {
        (target.low_u64() << (8 * (3 - size))) as u32
    } else {
        (*target >> (8 * (size - 3))).low_u32()
    };

    if compact & SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | ((size as u32) << 24)
}
