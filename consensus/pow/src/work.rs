use crate::compact::{bits_to_target, Target};
use primitive_types::U256;

/// Expected number of hashes needed to find a block at `target`.
///
/// Computed as `2^256 / (target + 1)`, rewritten as `!target / (target + 1) + 1`
/// so it fits in 256 bits. A zero target has no defined work and yields zero.
pub fn target_work(target: &Target) -> U256 {
    if target.is_zero() {
        return U256::zero();
    }
    match target.checked_add(U256::one()) {
        Some(divisor) => (!*target / divisor) + U256::one(),
        // target == U256::MAX, 2^256 / 2^256
        None => U256::one(),
    }
}

/// Work of a block declaring the compact target `bits`. Malformed targets count as no work.
pub fn calc_work(bits: u32) -> U256 {
    match bits_to_target(bits) {
        Ok(target) => target_work(&target),
        Err(_) => U256::zero(),
    }
}
