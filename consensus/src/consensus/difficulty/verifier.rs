//! Difficulty transition verifier
//!
//! Decides whether a candidate header declares the target its network
//! requires, given the previous stored header and access to chain history.

use super::walker::ChainWalker;
use consensus_core::api::HeaderStoreReader;
use consensus_core::config::constants::RETARGET_CLAMP_FACTOR;
use consensus_core::config::NetworkParams;
use consensus_core::errors::{DifficultyError, DifficultyResult, DifficultyRule};
use consensus_core::header::{BlockHeader, StoredHeader};
use consensus_core::Target;
use consensus_pow::{bits_to_target, target_to_bits, CompactTargetError};
use primitive_types::{U256, U512};
use tracing::{debug, info, warn};

/// Validates difficulty transitions for one network
#[derive(Clone, Debug)]
pub struct DifficultyVerifier {
    params: NetworkParams,
}

impl DifficultyVerifier {
    pub fn new(params: NetworkParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    /// Check `candidate`, which extends `prev`, and report the rule that accepted it
    pub fn evaluate<S: HeaderStoreReader + ?Sized>(
        &self,
        prev: &StoredHeader,
        candidate: &BlockHeader,
        store: &S,
    ) -> DifficultyResult<DifficultyRule> {
        let height = prev.height + 1;
        let policy = self.params.exception_policy();

        // Every path, the bootstrap skip included, rejects malformed or too weak targets
        let declared = self.checked_declared_target(candidate)?;

        if policy.allows_min_difficulty_after_gap() && self.is_after_gap(prev, candidate) {
            let max_bits = self.params.max_target_bits();
            if declared != bits_to_target(max_bits)? {
                let rule = DifficultyRule::MinimumDifficultyException;
                return Err(self.mismatch(rule, height, max_bits, candidate.bits()));
            }
            let gap = candidate.timestamp() as i64 - prev.timestamp() as i64;
            debug!(height, gap, "minimum difficulty block after timestamp gap");
            return Ok(DifficultyRule::MinimumDifficultyException);
        }

        if let Some(threshold) = policy.bootstrap_threshold() {
            if prev.height < threshold {
                debug!(height, threshold, "retargeting not enforced below threshold");
                return Ok(DifficultyRule::BootstrapSkip);
            }
        }

        if !self.params.is_retarget_height(height) {
            if candidate.bits() != prev.bits() {
                return Err(self.mismatch(DifficultyRule::NonBoundaryEquality, height, prev.bits(), candidate.bits()));
            }
            return Ok(DifficultyRule::NonBoundaryEquality);
        }

        let expected_bits = target_to_bits(&self.boundary_target(prev, store)?);
        if declared != bits_to_target(expected_bits)? {
            return Err(self.mismatch(DifficultyRule::RetargetBoundary, height, expected_bits, candidate.bits()));
        }
        Ok(DifficultyRule::RetargetBoundary)
    }

    /// Check `candidate`, which extends `prev`
    pub fn check_difficulty_transition<S: HeaderStoreReader + ?Sized>(
        &self,
        prev: &StoredHeader,
        candidate: &BlockHeader,
        store: &S,
    ) -> DifficultyResult<()> {
        self.evaluate(prev, candidate, store).map(|_| ())
    }

    /// Target the standard rule requires of the block after `prev`
    pub fn calculate_next_target<S: HeaderStoreReader + ?Sized>(
        &self,
        prev: &StoredHeader,
        store: &S,
    ) -> DifficultyResult<Target> {
        if self.params.is_retarget_height(prev.height + 1) {
            let target = self.boundary_target(prev, store)?;
            Ok(bits_to_target(target_to_bits(&target))?)
        } else {
            Ok(bits_to_target(prev.bits())?)
        }
    }

    /// Compact form of [`Self::calculate_next_target`]
    pub fn next_target_bits<S: HeaderStoreReader + ?Sized>(
        &self,
        prev: &StoredHeader,
        store: &S,
    ) -> DifficultyResult<u32> {
        Ok(target_to_bits(&self.calculate_next_target(prev, store)?))
    }

    /// Recompute the target from the timespan between `interval_start` and `prev`.
    ///
    /// The timespan is clamped to a factor of four either way, and the result
    /// never exceeds the network maximum.
    pub fn retarget(&self, prev: &StoredHeader, interval_start: &StoredHeader) -> DifficultyResult<Target> {
        let target_timespan = self.params.target_timespan() as i64;
        let factor = RETARGET_CLAMP_FACTOR as i64;
        let actual_timespan = (prev.timestamp() as i64 - interval_start.timestamp() as i64)
            .clamp(target_timespan / factor, target_timespan * factor);

        let old_target = bits_to_target(prev.bits())?;
        // Both factors fit in 256 bits, so the product cannot overflow 512
        let new_target = old_target.full_mul(U256::from(actual_timespan as u64)) / U512::from(target_timespan as u64);

        let max_target = self.params.max_target();
        if new_target > U512::from(max_target) {
            info!(height = prev.height + 1, "difficulty hit proof of work limit");
            return Ok(max_target);
        }

        let mut bytes = [0u8; 64];
        new_target.to_big_endian(&mut bytes);
        Ok(U256::from_big_endian(&bytes[32..]))
    }

    fn boundary_target<S>(&self, prev: &StoredHeader, store: &S) -> DifficultyResult<Target>
    where
        S: HeaderStoreReader + ?Sized,
    {
        let interval_start = ChainWalker::new(store).ancestor(prev, self.params.retarget_interval() - 1)?;
        self.retarget(prev, &interval_start)
    }

    fn is_after_gap(&self, prev: &StoredHeader, candidate: &BlockHeader) -> bool {
        candidate.timestamp() as i64 > prev.timestamp() as i64 + self.params.min_difficulty_gap() as i64
    }

    /// Decoded candidate target, rejected when zero or weaker than the network maximum
    fn checked_declared_target(&self, candidate: &BlockHeader) -> DifficultyResult<Target> {
        let bits = candidate.bits();
        let target = bits_to_target(bits)?;
        if target.is_zero() {
            warn!(hash = %candidate.hash(), bits, "declared target is zero");
            return Err(CompactTargetError::Zero(bits).into());
        }
        let max_target = self.params.max_target();
        if target > max_target {
            warn!(hash = %candidate.hash(), bits, "declared target exceeds network maximum");
            return Err(DifficultyError::TargetExceedsMaximum { target, max_target });
        }
        Ok(target)
    }

    fn mismatch(&self, rule: DifficultyRule, height: u64, expected: u32, actual: u32) -> DifficultyError {
        warn!(%rule, height, expected, actual, "difficulty mismatch");
        DifficultyError::DifficultyMismatch { rule, height, expected, actual }
    }
}

/// Validate the difficulty target declared by `candidate`, the block after `prev`
pub fn check_difficulty_transition<S: HeaderStoreReader + ?Sized>(
    prev: &StoredHeader,
    candidate: &BlockHeader,
    params: &NetworkParams,
    store: &S,
) -> DifficultyResult<()> {
    DifficultyVerifier::new(params.clone()).check_difficulty_transition(prev, candidate, store)
}
