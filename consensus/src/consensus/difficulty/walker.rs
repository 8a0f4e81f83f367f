//! Backward traversal of the header chain

use consensus_core::api::HeaderStoreReader;
use consensus_core::errors::{DifficultyError, DifficultyResult, StoreError};
use consensus_core::header::StoredHeader;
use tracing::trace;

/// Follows previous-hash links through a header store
pub struct ChainWalker<'a, S: HeaderStoreReader + ?Sized> {
    store: &'a S,
}

impl<'a, S: HeaderStoreReader + ?Sized> ChainWalker<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Header `steps` links behind `start`. Zero steps returns `start` itself.
    ///
    /// Fails with `AncestorNotFound` when the chain runs out, either because
    /// genesis is reached early or because the store no longer holds a link.
    pub fn ancestor(&self, start: &StoredHeader, steps: u64) -> DifficultyResult<StoredHeader> {
        let mut cursor = start.clone();
        for step in 0..steps {
            let prev_hash = cursor.prev_hash();
            if cursor.height == 0 || prev_hash.is_zero() {
                return Err(DifficultyError::AncestorNotFound { start: start.hash(), depth: steps, missing: prev_hash });
            }
            cursor = self.store.get_header(&prev_hash).map_err(|e| match e {
                StoreError::NotFound(missing) => {
                    DifficultyError::AncestorNotFound { start: start.hash(), depth: steps, missing }
                }
                other => DifficultyError::Storage(other),
            })?;
            trace!(step = step + 1, height = cursor.height, hash = %cursor.hash(), "walked back");
        }
        Ok(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::storage::HeaderStore;
    use consensus_core::errors::StoreResult;
    use consensus_core::header::BlockHeader;
    use consensus_core::{Hash, ZERO_HASH};

    fn build_chain(store: &HeaderStore, len: u32) -> Vec<StoredHeader> {
        let genesis = BlockHeader::new_finalized(1, ZERO_HASH, ZERO_HASH, 1000, 0x1d00ffff, 0);
        let mut chain = vec![store.insert_genesis(genesis).unwrap()];
        for i in 1..len {
            let prev = chain.last().unwrap().hash();
            let header = BlockHeader::new_finalized(1, prev, ZERO_HASH, 1000 + i * 600, 0x1d00ffff, i);
            chain.push(store.append(header).unwrap());
        }
        chain
    }

    #[test]
    fn test_zero_steps_returns_start() {
        let store = HeaderStore::new();
        let chain = build_chain(&store, 3);
        let walker = ChainWalker::new(&store);
        assert_eq!(walker.ancestor(&chain[2], 0).unwrap(), chain[2]);
    }

    #[test]
    fn test_walks_back_to_genesis() {
        let store = HeaderStore::new();
        let chain = build_chain(&store, 10);
        let walker = ChainWalker::new(&store);

        assert_eq!(walker.ancestor(&chain[9], 1).unwrap(), chain[8]);
        assert_eq!(walker.ancestor(&chain[9], 4).unwrap(), chain[5]);
        assert_eq!(walker.ancestor(&chain[9], 9).unwrap(), chain[0]);
    }

    #[test]
    fn test_past_genesis_fails() {
        let store = HeaderStore::new();
        let chain = build_chain(&store, 3);
        let walker = ChainWalker::new(&store);

        let err = walker.ancestor(&chain[2], 3).unwrap_err();
        assert_eq!(err, DifficultyError::AncestorNotFound { start: chain[2].hash(), depth: 3, missing: ZERO_HASH });
    }

    #[test]
    fn test_pruned_link_reports_missing_hash() {
        let store = HeaderStore::new();
        let chain = build_chain(&store, 6);
        store.remove(&chain[3].hash());
        let walker = ChainWalker::new(&store);

        assert_eq!(walker.ancestor(&chain[5], 1).unwrap(), chain[4]);
        let err = walker.ancestor(&chain[5], 4).unwrap_err();
        assert_eq!(
            err,
            DifficultyError::AncestorNotFound { start: chain[5].hash(), depth: 4, missing: chain[3].hash() }
        );
    }

    struct FailingStore;

    impl HeaderStoreReader for FailingStore {
        fn get_header(&self, _hash: &Hash) -> StoreResult<StoredHeader> {
            Err(StoreError::Backend("disk unavailable".to_string()))
        }
    }

    #[test]
    fn test_backend_failure_is_storage_error() {
        let store = HeaderStore::new();
        let chain = build_chain(&store, 2);
        let walker = ChainWalker::new(&FailingStore);

        let err = walker.ancestor(&chain[1], 1).unwrap_err();
        assert_eq!(err, DifficultyError::Storage(StoreError::Backend("disk unavailable".to_string())));
    }
}
