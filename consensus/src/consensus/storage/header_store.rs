//! In-memory header store
//!
//! Keeps accepted headers keyed by hash. Readers get owned copies, so a
//! difficulty check never observes a header while it is being written.

use consensus_core::api::HeaderStoreReader;
use consensus_core::errors::{StoreError, StoreResult};
use consensus_core::header::{BlockHeader, StoredHeader};
use consensus_core::Hash;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

/// Header store for consensus storage
pub struct HeaderStore {
    headers: RwLock<HashMap<Hash, StoredHeader>>,
}

impl HeaderStore {
    /// Create a new header store
    pub fn new() -> Self {
        Self { headers: RwLock::new(HashMap::new()) }
    }

    /// Store the genesis header at height zero
    pub fn insert_genesis(&self, header: BlockHeader) -> StoreResult<StoredHeader> {
        if !header.is_genesis() {
            return Err(StoreError::InvalidHeader(format!(
                "genesis header {} links to previous header {}",
                header.hash(), header.prev_hash()
            )));
        }
        let stored = StoredHeader::genesis(header);
        self.insert(stored.clone())?;
        Ok(stored)
    }

    /// Store a header extending an already stored one, deriving its height and chain work
    pub fn append(&self, header: BlockHeader) -> StoreResult<StoredHeader> {
        let mut headers = self.headers.write();
        if headers.contains_key(&header.hash()) {
            return Err(StoreError::AlreadyExists(header.hash()));
        }
        let prev = headers.get(&header.prev_hash()).ok_or(StoreError::NotFound(header.prev_hash()))?;
        let stored = prev.build_next(header);
        trace!(hash = %stored.hash(), height = stored.height, "storing header");
        headers.insert(stored.hash(), stored.clone());
        Ok(stored)
    }

    /// Store a header snapshot as is, e.g. a checkpoint whose ancestors were never downloaded
    pub fn insert(&self, stored: StoredHeader) -> StoreResult<()> {
        let hash = stored.hash();
        let mut headers = self.headers.write();
        if headers.contains_key(&hash) {
            return Err(StoreError::AlreadyExists(hash));
        }
        trace!(hash = %hash, height = stored.height, "storing header");
        headers.insert(hash, stored);
        Ok(())
    }

    /// Get a header by hash
    pub fn get(&self, hash: &Hash) -> Option<StoredHeader> {
        self.headers.read().get(hash).cloned()
    }

    /// Remove a header, as pruning does
    pub fn remove(&self, hash: &Hash) -> Option<StoredHeader> {
        let removed = self.headers.write().remove(hash);
        if removed.is_some() {
            trace!(hash = %hash, "pruned header");
        }
        removed
    }

    /// Remove every header below `height`, returning how many were dropped
    pub fn prune_below(&self, height: u64) -> usize {
        let mut headers = self.headers.write();
        let before = headers.len();
        headers.retain(|_, stored| stored.height >= height);
        before - headers.len()
    }

    /// Get number of stored headers
    pub fn len(&self) -> usize {
        self.headers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.read().is_empty()
    }
}

impl Default for HeaderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HeaderStoreReader for HeaderStore {
    fn get_header(&self, hash: &Hash) -> StoreResult<StoredHeader> {
        self.get(hash).ok_or(StoreError::NotFound(*hash))
    }

    fn has_header(&self, hash: &Hash) -> StoreResult<bool> {
        Ok(self.headers.read().contains_key(hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_core::ZERO_HASH;

    fn create_test_header(prev_hash: Hash, timestamp: u32) -> BlockHeader {
        BlockHeader::new_finalized(1, prev_hash, ZERO_HASH, timestamp, 0x1d00ffff, 0)
    }

    #[test]
    fn test_genesis_and_append() {
        let store = HeaderStore::new();
        let genesis = store.insert_genesis(create_test_header(ZERO_HASH, 1000)).unwrap();
        let next = store.append(create_test_header(genesis.hash(), 1600)).unwrap();

        assert_eq!(next.height, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_header(&next.hash()).unwrap(), next);
        assert!(next.chain_work > genesis.chain_work);
    }

    #[test]
    fn test_genesis_must_not_link_back() {
        let store = HeaderStore::new();
        let result = store.insert_genesis(create_test_header(Hash::from_le_u64([1, 0, 0, 0]), 1000));
        assert!(matches!(result, Err(StoreError::InvalidHeader(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_requires_parent() {
        let store = HeaderStore::new();
        let orphan_parent = Hash::from_le_u64([9, 0, 0, 0]);
        let result = store.append(create_test_header(orphan_parent, 1000));
        assert_eq!(result, Err(StoreError::NotFound(orphan_parent)));
    }

    #[test]
    fn test_duplicate_rejected() {
        let store = HeaderStore::new();
        let genesis = store.insert_genesis(create_test_header(ZERO_HASH, 1000)).unwrap();
        let header = create_test_header(genesis.hash(), 1600);
        store.append(header.clone()).unwrap();
        assert_eq!(store.append(header.clone()), Err(StoreError::AlreadyExists(header.hash())));
    }

    #[test]
    fn test_missing_header() {
        let store = HeaderStore::new();
        let hash = Hash::from_le_u64([3, 0, 0, 0]);
        assert_eq!(store.get_header(&hash), Err(StoreError::NotFound(hash)));
        assert!(!store.has_header(&hash).unwrap());
    }

    #[test]
    fn test_prune_below() {
        let store = HeaderStore::new();
        let mut tip = store.insert_genesis(create_test_header(ZERO_HASH, 1000)).unwrap();
        for i in 1..=5 {
            tip = store.append(create_test_header(tip.hash(), 1000 + i * 600)).unwrap();
        }
        assert_eq!(store.prune_below(3), 3);
        assert_eq!(store.len(), 3);
        assert!(store.has_header(&tip.hash()).unwrap());
        assert!(store.remove(&tip.hash()).is_some());
        assert!(store.remove(&tip.hash()).is_none());
    }
}
