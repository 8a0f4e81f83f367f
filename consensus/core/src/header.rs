use crate::hashing;
use crate::{ChainWork, Hash, Target};
use consensus_pow::{bits_to_target, calc_work, CompactTargetError};
use serde::{Deserialize, Serialize};

/// Block header as carried on the wire.
///
/// Fields are read-only so the cached hash always matches them. Deserializing
/// recomputes the hash rather than trusting a serialized one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "HeaderFields")]
pub struct BlockHeader {
    hash: Hash,
    version: i32,
    prev_hash: Hash,
    merkle_root: Hash,
    timestamp: u32,
    bits: u32,
    nonce: u32,
}

impl BlockHeader {
    pub fn new_finalized(
        version: i32,
        prev_hash: Hash,
        merkle_root: Hash,
        timestamp: u32,
        bits: u32,
        nonce: u32,
    ) -> Self {
        let mut header = Self { hash: Hash::zeroed(), version, prev_hash, merkle_root, timestamp, bits, nonce };
        header.hash = hashing::header::calculate_header_hash(&header);
        header
    }

    /// Cached double SHA-256 of the serialized header
    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn prev_hash(&self) -> Hash {
        self.prev_hash
    }

    pub fn merkle_root(&self) -> Hash {
        self.merkle_root
    }

    /// Seconds since the unix epoch
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Compact difficulty target
    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn nonce(&self) -> u32 {
        self.nonce
    }

    /// Full target decoded from `bits`
    pub fn target(&self) -> Result<Target, CompactTargetError> {
        bits_to_target(self.bits)
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_hash.is_zero()
    }
}

/// Serialized header fields, without the derived hash
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HeaderFields {
    version: i32,
    prev_hash: Hash,
    merkle_root: Hash,
    timestamp: u32,
    bits: u32,
    nonce: u32,
}

impl From<HeaderFields> for BlockHeader {
    fn from(f: HeaderFields) -> Self {
        BlockHeader::new_finalized(f.version, f.prev_hash, f.merkle_root, f.timestamp, f.bits, f.nonce)
    }
}

/// A header accepted into the chain, with its height and the cumulative work
/// of the chain ending at it. Values are snapshots; stores hand out copies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredHeader {
    pub header: BlockHeader,
    pub height: u64,
    pub chain_work: ChainWork,
}

impl StoredHeader {
    pub fn new(header: BlockHeader, height: u64, chain_work: ChainWork) -> Self {
        Self { header, height, chain_work }
    }

    /// Height zero entry carrying only the genesis block's own work
    pub fn genesis(header: BlockHeader) -> Self {
        let chain_work = calc_work(header.bits());
        Self { header, height: 0, chain_work }
    }

    /// Entry for `header` extending this one
    pub fn build_next(&self, header: BlockHeader) -> Self {
        let chain_work = self.chain_work.saturating_add(calc_work(header.bits()));
        Self { header, height: self.height + 1, chain_work }
    }

    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    pub fn prev_hash(&self) -> Hash {
        self.header.prev_hash()
    }

    pub fn timestamp(&self) -> u32 {
        self.header.timestamp()
    }

    pub fn bits(&self) -> u32 {
        self.header.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZERO_HASH;

    fn header(prev_hash: Hash, timestamp: u32, bits: u32) -> BlockHeader {
        BlockHeader::new_finalized(1, prev_hash, ZERO_HASH, timestamp, bits, 0)
    }

    #[test]
    fn test_hash_changes_with_fields() {
        let a = header(ZERO_HASH, 1000, 0x1d00ffff);
        let b = header(ZERO_HASH, 1001, 0x1d00ffff);
        assert_ne!(a.hash(), b.hash());

        let c = BlockHeader::new_finalized(1, ZERO_HASH, ZERO_HASH, 1000, 0x1d00ffff, 42);
        assert_ne!(a.hash(), c.hash());
        assert_eq!(c.nonce(), 42);
    }

    #[test]
    fn test_deserialize_recomputes_hash() {
        let original = header(ZERO_HASH, 1000, 0x1d00ffff);
        let mut value = serde_json::to_value(&original).unwrap();
        assert!(value.get("prevHash").is_some());

        // A tampered field cannot keep the old hash
        value["bits"] = serde_json::json!(0x1c00ffffu32);
        value["hash"] = serde_json::to_value(original.hash()).unwrap();
        let tampered: BlockHeader = serde_json::from_value(value).unwrap();
        assert_eq!(tampered.bits(), 0x1c00ffff);
        assert_eq!(tampered, header(ZERO_HASH, 1000, 0x1c00ffff));
        assert_ne!(tampered.hash(), original.hash());

        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(serde_json::from_str::<BlockHeader>(&json).unwrap(), original);
    }

    #[test]
    fn test_genesis_detection() {
        let genesis = header(ZERO_HASH, 1000, 0x1d00ffff);
        assert!(genesis.is_genesis());
        assert!(!header(genesis.hash(), 1600, 0x1d00ffff).is_genesis());
    }

    #[test]
    fn test_build_next_accumulates_work() {
        let genesis = StoredHeader::genesis(header(ZERO_HASH, 1000, 0x1d00ffff));
        assert_eq!(genesis.height, 0);
        assert_eq!(genesis.chain_work, calc_work(0x1d00ffff));

        let next = genesis.build_next(header(genesis.hash(), 1600, 0x1c00ffff));
        assert_eq!(next.height, 1);
        assert_eq!(next.chain_work, calc_work(0x1d00ffff) + calc_work(0x1c00ffff));
        assert!(next.chain_work > genesis.chain_work);
        assert_eq!(next.prev_hash(), genesis.hash());
    }

    #[test]
    fn test_target_decodes_bits() {
        let h = header(ZERO_HASH, 1000, 0x1e00ffff);
        assert_eq!(h.target().unwrap(), Target::from(0xffffu64) << 216);
        let bad = header(ZERO_HASH, 1000, 0x04923456);
        assert!(bad.target().is_err());
    }
}
