use super::HashWriter;
use crate::header::BlockHeader;
use crate::Hash;

/// Size of the canonical header serialization
pub const HEADER_SIZE: usize = 80;

/// Canonical 80-byte serialization: version, previous hash, merkle root,
/// timestamp, bits and nonce, integers little-endian.
pub fn serialize_header(header: &BlockHeader) -> [u8; HEADER_SIZE] {
    let mut bytes = [0u8; HEADER_SIZE];
    bytes[0..4].copy_from_slice(&header.version().to_le_bytes());
    bytes[4..36].copy_from_slice(header.prev_hash().as_bytes());
    bytes[36..68].copy_from_slice(header.merkle_root().as_bytes());
    bytes[68..72].copy_from_slice(&header.timestamp().to_le_bytes());
    bytes[72..76].copy_from_slice(&header.bits().to_le_bytes());
    bytes[76..80].copy_from_slice(&header.nonce().to_le_bytes());
    bytes
}

/// Computes the hash of a block header (double SHA256 of its serialization)
pub fn calculate_header_hash(header: &BlockHeader) -> Hash {
    let mut hasher = HashWriter::new();
    hasher.update(serialize_header(header));
    Hash::from_bytes(hasher.finalize_double())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ZERO_HASH;

    fn reversed_hex(bytes: &[u8; 32]) -> String {
        let mut display = *bytes;
        display.reverse();
        hex::encode(display)
    }

    #[test]
    fn test_mainnet_genesis_hash() {
        let mut merkle = [0u8; 32];
        hex::decode_to_slice(
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b",
            &mut merkle,
        )
        .unwrap();
        merkle.reverse();

        let header = BlockHeader::new_finalized(
            1,
            ZERO_HASH,
            Hash::from_bytes(merkle),
            1231006505,
            0x1d00ffff,
            2083236893,
        );
        assert_eq!(
            reversed_hex(header.hash().as_bytes()),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
    }

    #[test]
    fn test_serialization_layout() {
        let header = BlockHeader::new_finalized(
            2,
            Hash::from_le_u64([7, 0, 0, 0]),
            ZERO_HASH,
            0x0102_0304,
            0x1d00ffff,
            9,
        );
        let bytes = serialize_header(&header);
        assert_eq!(&bytes[0..4], &2i32.to_le_bytes());
        assert_eq!(bytes[4], 7);
        assert_eq!(&bytes[68..72], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[72..76], &[0xff, 0xff, 0x00, 0x1d]);
        assert_eq!(&bytes[76..80], &9u32.to_le_bytes());
    }
}
