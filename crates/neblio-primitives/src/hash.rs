//! Consensus hashing.
//!
//! Transaction ids, kernel hashes, and the stake-modifier checksum chain all
//! use double SHA-256 over the consensus serialization. Block hashes use
//! `scrypt_1024_1_1_256` over the 80-byte header (see [`scrypt_block_hash`]).

use crate::uint256::Uint256;
use scrypt::Params as ScryptParams;
use sha2::{Digest, Sha256};

/// Double SHA-256.
pub fn sha256d(data: &[u8]) -> Uint256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    Uint256::from_le_bytes(out)
}

/// Incremental hash writer over the consensus serialization.
///
/// Mirrors the original's `CDataStream` + `Hash()` pattern: values are
/// appended little-endian and the accumulated bytes are double-SHA256'd.
#[derive(Default)]
pub struct HashWriter {
    buf: Vec<u8>,
}

impl HashWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn write_u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn write_uint256(&mut self, v: &Uint256) -> &mut Self {
        self.buf.extend_from_slice(v.as_le_bytes());
        self
    }

    pub fn finalize(&self) -> Uint256 {
        sha256d(&self.buf)
    }
}

/// The scrypt block hash: `scrypt_1024_1_1_256` with the serialized header
/// as both password and salt.
///
/// Consensus-critical; delegates to the RustCrypto implementation rather
/// than reimplementing the KDF.
pub fn scrypt_block_hash(header_bytes: &[u8]) -> Uint256 {
    // N = 1024 (log2 = 10), r = 1, p = 1, 32-byte output.
    let params = ScryptParams::new(10, 1, 1, 32).expect("static scrypt parameters are valid");
    let mut out = [0u8; 32];
    scrypt::scrypt(header_bytes, header_bytes, &params, &mut out)
        .expect("output length is non-zero");
    Uint256::from_le_bytes(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256d_empty() {
        // SHA256d("") is a fixed vector.
        assert_eq!(
            sha256d(b"").to_string(),
            "56944c5d3f98413ef45cf54545538103cc9f298e0575820ad3591376e2e0f65d"
        );
    }

    #[test]
    fn test_hash_writer_matches_buffer_hash() {
        let mut w = HashWriter::new();
        w.write_u64(0x1122334455667788)
            .write_u32(0xdeadbeef)
            .write_uint256(&Uint256::ZERO);

        let mut manual = Vec::new();
        manual.extend_from_slice(&0x1122334455667788u64.to_le_bytes());
        manual.extend_from_slice(&0xdeadbeefu32.to_le_bytes());
        manual.extend_from_slice(&[0u8; 32]);

        assert_eq!(w.finalize(), sha256d(&manual));
    }

    #[test]
    fn test_scrypt_block_hash_is_deterministic() {
        let header = [0x42u8; 80];
        assert_eq!(scrypt_block_hash(&header), scrypt_block_hash(&header));
        assert_ne!(scrypt_block_hash(&header), scrypt_block_hash(&[0u8; 80]));
    }
}
