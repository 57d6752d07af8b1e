//! Block header and block.

use crate::encode::Encoder;
use crate::hash::{scrypt_block_hash, sha256d};
use crate::transaction::Transaction;
use crate::uint256::Uint256;
use std::fmt;

/// The 80-byte block header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockHeader {
    pub version: i32,
    pub hash_prev_block: Uint256,
    pub hash_merkle_root: Uint256,
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Serialized size on the wire and in block files; offsets into a block
    /// file skip this many bytes to reach the first transaction.
    pub const SERIALIZED_SIZE: u32 = 80;

    pub fn serialize(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_i32_le(self.version);
        enc.write_uint256(&self.hash_prev_block);
        enc.write_uint256(&self.hash_merkle_root);
        enc.write_u32_le(self.time);
        enc.write_u32_le(self.bits);
        enc.write_u32_le(self.nonce);
        enc.into_inner()
    }

    /// Block hash: scrypt over the serialized header, not SHA-256d.
    pub fn hash(&self) -> Uint256 {
        scrypt_block_hash(&self.serialize())
    }
}

/// A block: header, transactions, and the staker's signature over the block
/// hash (empty for proof-of-work blocks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub vtx: Vec<Transaction>,
    pub signature: Vec<u8>,
}

impl Block {
    pub fn new(header: BlockHeader, vtx: Vec<Transaction>) -> Self {
        Block {
            header,
            vtx,
            signature: Vec::new(),
        }
    }

    pub fn hash(&self) -> Uint256 {
        self.header.hash()
    }

    pub fn is_proof_of_stake(&self) -> bool {
        self.vtx.len() > 1 && self.vtx[1].is_coin_stake()
    }

    pub fn is_proof_of_work(&self) -> bool {
        !self.is_proof_of_stake()
    }

    /// Entropy bit contributed to the stake modifier: the lowest bit of the
    /// block hash.
    pub fn stake_entropy_bit(hash: &Uint256) -> u64 {
        hash.low_u64() & 1
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block(hash={}, ver=0x{:08x}, prev={}, merkle={}, nTime={}, nBits={:08x}, nNonce={}, vtx={})",
            self.hash(),
            self.header.version,
            self.header.hash_prev_block,
            self.header.hash_merkle_root,
            self.header.time,
            self.header.bits,
            self.header.nonce,
            self.vtx.len()
        )
    }
}

/// Merkle root over transaction ids, pairing with SHA-256d and duplicating
/// the last node at odd levels.
pub fn block_merkle_root(txids: &[Uint256]) -> Uint256 {
    if txids.is_empty() {
        return Uint256::ZERO;
    }
    let mut level: Vec<Uint256> = txids.to_vec();
    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        for pair in level.chunks(2) {
            let left = &pair[0];
            let right = pair.get(1).unwrap_or(left);
            let mut buf = Vec::with_capacity(64);
            buf.extend_from_slice(left.as_le_bytes());
            buf.extend_from_slice(right.as_le_bytes());
            next.push(sha256d(&buf));
        }
        level = next;
    }
    level[0]
}
