//! # neblio-primitives
//!
//! Wire-exact primitives for the Neblio blockchain.
//!
//! This crate provides:
//! - The 256-bit hash type used for block and transaction ids
//! - Compact (`nBits`) target encoding and block-proof arithmetic
//! - SHA-256d stream hashing and the scrypt block hash
//! - Consensus serialization of transactions and block headers
//!
//! ## Block hashing
//!
//! Neblio block hashes are `scrypt_1024_1_1_256` over the 80-byte serialized
//! header, not double-SHA256. Transaction ids remain SHA-256d.

pub mod amount;
pub mod block;
pub mod compact;
pub mod encode;
pub mod hash;
pub mod script;
pub mod transaction;
pub mod uint256;

pub use amount::{Amount, CENT, COIN};
pub use block::{block_merkle_root, Block, BlockHeader};
pub use compact::{block_proof, compact_to_target, target_to_compact, DecodedTarget};
pub use hash::{scrypt_block_hash, sha256d, HashWriter};
pub use script::{Script, TxoutType};
pub use transaction::{OutPoint, Transaction, TxIn, TxOut};
pub use uint256::Uint256;
