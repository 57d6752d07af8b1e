//! # neblio-chain
//!
//! In-memory chain state structures:
//! - The block-index arena: every connected header, with staking metadata,
//!   addressed by stable integer ids
//! - The intermediate block index used while evaluating a peer's header run
//! - The bounded orphan-block pool for blocks whose parent is unknown
//!
//! This crate holds no consensus policy beyond accumulating chain work; the
//! kernel and difficulty rules in `neblio-consensus` operate over these
//! structures.

mod block_index;
mod error;
mod intermediate;
mod orphans;

pub use block_index::{flags, BlockIndexEntry, BlockIndexId, ChainIndex};
pub use error::{ChainError, ChainResult};
pub use intermediate::{
    headers_to_intermediate_block_index, BlockIndexRef, IntermediateBlockIndex,
    IntermediateBlockIndexEntry,
};
pub use orphans::{OrphanBlock, OrphanBlocks, OrphanBlocksInner, MAX_ORPHANS_DEFAULT};
