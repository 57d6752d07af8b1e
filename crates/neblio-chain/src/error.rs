//! Error types for chain structures.

use neblio_primitives::Uint256;
use thiserror::Error;

/// Chain structure errors.
#[derive(Error, Debug)]
pub enum ChainError {
    /// A block with this hash is already indexed.
    #[error("Block already indexed: {0}")]
    DuplicateBlock(Uint256),

    /// The referenced parent id is not in the arena.
    #[error("Unknown parent index id: {0}")]
    UnknownParent(usize),

    /// The block does not extend the current active tip.
    #[error("Block {hash} does not connect to the active tip {tip}")]
    DoesNotConnect { hash: Uint256, tip: Uint256 },
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;
