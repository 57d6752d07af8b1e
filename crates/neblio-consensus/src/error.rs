//! Error types for consensus validation.
//!
//! Each rejection carries a DoS score mirroring the block-validation result
//! classes: 100 for fatal, ban-worthy violations, 1 for soft failures that
//! are expected during initial block download, and 0 for transient local
//! failures the caller may retry.

use neblio_primitives::{OutPoint, Uint256};
use thiserror::Error;

/// Consensus validation errors.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// Transaction claimed to be a coin-stake is not one.
    #[error("Malformed coin-stake transaction {0}")]
    MalformedCoinStake(Uint256),

    /// The kernel's source block is not in the block index.
    #[error("Invalid prevout: kernel block for {0} not in block index")]
    InvalidPrevout(OutPoint),

    /// The kernel prevout index is outside the previous transaction.
    #[error("Prevout {0} out of range of its transaction")]
    PrevoutOutOfRange(OutPoint),

    /// Coin-stake scriptSig failed verification.
    #[error("Coin-stake script verification failed for {txid}: {reason}")]
    CoinStakeScriptFailed { txid: Uint256, reason: String },

    /// Computed stake-modifier checksum disagrees with a hard checkpoint.
    #[error(
        "Rejected by stake-modifier checkpoint at height {height}: computed {computed:#010x}, expected {expected:#010x}"
    )]
    StakeModifierCheckpointMismatch {
        height: i32,
        expected: u32,
        computed: u32,
    },

    /// Block hash disagrees with a hardened checkpoint.
    #[error("Rejected by checkpoint at height {height}: got {got}, expected {expected}")]
    CheckpointMismatch {
        height: i32,
        expected: Uint256,
        got: Uint256,
    },

    /// A proof-of-work block at a height the chain does not permit one.
    #[error("Proof-of-work block not permitted at height {0}")]
    PowHeightNotAllowed(i32),

    /// Block signature missing or invalid.
    #[error("Bad block signature: {0}")]
    BadBlockSignature(String),

    /// Coin-stake transaction timestamp precedes the kernel transaction.
    #[error("Coin-stake nTime violation: tx time {tx_time} before kernel time {kernel_time}")]
    TimestampViolation { tx_time: u32, kernel_time: u32 },

    /// Kernel coin is younger than the minimum stake age.
    #[error("Stake min-age violation: kernel block time {block_from_time}, tx time {tx_time}")]
    MinAgeViolation { block_from_time: i64, tx_time: u32 },

    /// Kernel hash does not meet the per-coin-day target.
    #[error("Kernel hash {hash_proof_of_stake} above stake target")]
    KernelTargetNotMet { hash_proof_of_stake: Uint256 },

    /// The selection interval extends past the best block; the node may be
    /// behind on sync.
    #[error("Stake modifier not yet available: reached best block {best} at height {height}")]
    KernelModifierUnavailable { best: Uint256, height: i32 },

    /// Referenced previous transaction not found in the transaction index.
    #[error("Previous transaction {0} not found in transaction index")]
    TxPrevNotFound(Uint256),

    /// No transaction index is configured; proof-of-stake cannot be checked.
    #[error("Transaction index not available")]
    TxIndexUnavailable,

    /// Reading the previous transaction from the block file failed.
    #[error("Block file error: {0}")]
    BlockFile(String),

    /// The transaction read from disk does not match the index.
    #[error("Txid mismatch reading {expected} from block file")]
    TxidMismatch { expected: Uint256 },

    /// No ancestor with a generated stake modifier (corrupt index).
    #[error("No generated stake modifier found in ancestry")]
    NoStakeModifierGenerated,

    /// A stake-modifier candidate block vanished from the index.
    #[error("Failed to find block index for candidate block {0}")]
    CandidateBlockMissing(Uint256),

    /// No selectable candidate in a stake-modifier selection round.
    #[error("Unable to select stake-modifier block at round {0}")]
    ModifierSelectionFailed(usize),

    /// Cold-staking key extraction failed.
    #[error("Cold-staking key size invalid")]
    ColdStakeKeySizeInvalid,

    /// The compact target is negative, zero, overflowing, or above the limit.
    #[error("Invalid proof-of-work target: nBits {0:#010x}")]
    InvalidTarget(u32),

    /// The block hash does not meet its claimed target.
    #[error("Proof of work failed: hash {0} above target")]
    HighHash(Uint256),
}

impl ConsensusError {
    /// DoS score of the rejection: 100 fatal, 1 soft, 0 transient.
    pub fn dos_score(&self) -> u32 {
        use ConsensusError::*;
        match self {
            MalformedCoinStake(_)
            | InvalidPrevout(_)
            | PrevoutOutOfRange(_)
            | CoinStakeScriptFailed { .. }
            | StakeModifierCheckpointMismatch { .. }
            | CheckpointMismatch { .. }
            | PowHeightNotAllowed(_)
            | BadBlockSignature(_)
            | InvalidTarget(_)
            | HighHash(_) => 100,

            TimestampViolation { .. }
            | MinAgeViolation { .. }
            | KernelTargetNotMet { .. }
            | KernelModifierUnavailable { .. }
            | TxPrevNotFound(_)
            | ColdStakeKeySizeInvalid => 1,

            TxIndexUnavailable
            | BlockFile(_)
            | TxidMismatch { .. }
            | NoStakeModifierGenerated
            | CandidateBlockMissing(_)
            | ModifierSelectionFailed(_) => 0,
        }
    }
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
