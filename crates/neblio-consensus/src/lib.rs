//! # neblio-consensus
//!
//! Consensus rules for the Neblio blockchain.
//!
//! This crate provides:
//! - The per-network chain-parameter registry, fork heights, and checkpoints
//! - Difficulty retargeting (three protocol versions) and proof-of-work checks
//! - The proof-of-stake kernel: stake modifier, kernel-hash target, checksum
//!   chain, and coin-stake validation
//! - Coin-age accounting and the stake reward
//!
//! ## The kernel protocol
//!
//! A coin-stake kernel must hash, together with a stake modifier drawn from
//! blocks about a selection interval after the staked coin, below a target
//! proportional to the coin-days consumed. The modifier is recomputed at
//! fixed wall-clock intervals from past blocks' entropy bits, and its
//! history is pinned by hard checksum checkpoints.

pub mod chainparams;
pub mod error;
pub mod interfaces;
pub mod kernel;
pub mod params;
pub mod pow;
pub mod stake;

pub use chainparams::{create_genesis_block, ChainOptions, ChainParams, Network, ParamsError};
pub use error::{ConsensusError, ConsensusResult};
pub use interfaces::{BlockTxReader, Coin, DiskTxPos, ScriptError, ScriptVerifier, TxIndex, UtxoView};
pub use kernel::{
    check_coin_stake_timestamp, check_proof_of_stake, check_stake_kernel_hash,
    check_stake_modifier_checkpoints, compute_next_stake_modifier,
    get_kernel_stake_modifier, get_stake_modifier_checksum,
    get_stake_modifier_selection_interval, get_weight, KernelProof, MODIFIER_INTERVAL_RATIO,
};
pub use params::{Bip9Deployment, Consensus, DeploymentPos};
pub use pow::{
    calculate_next_work_required, check_proof_of_work, get_last_block_index,
    get_next_work_required,
};
pub use stake::{
    apply_staking_fields, check_block_signature, contextual_stake_checks, future_drift,
    get_coin_age, get_proof_of_stake_reward, past_drift, StakeProof, StakingFields,
};
