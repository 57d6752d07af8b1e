//! Consensus parameters.
//!
//! One `Consensus` value per network, built by the registry in
//! [`crate::chainparams`]. Fork heights are data here and nowhere else:
//! every height-dependent rule goes through the accessors below.

use neblio_primitives::Uint256;
use num_bigint::BigUint;
use std::collections::{BTreeMap, BTreeSet};

/// Version-bits deployment positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentPos {
    TestDummy = 0,
    Taproot = 1,
}

/// Deployment names accepted by `-vbparams`, indexed by position.
pub const VERSION_BITS_DEPLOYMENT_INFO: [&str; 2] = ["testdummy", "taproot"];

/// One version-bits deployment schedule.
#[derive(Debug, Clone, Copy)]
pub struct Bip9Deployment {
    /// Bit position to select this deployment in nVersion.
    pub bit: u8,
    /// Start MedianTime for version bits to count.
    pub start_time: i64,
    /// Timeout/expiry MedianTime.
    pub timeout: i64,
    /// Earliest height at which the deployment may activate.
    pub min_activation_height: i32,
}

impl Bip9Deployment {
    pub const NEVER_ACTIVE: i64 = i64::MIN;
    pub const NO_TIMEOUT: i64 = i64::MAX;
    pub const ALWAYS_ACTIVE: i64 = -1;
}

/// Per-network consensus constants.
#[derive(Debug, Clone)]
pub struct Consensus {
    pub subsidy_halving_interval: i32,
    /// Block heights at or above which the named rules are enforced.
    pub bip34_height: i32,
    pub bip65_height: i32,
    pub bip66_height: i32,
    pub csv_height: i32,
    pub segwit_height: i32,
    pub min_bip9_warning_height: i32,

    /// Maximum proof-of-work target.
    pub pow_limit: BigUint,
    /// Maximum proof-of-stake target.
    pub pos_limit: BigUint,
    /// Retarget timespan for the PPCoin-style difficulty filter.
    pub target_timespan: i64,
    /// Retarget timespan for the Bitcoin-style fallback filter
    /// (signet/regtest only).
    pub pow_target_timespan: i64,
    /// Proof-of-work is forbidden above this height.
    pub last_pow_block: i32,
    /// Stake confirmation count change.
    pub fork2_confs_changed_height: i32,
    /// Tachyon upgrade: v2 staking parameters activate.
    pub fork3_tachyon_height: i32,
    /// Retarget correction: v3 difficulty filter activates.
    pub fork4_retarget_correct_height: i32,
    /// Cold staking activates.
    pub fork5_cold_staking: i32,

    /// Minimum coin age for staking, seconds.
    pub stake_min_age_v1: u32,
    pub stake_min_age_v2: u32,
    /// Maximum counted stake age, seconds.
    pub stake_max_age: i64,
    /// Wall-clock interval between stake-modifier recomputations, seconds.
    pub modifier_interval: i64,

    pub coinbase_maturity_v1: i32,
    pub coinbase_maturity_v2: i32,
    pub coinbase_maturity_v3: i32,

    /// Target block spacing, seconds.
    pub stake_target_spacing_v1: u32,
    pub stake_target_spacing_v2: u32,

    pub pow_allow_min_difficulty_blocks: bool,
    pub pow_no_retargeting: bool,
    pub rule_change_activation_threshold: u32,
    pub miner_confirmation_window: u32,
    pub deployments: [Bip9Deployment; 2],

    pub minimum_chain_work: BigUint,
    pub default_assume_valid: Uint256,
    pub hash_genesis_block: Uint256,

    /// Explicit heights at which a proof-of-work block is permitted; empty
    /// means no restriction (test networks).
    pub pow_heights: BTreeSet<i32>,
    /// Hard checkpoints of the stake-modifier checksum chain.
    pub stake_modifier_checkpoints: BTreeMap<i32, u32>,

    pub signet_blocks: bool,
    pub signet_challenge: Vec<u8>,
}

impl Consensus {
    /// Target block spacing at a height: v2 from the Tachyon fork.
    pub fn target_spacing(&self, height: i32) -> u32 {
        if height >= self.fork3_tachyon_height {
            self.stake_target_spacing_v2
        } else {
            self.stake_target_spacing_v1
        }
    }

    /// Minimum stake age at a height: v2 from the Tachyon fork.
    pub fn stake_min_age(&self, height: i32) -> u32 {
        if height >= self.fork3_tachyon_height {
            self.stake_min_age_v2
        } else {
            self.stake_min_age_v1
        }
    }

    /// Coinbase maturity at a height: v2 once stake confirmations changed,
    /// v3 from the Tachyon fork.
    pub fn coinbase_maturity(&self, height: i32) -> i32 {
        if height >= self.fork3_tachyon_height {
            self.coinbase_maturity_v3
        } else if height >= self.fork2_confs_changed_height {
            self.coinbase_maturity_v2
        } else {
            self.coinbase_maturity_v1
        }
    }

    pub fn stake_modifier_interval(&self) -> i64 {
        self.modifier_interval
    }

    /// Whether a proof-of-work block is permitted at this height.
    ///
    /// Above `last_pow_block` the answer is always no; below it, networks
    /// with an explicit height set only allow the listed heights. Genesis is
    /// always permitted.
    pub fn is_pow_height_allowed(&self, height: i32) -> bool {
        if height == 0 {
            return true;
        }
        if height > self.last_pow_block {
            return false;
        }
        self.pow_heights.is_empty() || self.pow_heights.contains(&height)
    }

    /// Whether cold-staking outputs are spendable at this height.
    pub fn is_cold_staking_active(&self, height: i32) -> bool {
        height >= self.fork5_cold_staking
    }
}

#[cfg(test)]
mod tests {
    use crate::chainparams::ChainParams;

    #[test]
    fn test_height_parameterized_accessors() {
        let params = ChainParams::main();
        let consensus = params.consensus();
        let tachyon = consensus.fork3_tachyon_height;

        assert_eq!(consensus.target_spacing(tachyon - 1), 120);
        assert_eq!(consensus.target_spacing(tachyon), 30);
        assert_eq!(consensus.stake_min_age(tachyon - 1), 86_400);
        assert_eq!(consensus.stake_min_age(tachyon), 86_400);

        let fork2 = consensus.fork2_confs_changed_height;
        assert_eq!(consensus.coinbase_maturity(fork2 - 1), 30);
        assert_eq!(consensus.coinbase_maturity(fork2), 10);
        assert_eq!(consensus.coinbase_maturity(tachyon), 120);
    }

    #[test]
    fn test_pow_height_set_enforcement() {
        let params = ChainParams::main();
        let consensus = params.consensus();
        assert!(consensus.is_pow_height_allowed(0));
        assert!(consensus.is_pow_height_allowed(1));
        assert!(consensus.is_pow_height_allowed(815));
        assert!(!consensus.is_pow_height_allowed(816));
        assert!(consensus.is_pow_height_allowed(1000));
        assert!(!consensus.is_pow_height_allowed(1001));
        assert!(!consensus.is_pow_height_allowed(999_999));
    }

    #[test]
    fn test_regtest_allows_pow_everywhere() {
        let params = ChainParams::regtest(&Default::default()).unwrap();
        let consensus = params.consensus();
        assert!(consensus.is_pow_height_allowed(1));
        assert!(consensus.is_pow_height_allowed(50_000));
    }
}
