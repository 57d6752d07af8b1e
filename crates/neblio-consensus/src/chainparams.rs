//! Chain-parameter registry.
//!
//! One constructor per network returns an immutable `ChainParams` value:
//! consensus constants, fork-activation heights, genesis block, checkpoint
//! tables, and network identity (magic bytes, port, address prefixes).
//!
//! Selection is installed once at startup and passed explicitly through
//! call sites; nothing here is process-global. Only regtest permits
//! mutation, through [`ChainParams::update_version_bits_parameters`] and
//! the `-testactivationheight`/`-vbparams` overrides.

use crate::params::{
    Bip9Deployment, Consensus, DeploymentPos, VERSION_BITS_DEPLOYMENT_INFO,
};
use neblio_primitives::{
    block_merkle_root, sha256d, Amount, Block, BlockHeader, OutPoint, Script, Transaction, TxIn,
    TxOut, Uint256, COIN,
};
use num_bigint::BigUint;
use num_traits::One;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::info;

/// Recognized networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Main,
    Testnet,
    Signet,
    Regtest,
}

impl Network {
    pub fn from_str(tag: &str) -> Option<Network> {
        match tag {
            "main" => Some(Network::Main),
            "test" => Some(Network::Testnet),
            "signet" => Some(Network::Signet),
            "regtest" => Some(Network::Regtest),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Testnet => "test",
            Network::Signet => "signet",
            Network::Regtest => "regtest",
        }
    }
}

/// Startup arguments that influence parameter construction.
#[derive(Debug, Clone, Default)]
pub struct ChainOptions {
    /// `-signetchallenge` values; at most one is accepted.
    pub signet_challenge: Vec<String>,
    /// `-signetseednode` values; override the default signet seeds.
    pub signet_seed_nodes: Vec<String>,
    /// `-testactivationheight` values, `name@height` (regtest only).
    pub test_activation_heights: Vec<String>,
    /// `-vbparams` values, `deployment:start:end[:min_activation_height]`
    /// (regtest only).
    pub vbparams: Vec<String>,
    /// `-fastprune`: reduce prune-after-height to 100 (regtest only).
    pub fastprune: bool,
}

/// Errors constructing chain parameters; each echoes the offending argument.
#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("Unknown chain {0}")]
    UnknownNetwork(String),

    #[error("-signetchallenge cannot be multiple values")]
    SignetChallengeMultiple,

    #[error("-signetchallenge is not valid hex: {value}")]
    SignetChallengeInvalid { value: String },

    #[error("Invalid format ({arg}) for -testactivationheight=name@height")]
    ActivationHeightFormat { arg: String },

    #[error("Invalid height value ({arg}) for -testactivationheight=name@height")]
    ActivationHeightValue { arg: String },

    #[error("Invalid name ({arg}) for -testactivationheight=name@height")]
    ActivationHeightName { arg: String },

    #[error("Version bits parameters malformed, expecting deployment:start:end[:min_activation_height]: {arg}")]
    VbParamsMalformed { arg: String },

    #[error("Invalid nStartTime ({value})")]
    VbParamsStartTime { value: String },

    #[error("Invalid nTimeout ({value})")]
    VbParamsTimeout { value: String },

    #[error("Invalid min_activation_height ({value})")]
    VbParamsMinActivationHeight { value: String },

    #[error("Invalid deployment ({name})")]
    VbParamsUnknownDeployment { name: String },
}

/// Build the genesis block from its literal constants.
///
/// The coinbase scriptSig is `OP_0 PUSH(42) PUSH(timestamp)` with an empty
/// output script; the merkle root is the coinbase txid.
pub fn create_genesis_block(
    time: u32,
    nonce: u32,
    bits: u32,
    version: i32,
    reward: Amount,
) -> Block {
    const TIMESTAMP: &[u8] = b"21jul2017 - Neblio First Net Launches";

    let mut script_sig = Script::new();
    script_sig.push_int(0).push_int(42).push_data(TIMESTAMP);

    let coinbase = Transaction {
        version: 1,
        time,
        vin: vec![TxIn::new(OutPoint::null(), script_sig)],
        vout: vec![TxOut::new(reward, Script::new())],
        lock_time: 0,
    };

    let header = BlockHeader {
        version,
        hash_prev_block: Uint256::ZERO,
        hash_merkle_root: block_merkle_root(&[coinbase.txid()]),
        time,
        bits,
        nonce,
    };
    Block::new(header, vec![coinbase])
}

fn pow_limit_shifted(shift: u32) -> BigUint {
    ((BigUint::one() << 256u32) - 1u32) >> shift
}

/// Per-network consensus constants, genesis, and identity.
#[derive(Debug, Clone)]
pub struct ChainParams {
    network: Network,
    pub(crate) consensus: Consensus,
    message_start: [u8; 4],
    default_port: u16,
    prune_after_height: u64,
    base58_pubkey_prefix: u8,
    base58_script_prefix: u8,
    base58_secret_prefix: u8,
    bech32_hrp: &'static str,
    genesis: Block,
    seeds: Vec<String>,
    pub(crate) checkpoints: BTreeMap<i32, Uint256>,
}

impl ChainParams {
    /// Construct parameters for a network tag, applying startup overrides.
    pub fn for_network(network: Network, options: &ChainOptions) -> Result<Self, ParamsError> {
        match network {
            Network::Main => Ok(Self::main()),
            Network::Testnet => Ok(Self::testnet()),
            Network::Signet => Self::signet(options),
            Network::Regtest => Self::regtest(options),
        }
    }

    /// Main network on which people trade goods and services.
    pub fn main() -> Self {
        let pow_limit = pow_limit_shifted(1);
        let pos_limit = pow_limit_shifted(20);

        let mut consensus = Consensus {
            subsidy_halving_interval: 210_000,
            bip34_height: 1,
            bip65_height: 1,
            bip66_height: 363_725,
            csv_height: 419_328,
            segwit_height: 40_000_000,
            min_bip9_warning_height: 40_000_000,
            pow_limit,
            pos_limit,
            target_timespan: 2 * 60 * 60,
            pow_target_timespan: 14 * 24 * 60 * 60,
            last_pow_block: 1000,
            fork2_confs_changed_height: 248_000,
            fork3_tachyon_height: 387_028,
            fork4_retarget_correct_height: 1_003_125,
            fork5_cold_staking: 2_730_450,
            stake_min_age_v1: 24 * 60 * 60,
            stake_min_age_v2: 24 * 60 * 60,
            stake_max_age: 7 * 24 * 60 * 60,
            modifier_interval: 10 * 60,
            coinbase_maturity_v1: 30,
            coinbase_maturity_v2: 10,
            coinbase_maturity_v3: 120,
            stake_target_spacing_v1: 2 * 60,
            stake_target_spacing_v2: 30,
            pow_allow_min_difficulty_blocks: false,
            pow_no_retargeting: false,
            rule_change_activation_threshold: 1815, // 90% of 2016
            miner_confirmation_window: 2016,
            deployments: [
                Bip9Deployment {
                    bit: 28,
                    start_time: Bip9Deployment::NEVER_ACTIVE,
                    timeout: Bip9Deployment::NO_TIMEOUT,
                    min_activation_height: 0,
                },
                Bip9Deployment {
                    bit: 2,
                    start_time: 1_619_222_400, // April 24th, 2021
                    timeout: 1_628_640_000,    // August 11th, 2021
                    min_activation_height: 709_632,
                },
            ],
            minimum_chain_work: BigUint::parse_bytes(
                b"0000000000000000000000000000000000000000000000000005af5c4ee34581",
                16,
            )
            .expect("valid chain work hex"),
            default_assume_valid: Uint256::from_be_hex(
                "0x00000000000000000008a89e854d57e5667df88f1cdef6fde2fbca1de5b639ad",
            ),
            hash_genesis_block: Uint256::ZERO,
            pow_heights: mainnet_pow_heights(),
            stake_modifier_checkpoints: BTreeMap::from([
                (0, 0xfd11_f4e7), // genesis
                (500, 0x3b54_b16d), // premine
                (1000, 0x7b23_8954),
            ]),
            signet_blocks: false,
            signet_challenge: Vec::new(),
        };

        let bits = neblio_primitives::target_to_compact(&consensus.pow_limit);
        let genesis = create_genesis_block(1_500_674_579, 8485, bits, 1, 0);
        consensus.hash_genesis_block = genesis.hash();
        assert_eq!(
            consensus.hash_genesis_block,
            Uint256::from_be_hex(
                "0x7286972be4dbc1463d256049b7471c252e6557e222cab9be73181d359cd28bcc"
            )
        );
        assert_eq!(
            genesis.header.hash_merkle_root,
            Uint256::from_be_hex(
                "0x203fd13214321a12b01c0d8b32c780977cf52e56ae35b7383cd389c73291aee7"
            )
        );

        let mut checkpoints = mainnet_checkpoints();
        checkpoints.insert(0, consensus.hash_genesis_block);

        ChainParams {
            network: Network::Main,
            consensus,
            // Rarely-used upper ASCII, not valid UTF-8, large with any alignment.
            message_start: [0x32, 0x5e, 0x6f, 0x86],
            default_port: 6325,
            prune_after_height: 100_000,
            base58_pubkey_prefix: 53,  // addresses begin with 'N'
            base58_script_prefix: 112, // addresses begin with 'n'
            base58_secret_prefix: 128 + 53,
            bech32_hrp: "nb",
            genesis,
            seeds: Vec::new(),
            checkpoints,
        }
    }

    /// Public test network, reset from time to time.
    pub fn testnet() -> Self {
        let pow_limit = pow_limit_shifted(1);
        let pos_limit = pow_limit_shifted(20);

        let mut consensus = Consensus {
            subsidy_halving_interval: 210_000,
            bip34_height: 1,
            bip65_height: 1,
            bip66_height: 330_776,
            csv_height: 770_112,
            segwit_height: 834_624,
            min_bip9_warning_height: 40_000_000,
            pow_limit,
            pos_limit,
            target_timespan: 2 * 60 * 60,
            pow_target_timespan: 14 * 24 * 60 * 60,
            last_pow_block: 1000,
            fork2_confs_changed_height: 0,
            fork3_tachyon_height: 110_100,
            fork4_retarget_correct_height: 1_163_000,
            fork5_cold_staking: 2_386_991,
            stake_min_age_v1: 60,
            stake_min_age_v2: 24 * 60 * 60,
            stake_max_age: 7 * 24 * 60 * 60,
            modifier_interval: 10 * 60,
            coinbase_maturity_v1: 10,
            coinbase_maturity_v2: 10,
            coinbase_maturity_v3: 120,
            stake_target_spacing_v1: 2 * 60,
            stake_target_spacing_v2: 30,
            pow_allow_min_difficulty_blocks: true,
            pow_no_retargeting: false,
            rule_change_activation_threshold: 1512, // 75% for testchains
            miner_confirmation_window: 2016,
            deployments: [
                Bip9Deployment {
                    bit: 28,
                    start_time: Bip9Deployment::NEVER_ACTIVE,
                    timeout: Bip9Deployment::NO_TIMEOUT,
                    min_activation_height: 0,
                },
                Bip9Deployment {
                    bit: 2,
                    start_time: 1_619_222_400,
                    timeout: 1_628_640_000,
                    min_activation_height: 0,
                },
            ],
            minimum_chain_work: BigUint::parse_bytes(
                b"0000000000000000000000000000000000000000000005180c3bd8290da33a1a",
                16,
            )
            .expect("valid chain work hex"),
            default_assume_valid: Uint256::from_be_hex(
                "0x0000000000004ae2f3896ca8ecd41c460a35bf6184e145d91558cece1c688a76",
            ),
            hash_genesis_block: Uint256::ZERO,
            pow_heights: testnet_pow_heights(),
            stake_modifier_checkpoints: BTreeMap::from([(0, 0xfd11_f4e7), (100, 0x7bb3_3af1)]),
            signet_blocks: false,
            signet_challenge: Vec::new(),
        };

        let bits = neblio_primitives::target_to_compact(&consensus.pow_limit);
        let genesis = create_genesis_block(1_500_674_579, 8485, bits, 1, 0);
        consensus.hash_genesis_block = genesis.hash();
        assert_eq!(
            consensus.hash_genesis_block,
            Uint256::from_be_hex(
                "0x7286972be4dbc1463d256049b7471c252e6557e222cab9be73181d359cd28bcc"
            )
        );

        let mut checkpoints = testnet_checkpoints();
        checkpoints.insert(0, consensus.hash_genesis_block);

        ChainParams {
            network: Network::Testnet,
            consensus,
            message_start: [0x1b, 0xba, 0x63, 0xc5],
            default_port: 16_325,
            prune_after_height: 1000,
            base58_pubkey_prefix: 65,
            base58_script_prefix: 127,
            base58_secret_prefix: 128 + 65,
            bech32_hrp: "tnb",
            genesis,
            seeds: Vec::new(),
            checkpoints,
        }
    }

    /// Signet: test network with an additional consensus parameter, the
    /// block challenge script (BIP325).
    pub fn signet(options: &ChainOptions) -> Result<Self, ParamsError> {
        let (challenge, seeds, minimum_chain_work, default_assume_valid) =
            if options.signet_challenge.is_empty() {
                let challenge = hex::decode(
                    "512103ad5e0edad18cb1f0fc0d28a3d4f1f3e445640337489abb10404f2d1e086be430\
                     210359ef5021964fe22d6f8e05b2463c9540ce96883fe3b278760f048f5189f2e6c452ae",
                )
                .expect("default signet challenge is valid hex");
                let seeds = vec![
                    "178.128.221.177".to_string(),
                    "v7ajjeirttkbnt32wpy3c6w3emwnfr3fkla7hpxcfokr3ysd3kqtzmqd.onion:38333"
                        .to_string(),
                ];
                let work = BigUint::parse_bytes(
                    b"0000000000000000000000000000000000000000000000000000008546553c03",
                    16,
                )
                .expect("valid chain work hex");
                let assume_valid = Uint256::from_be_hex(
                    "0x000000187d4440e5bff91488b700a140441e089a8aaea707414982460edbfe54",
                );
                (challenge, seeds, work, assume_valid)
            } else {
                if options.signet_challenge.len() != 1 {
                    return Err(ParamsError::SignetChallengeMultiple);
                }
                let value = &options.signet_challenge[0];
                let challenge =
                    hex::decode(value).map_err(|_| ParamsError::SignetChallengeInvalid {
                        value: value.clone(),
                    })?;
                info!(challenge = %value, "Signet with custom challenge");
                (challenge, Vec::new(), BigUint::default(), Uint256::ZERO)
            };

        let seeds = if options.signet_seed_nodes.is_empty() {
            seeds
        } else {
            options.signet_seed_nodes.clone()
        };

        let message_start = signet_message_start(&challenge);

        let pow_limit = BigUint::parse_bytes(
            b"00000377ae000000000000000000000000000000000000000000000000000000",
            16,
        )
        .expect("valid pow limit hex");
        let pos_limit = pow_limit.clone();

        let mut consensus = Consensus {
            subsidy_halving_interval: 210_000,
            bip34_height: 1,
            bip65_height: 1,
            bip66_height: 1,
            csv_height: 1,
            segwit_height: 1,
            min_bip9_warning_height: 0,
            pow_limit,
            pos_limit,
            target_timespan: 2 * 60 * 60,
            pow_target_timespan: 14 * 24 * 60 * 60,
            last_pow_block: i32::MAX,
            fork2_confs_changed_height: 0,
            fork3_tachyon_height: 0,
            fork4_retarget_correct_height: 0,
            fork5_cold_staking: 0,
            stake_min_age_v1: 24 * 60 * 60,
            stake_min_age_v2: 24 * 60 * 60,
            stake_max_age: 7 * 24 * 60 * 60,
            modifier_interval: 10 * 60,
            coinbase_maturity_v1: 30,
            coinbase_maturity_v2: 10,
            coinbase_maturity_v3: 120,
            stake_target_spacing_v1: 2 * 60,
            stake_target_spacing_v2: 30,
            pow_allow_min_difficulty_blocks: false,
            pow_no_retargeting: false,
            rule_change_activation_threshold: 1815,
            miner_confirmation_window: 2016,
            deployments: [
                Bip9Deployment {
                    bit: 28,
                    start_time: Bip9Deployment::NEVER_ACTIVE,
                    timeout: Bip9Deployment::NO_TIMEOUT,
                    min_activation_height: 0,
                },
                Bip9Deployment {
                    bit: 2,
                    start_time: Bip9Deployment::ALWAYS_ACTIVE,
                    timeout: Bip9Deployment::NO_TIMEOUT,
                    min_activation_height: 0,
                },
            ],
            minimum_chain_work,
            default_assume_valid,
            hash_genesis_block: Uint256::ZERO,
            pow_heights: BTreeSet::new(),
            stake_modifier_checkpoints: BTreeMap::new(),
            signet_blocks: true,
            signet_challenge: challenge,
        };

        let genesis = create_genesis_block(1_598_918_400, 52_613_770, 0x1e03_77ae, 1, 50 * COIN);
        consensus.hash_genesis_block = genesis.hash();

        Ok(ChainParams {
            network: Network::Signet,
            consensus,
            message_start,
            default_port: 38_333,
            prune_after_height: 1000,
            base58_pubkey_prefix: 111,
            base58_script_prefix: 196,
            base58_secret_prefix: 239,
            bech32_hrp: "tb",
            genesis,
            seeds,
            checkpoints: BTreeMap::new(),
        })
    }

    /// Regression test network: minimal difficulty, private use only.
    pub fn regtest(options: &ChainOptions) -> Result<Self, ParamsError> {
        let pow_limit = pow_limit_shifted(1);
        let pos_limit = pow_limit.clone();

        let mut consensus = Consensus {
            subsidy_halving_interval: 150,
            bip34_height: 1,
            bip65_height: 1,
            bip66_height: 1,
            csv_height: 1,
            segwit_height: 1,
            min_bip9_warning_height: 0,
            pow_limit,
            pos_limit,
            target_timespan: 2 * 60 * 60,
            pow_target_timespan: 14 * 24 * 60 * 60,
            last_pow_block: i32::MAX,
            fork2_confs_changed_height: 0,
            fork3_tachyon_height: 0,
            fork4_retarget_correct_height: 0,
            fork5_cold_staking: 0,
            stake_min_age_v1: 24 * 60 * 60,
            stake_min_age_v2: 24 * 60 * 60,
            stake_max_age: 7 * 24 * 60 * 60,
            modifier_interval: 10 * 60,
            coinbase_maturity_v1: 30,
            coinbase_maturity_v2: 10,
            coinbase_maturity_v3: 120,
            stake_target_spacing_v1: 2 * 60,
            stake_target_spacing_v2: 30,
            pow_allow_min_difficulty_blocks: true,
            pow_no_retargeting: true,
            rule_change_activation_threshold: 108, // 75% for testchains
            miner_confirmation_window: 144,
            deployments: [
                Bip9Deployment {
                    bit: 28,
                    start_time: 0,
                    timeout: Bip9Deployment::NO_TIMEOUT,
                    min_activation_height: 0,
                },
                Bip9Deployment {
                    bit: 2,
                    start_time: Bip9Deployment::ALWAYS_ACTIVE,
                    timeout: Bip9Deployment::NO_TIMEOUT,
                    min_activation_height: 0,
                },
            ],
            minimum_chain_work: BigUint::default(),
            default_assume_valid: Uint256::ZERO,
            hash_genesis_block: Uint256::ZERO,
            pow_heights: BTreeSet::new(),
            stake_modifier_checkpoints: BTreeMap::new(),
            signet_blocks: false,
            signet_challenge: Vec::new(),
        };

        apply_test_activation_heights(&options.test_activation_heights, &mut consensus)?;

        let genesis = create_genesis_block(1_296_688_602, 2, 0x207f_ffff, 1, 50 * COIN);
        consensus.hash_genesis_block = genesis.hash();

        let checkpoints = BTreeMap::from([(0, consensus.hash_genesis_block)]);

        let mut params = ChainParams {
            network: Network::Regtest,
            consensus,
            message_start: [0xfa, 0xbf, 0xb5, 0xda],
            default_port: 18_444,
            prune_after_height: if options.fastprune { 100 } else { 1000 },
            base58_pubkey_prefix: 111,
            base58_script_prefix: 196,
            base58_secret_prefix: 239,
            bech32_hrp: "bcrt",
            genesis,
            seeds: vec!["dummySeed.invalid.".to_string()],
            checkpoints,
        };

        params.apply_version_bits_overrides(&options.vbparams)?;
        Ok(params)
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn consensus(&self) -> &Consensus {
        &self.consensus
    }

    pub fn genesis(&self) -> &Block {
        &self.genesis
    }

    pub fn message_start(&self) -> [u8; 4] {
        self.message_start
    }

    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    pub fn prune_after_height(&self) -> u64 {
        self.prune_after_height
    }

    pub fn base58_prefixes(&self) -> (u8, u8, u8) {
        (
            self.base58_pubkey_prefix,
            self.base58_script_prefix,
            self.base58_secret_prefix,
        )
    }

    pub fn bech32_hrp(&self) -> &'static str {
        self.bech32_hrp
    }

    pub fn seeds(&self) -> &[String] {
        &self.seeds
    }

    /// Hardened block checkpoints, height to expected hash.
    pub fn checkpoints(&self) -> &BTreeMap<i32, Uint256> {
        &self.checkpoints
    }

    /// Whether a block hash is acceptable at a checkpointed height.
    pub fn check_hardened_checkpoint(&self, height: i32, hash: &Uint256) -> bool {
        match self.checkpoints.get(&height) {
            Some(expected) => expected == hash,
            None => true,
        }
    }

    /// Adjust a version-bits deployment schedule. Regtest only.
    pub fn update_version_bits_parameters(
        &mut self,
        pos: DeploymentPos,
        start_time: i64,
        timeout: i64,
        min_activation_height: i32,
    ) {
        assert_eq!(
            self.network,
            Network::Regtest,
            "version bits parameters are only adjustable on regtest"
        );
        let deployment = &mut self.consensus.deployments[pos as usize];
        deployment.start_time = start_time;
        deployment.timeout = timeout;
        deployment.min_activation_height = min_activation_height;
    }

    fn apply_version_bits_overrides(&mut self, vbparams: &[String]) -> Result<(), ParamsError> {
        for arg in vbparams {
            let fields: Vec<&str> = arg.split(':').collect();
            if fields.len() < 3 || fields.len() > 4 {
                return Err(ParamsError::VbParamsMalformed { arg: arg.clone() });
            }
            let start_time: i64 =
                fields[1]
                    .parse()
                    .map_err(|_| ParamsError::VbParamsStartTime {
                        value: fields[1].to_string(),
                    })?;
            let timeout: i64 = fields[2].parse().map_err(|_| ParamsError::VbParamsTimeout {
                value: fields[2].to_string(),
            })?;
            let min_activation_height: i32 = match fields.get(3) {
                Some(value) => {
                    value
                        .parse()
                        .map_err(|_| ParamsError::VbParamsMinActivationHeight {
                            value: value.to_string(),
                        })?
                }
                None => 0,
            };

            let pos = VERSION_BITS_DEPLOYMENT_INFO
                .iter()
                .position(|&name| name == fields[0])
                .ok_or_else(|| ParamsError::VbParamsUnknownDeployment {
                    name: fields[0].to_string(),
                })?;
            let pos = match pos {
                0 => DeploymentPos::TestDummy,
                _ => DeploymentPos::Taproot,
            };
            self.update_version_bits_parameters(pos, start_time, timeout, min_activation_height);
            info!(
                deployment = fields[0],
                start_time, timeout, min_activation_height,
                "Setting version bits activation parameters"
            );
        }
        Ok(())
    }
}

/// Parse and apply `-testactivationheight=name@height` overrides.
fn apply_test_activation_heights(
    args: &[String],
    consensus: &mut Consensus,
) -> Result<(), ParamsError> {
    for arg in args {
        let (name, value) = arg
            .split_once('@')
            .ok_or_else(|| ParamsError::ActivationHeightFormat { arg: arg.clone() })?;
        let height: i32 = value
            .parse()
            .ok()
            .filter(|h| (0..i32::MAX).contains(h))
            .ok_or_else(|| ParamsError::ActivationHeightValue { arg: arg.clone() })?;
        match name {
            "segwit" => consensus.segwit_height = height,
            "bip34" => consensus.bip34_height = height,
            "dersig" => consensus.bip66_height = height,
            "cltv" => consensus.bip65_height = height,
            "csv" => consensus.csv_height = height,
            _ => return Err(ParamsError::ActivationHeightName { arg: arg.clone() }),
        }
    }
    Ok(())
}

/// The signet message start: first four bytes of the double-SHA256 of the
/// serialized challenge script.
fn signet_message_start(challenge: &[u8]) -> [u8; 4] {
    let mut enc = neblio_primitives::encode::Encoder::new();
    enc.write_var_bytes(challenge);
    let hash = sha256d(enc.as_slice());
    let mut start = [0u8; 4];
    start.copy_from_slice(&hash.as_le_bytes()[..4]);
    start
}

fn mainnet_pow_heights() -> BTreeSet<i32> {
    let mut heights: BTreeSet<i32> = (1..=815).collect();
    heights.extend([
        817, 818, 819, 820, 821, 822, 826, 827, 828, 829, 830, 831, 832, 834, 841, 842, 843, 844,
        845, 846, 847, 848, 861, 862, 863, 870, 871, 876, 877, 878, 880, 881, 884, 894, 897, 898,
        899, 900, 901, 906, 910, 919, 922, 923, 926, 927, 928, 929, 930, 940, 941, 949, 950, 951,
        952, 957, 958, 959, 960, 961, 985, 986, 993, 997, 1000,
    ]);
    heights
}

fn testnet_pow_heights() -> BTreeSet<i32> {
    let mut heights: BTreeSet<i32> = (1..=539).collect();
    heights.extend([
        542, 576, 578, 584, 597, 599, 601, 607, 609, 610, 611, 612, 619, 620, 622, 635, 639, 640,
        641, 644, 645, 646, 650, 651, 653, 659, 661, 662, 664, 665, 670, 677, 686, 693, 697, 698,
        699, 701, 705, 706, 708, 709, 711, 712, 713, 717, 719, 720, 724, 733, 734, 736, 740, 741,
        742, 744, 749, 750, 752, 753, 754, 756, 757, 758, 759, 760, 761, 766, 767, 770, 773, 774,
        775, 777, 778, 782, 784, 785, 791, 792, 793, 794, 795, 796, 801, 802, 805, 806, 807, 808,
        809, 810, 811, 819, 821, 822, 823, 824, 825, 826, 827, 828, 830, 831, 832, 835, 838, 839,
        840, 841, 842, 844, 848, 850, 851, 852, 855, 860, 862, 866, 868, 870, 875, 877, 878, 879,
        880, 881, 882, 883, 884, 885, 886, 887, 888, 894, 895, 898, 899, 902, 904, 905, 910, 911,
        916, 917, 919, 922, 923, 925, 926, 929, 930, 931, 933, 934, 935, 936, 937, 938, 940, 943,
        950, 951, 952, 954, 956, 958, 959, 960, 961, 962, 963, 965, 968, 984, 985, 988, 994, 995,
        996, 998, 999, 1000,
    ]);
    heights
}

fn mainnet_checkpoints() -> BTreeMap<i32, Uint256> {
    checkpoint_map(&[
        (500, "00000342c5dc5f7fd4a8ef041d4df4e569bd40756405a8c336c5f42c77e097a2"),
        (1000, "00000c60e3a8d27dedb15fc33d91caec5cf714fae60f24ea22a649cded8e0cca"),
        (5000, "074873095a26296d4f0033f697f46bddb7c1359ffcb3461f620e346bc516a1d2"),
        (25000, "9c28e51c9c21092909fe0a6ad98ae335f253fa9c8076bb3cca154b6ba5ee03ab"),
        (100000, "bb13aedc5846fe5d384601ef4648492262718fc7dfe35b886ef297ea74cab8cc"),
        (150000, "9a755758cc9a8d40fc36e6cc312077c8dd5b32b2c771241286099fd54fd22db0"),
        (200000, "acea764bbb689e940040b229a89213e17b50b98db0514e1428acedede9c1a4c0"),
        (250000, "297eda3c18c160bdb2b1465164b11ba2ee7908b209a26d3b76eac3876aa55072"),
        (260000, "4d407875afd318897266c14153d856774868949c65176de9214778d5626707a0"),
        (270000, "7f8ead004a853b411de63a3f30ee5a0e4c144a11dbbc00c96942eb58ff3b9a48"),
        (280000, "954544adaa689ad91627822b9da976ad6f272ced95a272b41b108aabff30a3e5"),
        (285000, "7c37fbdb5129db54860e57fd565f0a17b40fb8b9d070bda7368d196f63034ae5"),
        (287500, "3da2de78a53afaf9dafc8cec20a7ace84c52cff994307aef4072d3d0392fe041"),
        (290000, "5685d1cc15100fa0c7423b7427b9f0f22653ccd137854f3ecc6230b0d1af9ebc"),
        (295000, "581aef5415de9ce8b2817bf803cf29150bd589a242c4cb97a6fd931d6f165190"),
        (300000, "b2d6ef8b3ec931c48c2d42fa574a382a534014388b17eb8e0eca1a0db379e369"),
        (305000, "9332baa2c500cb938024d2ec35b265bfa2928b63ae5d2d9d81ffd8cbfd75ef1d"),
        (310000, "53c993efaf747fadd0ecae8b3a15292549e77223853a8dc90c18aa4664f85b6e"),
        (315000, "b46b2d2681294d04a366f34eb2b9183621961432c841a155fe723deabcbf9e38"),
        (320000, "82ecc41d44fefc6667119b0142ba956670bda4e15c035eefe66bfaa4362d2823"),
        (350000, "7787a1240f1bff02cd3e37cfc8f4635725e26c6db7ff44e8fbee7bf31dc6d929"),
        (360000, "b4b001753a4d7ec18012a5ff1cbf3f614130adbf6c3f2515d36dfc3300655c2a"),
        (387026, "37ec421ce623892935d939930d61c066499b8c7eb55606be67219a576d925b67"),
        (387027, "1a7a41f757451fa32acb0aa31e262398d660e90994b8e17f164dd201718c8f5d"),
        (387028, "ac7d44244ff394255f4c1f99664b26cd015d3d10bddbb8a86727ff848faa6acf"),
        (387029, "7e4655517659f78cd2e870305e42353ea5bcf9ac1aaa79c1254f9222993c12d5"),
        (387030, "ae375a05ca92fe78e2768352eebb358b12fc0c2c65263d7ac29e4fe723636f81"),
        (390000, "cd035c9899d22c414f79a345c1b96fd9342d1beb5f80f1dbad6a6244b5d3d5b8"),
        (400000, "7ae908b0c5351fae59fcff7ab4fe0e23f4e7630ed895822676f3ee551262d82d"),
        (500000, "92b5c16c99769dcad4c2d4548426037b35894ef57ff1bf2516575440e1f87d4f"),
        (600000, "69c4acf177368eeb40155e7b03d07b7a6579620320d5de2554db99d0f4908b97"),
        (685000, "a276d5697372e71f597dca34c40391747186ce3fda96ee1875376b4b0f625881"),
        (700000, "8b5806c169fb7d3345e9f02ee0a38538cc4ab5884177002c1e9528058c5eab40"),
        (800000, "71e29af1056d1e8e217382f433d017406db7f0e03eb1995429a9edb741120643"),
        (900000, "8757e0670d5db26a9b540c616ae1c208bda9f4c3b3270754a36c867aa238206b"),
        (1000000, "0ef9d1ce85a1e8209f735f1574bbe0ed0aaca34f0c6052a65443aada25be94a8"),
        (1003123, "f2ec975040b2a5b1a1bf0c722b685596755e6021680661589aa7f8585d283700"),
        (1003124, "d9d451b69134e2d7682014fb5366bb662b3e753b23722cb34326c09aa1c22762"),
        (1003125, "0faaf5119ab9eb3a22e0984d6cba6cebc8d7bae25342401c782ab4fa413c326e"),
        (1003126, "8f21fc3e383c5ec61dec1f171a0b49eea25dccbb28755214a0d45e73dccb7c56"),
        (1003127, "5aaf45ff165d066f84d55399fda3c4458234f94cf32b0cfdcc7f9bbcc814585d"),
        (1100000, "b726814d624b9a1b77e4edfb43ec4c8c47d5cfe4a2c7644812074fb5ac01f252"),
        (1120000, "8c33837e3657a73aa3a89fa9f31cc565b6d075ddcb246de1cf5d9db90574e344"),
        (1130000, "d953fc97fedf8e580211f1156b82b50f6da37c59e26c7d57dcfed9fbfd489ef8"),
        (1200000, "901c6205092ac4fff321de8241badaf54da4c1f3f7c421b06a442f2a887d88ce"),
        (1300000, "c0d0115689b9687cb03d7520ed45e5500e792a83cd3842034b5f9e26fda6d3ce"),
        (1400000, "4697721a360aa7909e7badf528b3223add193943f1444524284b9a31501cd88a"),
        (1500000, "dc3445dfd8e1f57f42011e6b1d63352a69347c830dc1fab36c699dc6a211b48f"),
        (1600000, "b3970d20ca506d31d191f6422150c5e65696ef55bbc51df844171681ed79693f"),
        (1700000, "67490f7265f5fc8d29a36ebb066a7f4dee724bfa9b7691b8e420544385556c68"),
        (1800000, "820f5b448a49b8273d60377f047eb45b1764cd0a00bf8c219f555b49b9751c66"),
        (1900000, "70ff2582c9ef327a71f5215d58d3ad2b6473b3649b2c018cc1ff524b672d69a2"),
        (2000000, "c2a644527223b80000f11b9a821e398ab99483d71c3cb1304e9c267b64c7b85a"),
        (2100000, "d5e7791acc99afc500679205df06bfb62b298040645f247f41eaf2acb42868cb"),
        (2200000, "8791a85a7ec96571070a589978a99cc2cc0e06c5345056698604e7e793759d08"),
        (2300000, "575ca59268e10b92cfedca6059a388043882f95442b7290012bf8a333ce889c4"),
        (2400000, "dd8ed2992b0df4422d1fc950350c82f84d9a0862f93582f9404d5c3bb4b3a625"),
        (2500000, "07ad693d84ef66eaa81f96db7ad901e871ca02a76b1fabb72c1e300580dd2c71"),
        (2600000, "8d1855390705044b515907cc2096cd2bb4979cb18d6bf1edd26983da60387502"),
        (2687000, "6d2097fce84bd83b066f2a63512b8a44225314cd5f2561eac471071eae291d9a"),
    ])
}

fn testnet_checkpoints() -> BTreeMap<i32, Uint256> {
    checkpoint_map(&[
        (1, "0e2eecad99db0eab96abbd7e2de769d92483a090eefcefc014b802d31131a0ce"),
        (500, "0000006939777fded9640797f3008d9fca5d6e177e440655ba10f8a900cabe61"),
        (1000, "000004715d8818cea9c2e5e9a727eb2f950964eb0d1060e1d5effd44c2ca45df"),
        (100000, "1fdbb9642e997fa13df3b0c11c95e959a2606ef9bc6c431e942cf3fc74ed344d"),
        (200000, "f4072b1e5b7ede5b33c82045b13f225b41ff3d8262e03ea5ed9521290e2d5e42"),
        (300000, "448d74d70dea376576217ef72518f18f289ab4680f6714cdac8a3903f7a2cacf"),
        (400000, "09c3bd420fa43ab4e591b0629ed8fe0e86fc264939483d6b7cb0a59f05020953"),
        (500000, "ae87c4f158e07623b88aa089f2de3e3437352873293febcfa1585b07e823d955"),
        (600000, "3c7dbe265d43da7834c3f291e031dda89ef6c74f2950f0af15acf33768831f91"),
        (700000, "a5bcfb2d5d52e8c0bdce1ae11019a7819d4d626e6836f1980fe6b5ce13c10039"),
        (800000, "13a2c603fbdb4ced718d6f7bba60b335651ddb832fbe8e11962e454c6625e20f"),
        (900000, "e5c4d6f1fbd90b6a2af9a02f1e947422a4c5a8756c34d7f0e45f57b341e47156"),
        (1000000, "806506a6eafe00e213c666a8c8fd14dac0c6d6a52e0f05a4d175633361e5e377"),
        (1100000, "397b5e6e0e95d74d7c01064feae627d11a2a99d08ebf91200dbb9d94b1d4ee26"),
        (1200000, "54e813b81516c1a6169ff81abaec2715e13b2ec0796db4fcc510be1e0805d21e"),
        (1300000, "75da223a32b31b3bbb1f32ab33ad5079b70698902ebed5594bebc02ffecb74a8"),
        (1400000, "064c16b9c408e40f020ca455255e58da98b019eb424554259407d7461c5258e2"),
        (1500000, "1fc65c5e904c0dda39a26826df0feaa1d35f5d49657acee2d1674271f38b2100"),
        (1600000, "8510acea950aa7e2da8d287bacc66cca6056bf89f5f0d70109fd92adaf1023d9"),
        (1700000, "65738a87a454cfe97b8200149cd4be7199d1ceff30b18778bd79d222203962ce"),
        (1801000, "406fc58723c11eae128c85174e81b5b6b333eaf683ff4f6ca34bbd8cee3b24f5"),
        (2521000, "d3dc0dd25f4850fa8a607620620959e1970e7bcfe9b36ffd8df3bda1004e5cab"),
        (2581300, "e90b2a55da410f834e047a1f2c1d1901f6beeba2a366a6ce05b01112e9973432"),
    ])
}

fn checkpoint_map(entries: &[(i32, &str)]) -> BTreeMap<i32, Uint256> {
    entries
        .iter()
        .map(|(height, hex)| (*height, Uint256::from_be_hex(hex)))
        .collect()
}
