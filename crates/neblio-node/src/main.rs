//! Neblio node binary.
//!
//! Parses arguments, selects chain parameters, connects the genesis block
//! through the contextual staking checks, and reports the resulting chain
//! state. Peer-to-peer networking, storage, and the script engine are wired
//! in by the full node build; this binary exercises the consensus core.

use anyhow::{bail, Context, Result};
use clap::Parser;
use neblio_chain::ChainIndex;
use neblio_consensus::{
    apply_staking_fields, contextual_stake_checks, BlockTxReader, ChainOptions, ChainParams,
    DiskTxPos, Network, ScriptError, ScriptVerifier,
};
use neblio_primitives::{BlockHeader, Transaction, TxOut};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod config;

use config::NodeConfig;

/// Neblio blockchain node.
#[derive(Parser, Debug)]
#[command(name = "neblio-node")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "neblio-node.toml")]
    config: PathBuf,

    /// Data directory
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Network to connect to (main, test, signet, regtest)
    #[arg(short, long, default_value = "main")]
    network: String,

    /// Replace the default signet challenge script (hex)
    #[arg(long = "signetchallenge")]
    signet_challenge: Vec<String>,

    /// Override the default signet seed nodes (repeatable)
    #[arg(long = "signetseednode")]
    signet_seed_node: Vec<String>,

    /// Lower a rule activation height, name@height (regtest only;
    /// names: segwit, bip34, dersig, cltv, csv)
    #[arg(long = "testactivationheight")]
    test_activation_height: Vec<String>,

    /// Version-bits schedule override, deployment:start:end[:min_height]
    /// (regtest only)
    #[arg(long = "vbparams")]
    vbparams: Vec<String>,

    /// Reduce prune-after-height to 100 (regtest only)
    #[arg(long)]
    fastprune: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Block files are not wired into this binary.
struct UnwiredBlockFiles;

impl BlockTxReader for UnwiredBlockFiles {
    fn read_header_and_tx(&self, _pos: &DiskTxPos) -> std::io::Result<(BlockHeader, Transaction)> {
        Err(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "block storage not wired",
        ))
    }
}

/// The script engine is not wired into this binary.
struct UnwiredScriptEngine;

impl ScriptVerifier for UnwiredScriptEngine {
    fn verify_coinstake_script(
        &self,
        _tx: &Transaction,
        _input_index: usize,
        _prev_out: &TxOut,
    ) -> Result<(), ScriptError> {
        Err(ScriptError("script engine not wired".to_string()))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Neblio node v{}", env!("CARGO_PKG_VERSION"));

    let config = NodeConfig::load(&args.config, &args)?;
    let Some(network) = Network::from_str(&config.network) else {
        bail!("Unknown chain {}", config.network);
    };

    let options = ChainOptions {
        signet_challenge: args.signet_challenge.clone(),
        signet_seed_nodes: args.signet_seed_node.clone(),
        test_activation_heights: args.test_activation_height.clone(),
        vbparams: args.vbparams.clone(),
        fastprune: args.fastprune,
    };
    let params =
        ChainParams::for_network(network, &options).context("invalid chain parameters")?;

    info!("Network: {}", params.network().as_str());
    info!("Data directory: {:?}", config.data_dir);
    info!(
        "Magic: {}, port: {}",
        hex::encode(params.message_start()),
        params.default_port()
    );
    info!("Genesis: {}", params.consensus().hash_genesis_block);
    info!(
        "Checkpoints: {} block, {} stake-modifier",
        params.checkpoints().len(),
        params.consensus().stake_modifier_checkpoints.len()
    );

    // Connect genesis and run it through the contextual staking checks;
    // this also verifies the height-0 stake-modifier checkpoint.
    let mut chain = ChainIndex::new();
    let genesis = params.genesis().clone();
    let genesis_id = chain
        .insert(
            genesis.hash(),
            None,
            genesis.header.bits,
            genesis.header.time,
            genesis.is_proof_of_stake(),
        )
        .context("failed to index genesis")?;
    chain
        .connect_tip(genesis_id)
        .context("failed to connect genesis")?;
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    let fields = contextual_stake_checks(
        &chain,
        &genesis,
        genesis_id,
        None,
        &UnwiredBlockFiles,
        &UnwiredScriptEngine,
        &params,
        now,
    )
    .context("genesis failed contextual staking checks")?;
    apply_staking_fields(&mut chain, genesis_id, &fields);

    info!(
        "Chain state ready: height {}, orphan pool capacity {}",
        chain.entry(chain.tip().expect("genesis connected")).height,
        config.max_orphan_blocks
    );

    Ok(())
}
