//! External collaborators, behind traits.
//!
//! The consensus core reads the UTXO set, the transaction index, and block
//! files, and evaluates scripts; all four live elsewhere in the node. These
//! traits are the seams: production wires the real storage and script
//! engine, tests supply in-memory fakes.

use neblio_primitives::{Amount, BlockHeader, OutPoint, Script, Transaction, TxOut, Uint256};

/// Location of a transaction inside a block file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskTxPos {
    /// Block file number.
    pub file: u32,
    /// Byte offset of the block within the file.
    pub block_pos: u64,
    /// Byte offset of the transaction from the start of the block body
    /// (that is, not counting the serialized header).
    pub tx_offset: u32,
}

/// Read-only transaction position index.
pub trait TxIndex {
    fn find_tx_position(&self, txid: &Uint256) -> Option<DiskTxPos>;
}

/// Read access to block files.
pub trait BlockTxReader {
    /// Read the header of the block at `pos` and the transaction at its
    /// `tx_offset`.
    fn read_header_and_tx(&self, pos: &DiskTxPos) -> std::io::Result<(BlockHeader, Transaction)>;
}

/// Script evaluation failure, carrying the engine's error code for logs.
#[derive(Debug, Clone)]
pub struct ScriptError(pub String);

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Script interpreter, consumed as a black box.
pub trait ScriptVerifier {
    /// Verify `tx.vin[input_index].script_sig` against the spent output's
    /// scriptPubKey with flags 0, as the coin-stake check requires.
    fn verify_coinstake_script(
        &self,
        tx: &Transaction,
        input_index: usize,
        prev_out: &TxOut,
    ) -> Result<(), ScriptError>;
}

/// An unspent output as the staking checks see it.
#[derive(Debug, Clone)]
pub struct Coin {
    pub script_pubkey: Script,
    pub value: Amount,
    /// Height of the block containing the coin.
    pub height: i32,
    /// Time of the transaction creating the coin.
    pub time: u32,
    pub is_coinbase: bool,
}

/// Read-only view of the UTXO set.
pub trait UtxoView {
    fn get_coin(&self, outpoint: &OutPoint) -> Option<Coin>;
}
