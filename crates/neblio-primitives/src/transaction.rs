//! Transactions with timestamped (PPCoin-lineage) serialization.
//!
//! Unlike Bitcoin, every transaction carries an `nTime` field between the
//! version and the inputs; the kernel protocol hashes it and coin-age is
//! measured from it, so the layout is consensus-critical.

use crate::amount::Amount;
use crate::encode::Encoder;
use crate::hash::sha256d;
use crate::script::Script;
use crate::uint256::Uint256;
use std::fmt;

/// Reference to a transaction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OutPoint {
    pub hash: Uint256,
    pub n: u32,
}

impl OutPoint {
    pub fn new(hash: Uint256, n: u32) -> Self {
        OutPoint { hash, n }
    }

    /// The null outpoint marks a coinbase input.
    pub fn null() -> Self {
        OutPoint {
            hash: Uint256::ZERO,
            n: u32::MAX,
        }
    }

    pub fn is_null(&self) -> bool {
        self.hash.is_zero() && self.n == u32::MAX
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.hash, self.n)
    }
}

/// Transaction input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
}

impl TxIn {
    pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

    pub fn new(prevout: OutPoint, script_sig: Script) -> Self {
        TxIn {
            prevout,
            script_sig,
            sequence: Self::SEQUENCE_FINAL,
        }
    }
}

/// Transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub value: Amount,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn new(value: Amount, script_pubkey: Script) -> Self {
        TxOut {
            value,
            script_pubkey,
        }
    }

    /// The marker output: first output of a coin-stake transaction.
    pub fn is_empty(&self) -> bool {
        self.value == 0 && self.script_pubkey.is_empty()
    }
}

/// A transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    /// Transaction timestamp, serialized right after the version.
    pub time: u32,
    pub vin: Vec<TxIn>,
    pub vout: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    pub fn is_coin_base(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].prevout.is_null()
    }

    /// A coin-stake transaction spends at least one real input and pays at
    /// least two outputs, the first of which is the empty marker.
    pub fn is_coin_stake(&self) -> bool {
        !self.vin.is_empty()
            && !self.vin[0].prevout.is_null()
            && self.vout.len() >= 2
            && self.vout[0].is_empty()
    }

    /// Consensus serialization: version, time, inputs, outputs, lock time.
    pub fn serialize(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_i32_le(self.version);
        enc.write_u32_le(self.time);
        enc.write_compact_size(self.vin.len() as u64);
        for input in &self.vin {
            enc.write_uint256(&input.prevout.hash);
            enc.write_u32_le(input.prevout.n);
            enc.write_var_bytes(input.script_sig.as_bytes());
            enc.write_u32_le(input.sequence);
        }
        enc.write_compact_size(self.vout.len() as u64);
        for output in &self.vout {
            enc.write_i64_le(output.value);
            enc.write_var_bytes(output.script_pubkey.as_bytes());
        }
        enc.write_u32_le(self.lock_time);
        enc.into_inner()
    }

    /// Transaction id: SHA-256d of the serialization.
    pub fn txid(&self) -> Uint256 {
        sha256d(&self.serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stake_marker() -> TxOut {
        TxOut::new(0, Script::new())
    }

    fn payout(value: Amount) -> TxOut {
        let mut script = Script::new();
        script.push_int(1);
        TxOut::new(value, script)
    }

    #[test]
    fn test_coinbase_detection() {
        let tx = Transaction {
            version: 1,
            time: 0,
            vin: vec![TxIn::new(OutPoint::null(), Script::new())],
            vout: vec![payout(50)],
            lock_time: 0,
        };
        assert!(tx.is_coin_base());
        assert!(!tx.is_coin_stake());
    }

    #[test]
    fn test_coinstake_detection() {
        let kernel = OutPoint::new(Uint256::from_le_bytes([7u8; 32]), 0);
        let tx = Transaction {
            version: 1,
            time: 1_600_000_000,
            vin: vec![TxIn::new(kernel, Script::new())],
            vout: vec![stake_marker(), payout(100)],
            lock_time: 0,
        };
        assert!(tx.is_coin_stake());
        assert!(!tx.is_coin_base());

        // Without the empty marker it is an ordinary transaction.
        let mut plain = tx.clone();
        plain.vout[0] = payout(1);
        assert!(!plain.is_coin_stake());
    }

    #[test]
    fn test_serialization_layout() {
        let tx = Transaction {
            version: 1,
            time: 0x01020304,
            vin: vec![TxIn::new(OutPoint::null(), Script::new())],
            vout: vec![TxOut::new(0, Script::new())],
            lock_time: 0,
        };
        let bytes = tx.serialize();
        // version + time + vin count + (outpoint + empty script + sequence)
        // + vout count + (value + empty script) + lock time
        assert_eq!(bytes.len(), 4 + 4 + 1 + (32 + 4 + 1 + 4) + 1 + (8 + 1) + 4);
        assert_eq!(&bytes[0..4], &[1, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(bytes[8], 1); // one input
    }

    #[test]
    fn test_txid_changes_with_time() {
        let mut tx = Transaction {
            version: 1,
            time: 100,
            vin: vec![TxIn::new(OutPoint::null(), Script::new())],
            vout: vec![payout(1)],
            lock_time: 0,
        };
        let a = tx.txid();
        tx.time = 101;
        assert_ne!(a, tx.txid());
    }
}
