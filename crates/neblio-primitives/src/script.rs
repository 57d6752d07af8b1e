//! Script bytes and the few output patterns the consensus core inspects.
//!
//! Script *execution* is an external collaborator; this module only builds
//! the genesis coinbase script and recognizes the output templates needed
//! for block-signature checks (pay-to-pubkey and cold staking).

/// Raw script bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script(Vec<u8>);

const OP_0: u8 = 0x00;
const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_ROT: u8 = 0x7b;
const OP_IF: u8 = 0x63;
const OP_ELSE: u8 = 0x67;
const OP_ENDIF: u8 = 0x68;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;
const OP_CHECKCOLDSTAKEVERIFY: u8 = 0xd1;

/// Output template classification, as far as the consensus core needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxoutType {
    /// `<pubkey> OP_CHECKSIG`; carries the raw pubkey bytes.
    PubKey(Vec<u8>),
    /// Cold-staking script (staker/owner branch with OP_CHECKCOLDSTAKEVERIFY).
    ColdStake,
    /// Anything else.
    NonStandard,
}

impl Script {
    pub fn new() -> Self {
        Script(Vec::new())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Push a small integer the way `CScript << n` does: 0 becomes `OP_0`,
    /// other values are pushed as a minimally-encoded script number.
    pub fn push_int(&mut self, n: i64) -> &mut Self {
        if n == 0 {
            self.0.push(OP_0);
        } else {
            self.push_data(&script_num(n));
        }
        self
    }

    /// Push raw data with a direct length prefix (all genesis pushes fit
    /// under the 0x4c PUSHDATA1 threshold).
    pub fn push_data(&mut self, data: &[u8]) -> &mut Self {
        debug_assert!(data.len() < 0x4c);
        self.0.push(data.len() as u8);
        self.0.extend_from_slice(data);
        self
    }

    /// Classify the output template.
    pub fn solve(&self) -> TxoutType {
        let b = &self.0;
        // <33-byte pubkey> OP_CHECKSIG or <65-byte pubkey> OP_CHECKSIG
        if b.len() == 35 && b[0] == 33 && b[34] == OP_CHECKSIG {
            return TxoutType::PubKey(b[1..34].to_vec());
        }
        if b.len() == 67 && b[0] == 65 && b[66] == OP_CHECKSIG {
            return TxoutType::PubKey(b[1..66].to_vec());
        }
        if self.is_pay_to_cold_staking() {
            return TxoutType::ColdStake;
        }
        TxoutType::NonStandard
    }

    /// `OP_DUP OP_HASH160 OP_ROT OP_IF OP_CHECKCOLDSTAKEVERIFY <stakerKeyHash>
    /// OP_ELSE <ownerKeyHash> OP_ENDIF OP_EQUALVERIFY OP_CHECKSIG`
    pub fn is_pay_to_cold_staking(&self) -> bool {
        let b = &self.0;
        b.len() == 51
            && b[0] == OP_DUP
            && b[1] == OP_HASH160
            && b[2] == OP_ROT
            && b[3] == OP_IF
            && b[4] == OP_CHECKCOLDSTAKEVERIFY
            && b[5] == 20
            && b[26] == OP_ELSE
            && b[27] == 20
            && b[48] == OP_ENDIF
            && b[49] == OP_EQUALVERIFY
            && b[50] == OP_CHECKSIG
    }
}

/// Minimal script-number serialization (little-endian, sign in the high bit
/// of the last byte). Only positive values are ever produced here.
fn script_num(n: i64) -> Vec<u8> {
    debug_assert!(n > 0);
    let mut abs = n as u64;
    let mut out = Vec::new();
    while abs > 0 {
        out.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    if out.last().map_or(false, |&b| b & 0x80 != 0) {
        out.push(0);
    }
    out
}
