//! Staking checks that sit above the kernel: coin-age accounting, the
//! proof-of-stake reward, contextual block checks, and the block signature.
//!
//! The contextual checks are split into a pure evaluation phase returning
//! the block's [`StakingFields`] and an apply phase that installs them into
//! the block index, so callers can validate without mutating.

use crate::chainparams::ChainParams;
use crate::error::{ConsensusError, ConsensusResult};
use crate::interfaces::{BlockTxReader, ScriptVerifier, TxIndex, UtxoView};
use crate::kernel::{
    check_proof_of_stake, check_stake_modifier_checkpoints, compute_next_stake_modifier,
    get_stake_modifier_checksum,
};
use neblio_chain::{flags, BlockIndexId, ChainIndex};
use neblio_primitives::{Amount, Block, OutPoint, Transaction, Uint256, CENT, COIN};
use num_bigint::BigUint;
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};
use tracing::{debug, warn};

/// Annual stake reward rate, 10%.
const COIN_YEAR_REWARD: Amount = 10 * CENT;

/// Earliest acceptable timestamp relative to a reference time.
pub fn past_drift(time: i64) -> i64 {
    time - 10 * 60
}

/// Latest acceptable timestamp relative to a reference time.
pub fn future_drift(time: i64) -> i64 {
    time + 10 * 60
}

/// Staking metadata computed for a block before it is written to the index.
#[derive(Debug, Clone)]
pub struct StakingFields {
    pub entropy_bit: u64,
    pub stake_modifier: u64,
    pub generated_stake_modifier: bool,
    pub stake_modifier_checksum: u32,
    /// Present for proof-of-stake blocks only.
    pub proof: Option<StakeProof>,
}

/// Kernel result recorded on a proof-of-stake block's index entry.
#[derive(Debug, Clone)]
pub struct StakeProof {
    pub hash_proof_of_stake: Uint256,
    pub prevout_stake: OutPoint,
    pub stake_time: u32,
}

/// Contextual staking checks for a block whose ancestors are all connected.
///
/// Verifies the kernel for proof-of-stake blocks, the hardened block
/// checkpoint, the proof-of-work height set, computes the next stake
/// modifier and its checksum, and verifies the checksum checkpoint. The
/// block index is not modified; pass the result to
/// [`apply_staking_fields`] once the block is accepted.
#[allow(clippy::too_many_arguments)]
pub fn contextual_stake_checks(
    chain: &ChainIndex,
    block: &Block,
    index_id: BlockIndexId,
    tx_index: Option<&dyn TxIndex>,
    block_reader: &dyn BlockTxReader,
    script_verifier: &dyn ScriptVerifier,
    params: &ChainParams,
    now: i64,
) -> ConsensusResult<StakingFields> {
    let consensus = params.consensus();
    let entry = chain.entry(index_id);

    if !params.check_hardened_checkpoint(entry.height, &entry.hash) {
        return Err(ConsensusError::CheckpointMismatch {
            height: entry.height,
            expected: *params
                .checkpoints()
                .get(&entry.height)
                .expect("mismatch implies a checkpoint"),
            got: entry.hash,
        });
    }
    if entry.is_proof_of_work() && !consensus.is_pow_height_allowed(entry.height) {
        return Err(ConsensusError::PowHeightNotAllowed(entry.height));
    }

    let proof = if block.is_proof_of_stake() {
        let coinstake = &block.vtx[1];
        let prev = entry
            .prev
            .ok_or(ConsensusError::InvalidPrevout(coinstake.vin[0].prevout))?;
        let kernel_proof = check_proof_of_stake(
            chain,
            prev,
            coinstake,
            block.header.bits,
            tx_index,
            block_reader,
            script_verifier,
            consensus,
            now,
        )
        .map_err(|err| {
            // Expected during initial block download; the peer layer
            // resupplies the block later.
            warn!(block = %entry.hash, %err, "check proof-of-stake failed");
            err
        })?;
        Some(StakeProof {
            hash_proof_of_stake: kernel_proof.hash_proof_of_stake,
            prevout_stake: coinstake.vin[0].prevout,
            stake_time: coinstake.time,
        })
    } else {
        None
    };

    let entropy_bit = Block::stake_entropy_bit(&entry.hash);
    let (stake_modifier, generated_stake_modifier) =
        compute_next_stake_modifier(chain, index_id, consensus)?;

    // The checksum folds the flags as they will be written.
    let mut new_flags = entry.flags & !(flags::STAKE_ENTROPY | flags::STAKE_MODIFIER);
    new_flags |= (entropy_bit as u32) << 1;
    if generated_stake_modifier {
        new_flags |= flags::STAKE_MODIFIER;
    }

    let prev_checksum = entry.prev.map(|p| chain.entry(p).stake_modifier_checksum);
    let hash_proof = proof
        .as_ref()
        .map(|p| p.hash_proof_of_stake)
        .unwrap_or(Uint256::ZERO);
    let stake_modifier_checksum = get_stake_modifier_checksum(
        prev_checksum,
        block.is_proof_of_stake(),
        &hash_proof,
        stake_modifier,
        new_flags,
    );

    if !check_stake_modifier_checkpoints(consensus, entry.height, stake_modifier_checksum) {
        return Err(ConsensusError::StakeModifierCheckpointMismatch {
            height: entry.height,
            expected: consensus.stake_modifier_checkpoints[&entry.height],
            computed: stake_modifier_checksum,
        });
    }

    Ok(StakingFields {
        entropy_bit,
        stake_modifier,
        generated_stake_modifier,
        stake_modifier_checksum,
        proof,
    })
}

/// Install evaluated staking fields into the block index and queue the
/// entry for flushing. Readers observe the fields as one tuple because the
/// caller holds the main-chain lock across this call.
pub fn apply_staking_fields(chain: &mut ChainIndex, index_id: BlockIndexId, fields: &StakingFields) {
    let entry = chain.entry_mut(index_id);
    if let Some(proof) = &fields.proof {
        entry.hash_proof_of_stake = proof.hash_proof_of_stake;
        entry.prevout_stake = Some(proof.prevout_stake);
        entry.stake_time = proof.stake_time;
    }
    let bit_ok = entry.set_stake_entropy_bit(fields.entropy_bit);
    debug_assert!(bit_ok);
    entry.set_stake_modifier(fields.stake_modifier, fields.generated_stake_modifier);
    entry.stake_modifier_checksum = fields.stake_modifier_checksum;
    chain.mark_dirty(index_id);
}

/// Total coin age consumed by a transaction's inputs, in coin-days.
///
/// Inputs missing from the UTXO view or the active chain, and inputs
/// younger than the minimum stake age, contribute nothing. Accumulation is
/// in cent-seconds with 256-bit headroom; the result truncates to whole
/// coin-days.
pub fn get_coin_age(
    chain: &ChainIndex,
    tx: &Transaction,
    view: &dyn UtxoView,
    stake_min_age: i64,
) -> ConsensusResult<u64> {
    if tx.is_coin_base() {
        return Ok(0);
    }

    let mut cent_seconds = BigUint::default();
    for txin in &tx.vin {
        let coin = match view.get_coin(&txin.prevout) {
            Some(coin) => coin,
            None => continue, // previous transaction not in main chain
        };
        if chain.at_height(coin.height).is_none() {
            continue;
        }
        if i64::from(coin.time) + stake_min_age > i64::from(tx.time) {
            continue; // only count coins meeting the min age requirement
        }

        let effective_age = u64::from(tx.time - coin.time);
        cent_seconds += BigUint::from(coin.value as u64) * effective_age / CENT as u64;
        debug!(
            value_in = coin.value,
            effective_age,
            "coin age accumulated"
        );
    }

    let coin_days = cent_seconds * CENT as u64 / COIN as u64 / (24 * 60 * 60u64);
    Ok(coin_days.iter_u64_digits().next().unwrap_or(0))
}

/// Stake reward for the consumed coin age plus fees.
///
/// The 33/(365·33 + 8) factor yields roughly 10% annualized, compensating
/// for the 8-day shift relative to pure per-diem accrual.
pub fn get_proof_of_stake_reward(coin_age: u64, fees: Amount) -> Amount {
    let subsidy = coin_age as Amount * COIN_YEAR_REWARD * 33 / (365 * 33 + 8);
    debug!(subsidy, coin_age, "proof-of-stake reward");
    subsidy + fees
}

/// Check the staker's signature over the block hash.
///
/// Proof-of-work blocks must carry an empty signature. Proof-of-stake
/// blocks are verified against the pay-to-pubkey staker output, or against
/// the key recovered from the kernel scriptSig for cold staking.
pub fn check_block_signature(block: &Block) -> ConsensusResult<()> {
    if block.is_proof_of_work() {
        if block.signature.is_empty() {
            return Ok(());
        }
        return Err(ConsensusError::BadBlockSignature(
            "proof-of-work block carries a signature".to_string(),
        ));
    }

    let staker_out = block.vtx[1]
        .vout
        .get(1)
        .ok_or_else(|| ConsensusError::BadBlockSignature("missing staker output".to_string()))?;

    match staker_out.script_pubkey.solve() {
        neblio_primitives::TxoutType::PubKey(key) => verify_block_signature(block, &key),
        neblio_primitives::TxoutType::ColdStake => {
            let key = extract_cold_stake_pubkey(block)?;
            verify_block_signature(block, &key)
        }
        neblio_primitives::TxoutType::NonStandard => Err(ConsensusError::BadBlockSignature(
            "failed to solve staker scriptPubKey".to_string(),
        )),
    }
}

fn verify_block_signature(block: &Block, key_bytes: &[u8]) -> ConsensusResult<()> {
    if block.signature.is_empty() {
        return Err(ConsensusError::BadBlockSignature(
            "empty signature".to_string(),
        ));
    }
    let key = PublicKey::from_slice(key_bytes).map_err(|err| {
        ConsensusError::BadBlockSignature(format!("invalid staker pubkey: {err}"))
    })?;
    let message = Message::from_digest_slice(block.hash().as_le_bytes())
        .expect("block hash is 32 bytes");
    let mut signature = Signature::from_der_lax(&block.signature)
        .map_err(|err| ConsensusError::BadBlockSignature(format!("malformed signature: {err}")))?;
    signature.normalize_s();

    Secp256k1::verification_only()
        .verify_ecdsa(&message, &signature, &key)
        .map_err(|err| ConsensusError::BadBlockSignature(err.to_string()))
}

/// Recover the staker's public key from a cold-staking kernel scriptSig:
/// skip the signature push and the branch-select flag, the rest is the key.
fn extract_cold_stake_pubkey(block: &Block) -> ConsensusResult<Vec<u8>> {
    let script = block.vtx[1].vin[0].script_sig.as_bytes();
    let sig_len = *script.first().ok_or(ConsensusError::ColdStakeKeySizeInvalid)? as usize;
    let mut start = 1 + sig_len;
    let flag_len = *script
        .get(start)
        .ok_or(ConsensusError::ColdStakeKeySizeInvalid)? as usize;
    start += 1 + flag_len;
    let key_begin = start + 1;
    if key_begin > script.len() {
        return Err(ConsensusError::ColdStakeKeySizeInvalid);
    }
    Ok(script[key_begin..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{Coin, DiskTxPos, ScriptError};
    use neblio_primitives::{BlockHeader, Script, TxIn, TxOut};
    use secp256k1::SecretKey;
    use std::collections::HashMap;

    fn fake_hash(n: u32) -> Uint256 {
        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&n.to_le_bytes());
        bytes[12] = 0x33;
        Uint256::from_le_bytes(bytes)
    }

    struct MapUtxoView(HashMap<OutPoint, Coin>);

    impl UtxoView for MapUtxoView {
        fn get_coin(&self, outpoint: &OutPoint) -> Option<Coin> {
            self.0.get(outpoint).cloned()
        }
    }

    struct UnusedReader;

    impl BlockTxReader for UnusedReader {
        fn read_header_and_tx(
            &self,
            _pos: &DiskTxPos,
        ) -> std::io::Result<(BlockHeader, Transaction)> {
            panic!("reader must not be consulted for proof-of-work blocks")
        }
    }

    struct UnusedScripts;

    impl ScriptVerifier for UnusedScripts {
        fn verify_coinstake_script(
            &self,
            _tx: &Transaction,
            _input_index: usize,
            _prev_out: &TxOut,
        ) -> Result<(), ScriptError> {
            panic!("script engine must not be consulted for proof-of-work blocks")
        }
    }

    fn spending_tx(prevout: OutPoint, time: u32) -> Transaction {
        Transaction {
            version: 1,
            time,
            vin: vec![TxIn::new(prevout, Script::new())],
            vout: vec![TxOut::new(1, Script::new())],
            lock_time: 0,
        }
    }

    fn small_chain(len: u32) -> ChainIndex {
        let mut chain = ChainIndex::new();
        let mut prev = None;
        for n in 0..len {
            let id = chain
                .insert(fake_hash(n), prev, 0x1e0f_ffff, 1_600_000_000 + n * 30, false)
                .unwrap();
            chain.connect_tip(id).unwrap();
            prev = Some(id);
        }
        chain
    }

    // ================== drift bounds ==================

    #[test]
    fn test_drift_bounds() {
        assert_eq!(past_drift(1000), 400);
        assert_eq!(future_drift(0), 600);
        assert_eq!(future_drift(1000), 1600);
    }

    // ================== coin age ==================

    #[test]
    fn test_coin_age_under_min_age_is_zero() {
        let chain = small_chain(3);
        let prevout = OutPoint::new(fake_hash(90), 0);
        let stake_min_age = 86_400i64;
        let coin_time = 1_600_000_000u32;
        let view = MapUtxoView(HashMap::from([(
            prevout,
            Coin {
                script_pubkey: Script::new(),
                value: 10 * COIN,
                height: 1,
                time: coin_time,
                is_coinbase: false,
            },
        )]));

        // One second short of the minimum age: the input is skipped.
        let tx = spending_tx(prevout, coin_time + stake_min_age as u32 - 1);
        assert_eq!(get_coin_age(&chain, &tx, &view, stake_min_age).unwrap(), 0);
    }

    #[test]
    fn test_coin_age_whole_days() {
        let chain = small_chain(3);
        let prevout = OutPoint::new(fake_hash(90), 0);
        let coin_time = 1_600_000_000u32;
        let view = MapUtxoView(HashMap::from([(
            prevout,
            Coin {
                script_pubkey: Script::new(),
                value: 10 * COIN,
                height: 1,
                time: coin_time,
                is_coinbase: false,
            },
        )]));

        // Exactly one day past creation with a one-day minimum age:
        // 10 coins for one day is 10 coin-days.
        let tx = spending_tx(prevout, coin_time + 86_400);
        assert_eq!(get_coin_age(&chain, &tx, &view, 86_400).unwrap(), 10);
    }

    #[test]
    fn test_coin_age_skips_unknown_and_unconnected_coins() {
        let chain = small_chain(3);
        let known = OutPoint::new(fake_hash(90), 0);
        let too_high = OutPoint::new(fake_hash(91), 0);
        let view = MapUtxoView(HashMap::from([(
            too_high,
            Coin {
                script_pubkey: Script::new(),
                value: COIN,
                height: 500, // beyond the active chain
                time: 1_600_000_000,
                is_coinbase: false,
            },
        )]));

        let mut tx = spending_tx(known, 1_600_200_000);
        tx.vin.push(TxIn::new(too_high, Script::new()));
        assert_eq!(get_coin_age(&chain, &tx, &view, 60).unwrap(), 0);
    }

    #[test]
    fn test_coinbase_has_no_coin_age() {
        let chain = small_chain(1);
        let view = MapUtxoView(HashMap::new());
        let coinbase = Transaction {
            version: 1,
            time: 1_600_000_000,
            vin: vec![TxIn::new(OutPoint::null(), Script::new())],
            vout: vec![TxOut::new(50 * COIN, Script::new())],
            lock_time: 0,
        };
        assert_eq!(get_coin_age(&chain, &coinbase, &view, 60).unwrap(), 0);
    }

    // ================== reward ==================

    #[test]
    fn test_stake_reward_formula() {
        assert_eq!(
            get_proof_of_stake_reward(365, 0),
            365 * 10 * CENT * 33 / (365 * 33 + 8)
        );
        assert_eq!(get_proof_of_stake_reward(0, 12_345), 12_345);
        // Fees are added on top of the subsidy.
        assert_eq!(
            get_proof_of_stake_reward(100, 500) - get_proof_of_stake_reward(100, 0),
            500
        );
    }

    // ================== contextual checks ==================

    #[test]
    fn test_genesis_contextual_checks_and_apply() {
        let params = ChainParams::main();
        let genesis = params.genesis().clone();
        let mut chain = ChainIndex::new();
        let id = chain
            .insert(
                genesis.hash(),
                None,
                genesis.header.bits,
                genesis.header.time,
                genesis.is_proof_of_stake(),
            )
            .unwrap();
        chain.connect_tip(id).unwrap();

        let fields = contextual_stake_checks(
            &chain,
            &genesis,
            id,
            None,
            &UnusedReader,
            &UnusedScripts,
            &params,
            1_600_000_000,
        )
        .unwrap();
        assert_eq!(fields.stake_modifier, 0);
        assert!(fields.generated_stake_modifier);
        assert!(fields.proof.is_none());
        // The mainnet genesis checksum is a hard checkpoint.
        assert_eq!(fields.stake_modifier_checksum, 0xfd11_f4e7);

        apply_staking_fields(&mut chain, id, &fields);
        let entry = chain.entry(id);
        assert!(entry.generated_stake_modifier());
        assert_eq!(entry.stake_modifier_checksum, 0xfd11_f4e7);
        assert_eq!(chain.take_dirty(), vec![id]);
    }

    #[test]
    fn test_checkpoint_mismatch_rejected() {
        let params = ChainParams::main();
        // A fake genesis whose hash disagrees with the height-0 checkpoint.
        let mut chain = ChainIndex::new();
        let id = chain
            .insert(fake_hash(1), None, 0x207f_ffff, 1_500_674_579, false)
            .unwrap();
        chain.connect_tip(id).unwrap();

        let block = params.genesis().clone();
        let err = contextual_stake_checks(
            &chain,
            &block,
            id,
            None,
            &UnusedReader,
            &UnusedScripts,
            &params,
            1_600_000_000,
        )
        .unwrap_err();
        assert!(matches!(err, ConsensusError::CheckpointMismatch { .. }));
        assert_eq!(err.dos_score(), 100);
    }

    #[test]
    fn test_pow_height_set_rejects_unlisted_height() {
        let mut params = ChainParams::main();
        params.checkpoints.clear();
        params.consensus.stake_modifier_checkpoints.clear();
        params.consensus.last_pow_block = 20;
        params.consensus.pow_heights = (1..=10).collect();

        let mut chain = ChainIndex::new();
        let mut prev = None;
        let mut ids = Vec::new();
        for n in 0..12u32 {
            let id = chain
                .insert(fake_hash(n), prev, 0x1e0f_ffff, 1_600_000_000 + n * 30, false)
                .unwrap();
            chain.connect_tip(id).unwrap();
            ids.push(id);
            prev = Some(id);
        }
        // Give ancestors their staking fields so the modifier walk works.
        let pow_block = |n: u32| Block::new(
            BlockHeader {
                version: 1,
                hash_prev_block: if n == 0 { Uint256::ZERO } else { fake_hash(n - 1) },
                hash_merkle_root: fake_hash(100 + n),
                time: 1_600_000_000 + n * 30,
                bits: 0x1e0f_ffff,
                nonce: 0,
            },
            vec![Transaction {
                version: 1,
                time: 1_600_000_000 + n * 30,
                vin: vec![TxIn::new(OutPoint::null(), Script::new())],
                vout: vec![TxOut::new(0, Script::new())],
                lock_time: 0,
            }],
        );
        for (n, &id) in ids.iter().enumerate().take(11) {
            let fields = contextual_stake_checks(
                &chain,
                &pow_block(n as u32),
                id,
                None,
                &UnusedReader,
                &UnusedScripts,
                &params,
                1_600_100_000,
            )
            .unwrap();
            apply_staking_fields(&mut chain, id, &fields);
        }

        // Height 11 is within last_pow_block but not in the explicit set.
        let err = contextual_stake_checks(
            &chain,
            &pow_block(11),
            ids[11],
            None,
            &UnusedReader,
            &UnusedScripts,
            &params,
            1_600_100_000,
        )
        .unwrap_err();
        assert!(matches!(err, ConsensusError::PowHeightNotAllowed(11)));
    }

    // ================== block signature ==================

    fn keypair() -> (SecretKey, Vec<u8>) {
        let secret = SecretKey::from_slice(&[0x11; 32]).unwrap();
        let public = PublicKey::from_secret_key(&Secp256k1::new(), &secret);
        (secret, public.serialize().to_vec())
    }

    fn p2pk_script(key: &[u8]) -> Script {
        let mut bytes = vec![key.len() as u8];
        bytes.extend_from_slice(key);
        bytes.push(0xac);
        Script::from_bytes(bytes)
    }

    fn pos_block_with_staker(script_pubkey: Script, script_sig: Script) -> Block {
        let coinbase = Transaction {
            version: 1,
            time: 1_600_000_000,
            vin: vec![TxIn::new(OutPoint::null(), Script::new())],
            vout: vec![TxOut::new(0, Script::new())],
            lock_time: 0,
        };
        let coinstake = Transaction {
            version: 1,
            time: 1_600_000_000,
            vin: vec![TxIn::new(OutPoint::new(fake_hash(50), 0), script_sig)],
            vout: vec![
                TxOut::new(0, Script::new()),
                TxOut::new(COIN, script_pubkey),
            ],
            lock_time: 0,
        };
        Block::new(
            BlockHeader {
                version: 1,
                hash_prev_block: fake_hash(1),
                hash_merkle_root: fake_hash(2),
                time: 1_600_000_000,
                bits: 0x1e0f_ffff,
                nonce: 0,
            },
            vec![coinbase, coinstake],
        )
    }

    fn sign_block(block: &mut Block, secret: &SecretKey) {
        let message = Message::from_digest_slice(block.hash().as_le_bytes()).unwrap();
        let signature = Secp256k1::new().sign_ecdsa(&message, secret);
        block.signature = signature.serialize_der().to_vec();
    }

    #[test]
    fn test_pow_block_signature_must_be_empty() {
        let params = ChainParams::main();
        let genesis = params.genesis().clone();
        assert!(check_block_signature(&genesis).is_ok());

        let mut signed = genesis;
        signed.signature = vec![1, 2, 3];
        assert!(check_block_signature(&signed).is_err());
    }

    #[test]
    fn test_p2pk_block_signature_verifies() {
        let (secret, public) = keypair();
        let mut block = pos_block_with_staker(p2pk_script(&public), Script::new());
        sign_block(&mut block, &secret);
        assert!(check_block_signature(&block).is_ok());

        // A different key's signature fails.
        let other = SecretKey::from_slice(&[0x22; 32]).unwrap();
        sign_block(&mut block, &other);
        assert!(check_block_signature(&block).is_err());

        // An empty signature fails.
        block.signature.clear();
        assert!(check_block_signature(&block).is_err());
    }

    #[test]
    fn test_cold_stake_block_signature_verifies() {
        let (secret, public) = keypair();

        // Cold-staking scriptPubKey in the staker output.
        let mut cs = vec![0x76, 0xa9, 0x7b, 0x63, 0xd1, 20];
        cs.extend_from_slice(&[0x11; 20]);
        cs.push(0x67);
        cs.push(20);
        cs.extend_from_slice(&[0x22; 20]);
        cs.extend_from_slice(&[0x68, 0x88, 0xac]);
        let cold_stake_script = Script::from_bytes(cs);

        // Kernel scriptSig: signature push, flag push, then the key.
        let mut sig_bytes = vec![2u8, 0xde, 0xad, 1, 1, public.len() as u8];
        sig_bytes.extend_from_slice(&public);
        let script_sig = Script::from_bytes(sig_bytes);

        let mut block = pos_block_with_staker(cold_stake_script, script_sig);
        sign_block(&mut block, &secret);
        assert!(check_block_signature(&block).is_ok());
    }

    #[test]
    fn test_cold_stake_key_extraction_errors_are_soft() {
        let (secret, _) = keypair();
        let mut cs = vec![0x76, 0xa9, 0x7b, 0x63, 0xd1, 20];
        cs.extend_from_slice(&[0x11; 20]);
        cs.push(0x67);
        cs.push(20);
        cs.extend_from_slice(&[0x22; 20]);
        cs.extend_from_slice(&[0x68, 0x88, 0xac]);

        // Truncated scriptSig: the declared signature push runs past the end.
        let mut block = pos_block_with_staker(
            Script::from_bytes(cs),
            Script::from_bytes(vec![200, 1, 2]),
        );
        sign_block(&mut block, &secret);
        let err = check_block_signature(&block).unwrap_err();
        assert!(matches!(err, ConsensusError::ColdStakeKeySizeInvalid));
        assert_eq!(err.dos_score(), 1);
    }

    #[test]
    fn test_non_standard_staker_output_rejected() {
        let (secret, _) = keypair();
        let mut block =
            pos_block_with_staker(Script::from_bytes(vec![0x51]), Script::new());
        sign_block(&mut block, &secret);
        assert!(matches!(
            check_block_signature(&block).unwrap_err(),
            ConsensusError::BadBlockSignature(_)
        ));
    }
}
