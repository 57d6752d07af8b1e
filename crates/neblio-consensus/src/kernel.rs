//! Proof-of-stake kernel.
//!
//! The stake modifier scrambles kernel hashes so a coin owner cannot
//! precompute future proofs at confirmation time. It is a 64-bit value
//! recomputed once per modifier interval of wall-clock time, one bit per
//! selection round: each round picks a past block by hashing its proof-hash
//! with the previous modifier and contributes that block's entropy bit.
//!
//! A coin-stake kernel must satisfy
//! `H(modifier ‖ tBlockFrom ‖ txPrevOffset ‖ txPrev.nTime ‖ prevout.n ‖ tTx)
//!  ≤ value · weight / COIN / 86400 · targetPerCoinDay`,
//! making the chance of staking proportional to coin age. Block and tx
//! hashes are deliberately absent from the preimage: they can be ground out
//! in quantity, which would degrade the system back to proof-of-work.

use crate::error::{ConsensusError, ConsensusResult};
use crate::interfaces::{BlockTxReader, ScriptVerifier, TxIndex};
use crate::params::Consensus;
use neblio_chain::{BlockIndexId, ChainIndex};
use neblio_primitives::{
    compact_to_target, BlockHeader, HashWriter, OutPoint, Transaction, Uint256, COIN,
};
use num_bigint::BigUint;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// Ratio of selection-section length between the last and first group.
pub const MODIFIER_INTERVAL_RATIO: i64 = 3;

/// Successful kernel evaluation.
#[derive(Debug, Clone)]
pub struct KernelProof {
    pub hash_proof_of_stake: Uint256,
    /// Coin-day weight times the per-coin-day target, exact.
    pub target_proof_of_stake: BigUint,
}

/// Length in seconds of selection section `section`; sections shrink
/// geometrically from the most recent group to the oldest.
pub fn get_stake_modifier_selection_interval_section(consensus: &Consensus, section: usize) -> i64 {
    assert!(section < 64);
    consensus.stake_modifier_interval() * 63
        / (63 + (63 - section as i64) * (MODIFIER_INTERVAL_RATIO - 1))
}

/// Total selection interval in seconds.
pub fn get_stake_modifier_selection_interval(consensus: &Consensus) -> i64 {
    (0..64)
        .map(|section| get_stake_modifier_selection_interval_section(consensus, section))
        .sum()
}

/// Walk back to the nearest ancestor that generated a stake modifier;
/// returns the modifier and its generation time.
fn get_last_stake_modifier(chain: &ChainIndex, start: BlockIndexId) -> ConsensusResult<(u64, i64)> {
    let mut id = start;
    loop {
        let entry = chain.entry(id);
        if entry.generated_stake_modifier() {
            return Ok((entry.stake_modifier, entry.block_time()));
        }
        match entry.prev {
            Some(prev) => id = prev,
            None => return Err(ConsensusError::NoStakeModifierGenerated),
        }
    }
}

/// Select one block from the time-ordered candidates: the smallest
/// selection hash among unselected candidates up to `selection_stop`,
/// with proof-of-stake candidates favored by a 32-bit right shift.
fn select_block_from_candidates(
    chain: &ChainIndex,
    sorted_by_timestamp: &[(i64, Uint256)],
    selected: &BTreeMap<Uint256, BlockIndexId>,
    selection_stop: i64,
    prev_modifier: u64,
) -> ConsensusResult<Option<BlockIndexId>> {
    let mut best: Option<(BigUint, BlockIndexId)> = None;
    for (_, hash) in sorted_by_timestamp {
        let id = chain
            .lookup(hash)
            .ok_or(ConsensusError::CandidateBlockMissing(*hash))?;
        let entry = chain.entry(id);
        if best.is_some() && entry.block_time() > selection_stop {
            break;
        }
        if selected.contains_key(hash) {
            continue;
        }

        let proof_hash = if entry.is_proof_of_stake() {
            entry.hash_proof_of_stake
        } else {
            entry.hash
        };
        let mut writer = HashWriter::new();
        writer.write_uint256(&proof_hash).write_u64(prev_modifier);
        let mut selection_hash = writer.finalize().to_biguint();
        // Divide by 2^32 so proof-of-stake always beats proof-of-work;
        // this preserves the energy-efficiency property.
        if entry.is_proof_of_stake() {
            selection_hash >>= 32u32;
        }

        match &best {
            Some((best_hash, _)) if selection_hash >= *best_hash => {}
            _ => best = Some((selection_hash, id)),
        }
    }
    Ok(best.map(|(_, id)| id))
}

/// Compute the stake modifier for `current`.
///
/// Returns `(modifier, generated)`: if the previous block is still inside
/// the same modifier interval the existing modifier is returned unchanged
/// with `generated = false`. Otherwise candidates from one selection
/// interval before the interval boundary are sorted by `(time, hash)` and
/// 64 rounds of selection assemble a new modifier from their entropy bits.
pub fn compute_next_stake_modifier(
    chain: &ChainIndex,
    current: BlockIndexId,
    consensus: &Consensus,
) -> ConsensusResult<(u64, bool)> {
    let prev_id = match chain.entry(current).prev {
        Some(prev) => prev,
        None => return Ok((0, true)), // genesis block's modifier is 0
    };

    let (modifier, modifier_time) = get_last_stake_modifier(chain, prev_id)?;
    trace!(
        modifier = format_args!("{modifier:#018x}"),
        modifier_time,
        "previous stake modifier"
    );

    let interval = consensus.stake_modifier_interval();
    let prev = chain.entry(prev_id);
    if modifier_time / interval >= prev.block_time() / interval {
        return Ok((modifier, false));
    }

    // Candidates: all ancestors inside one selection interval before the
    // interval boundary, ordered by (time, hash).
    let selection_interval = get_stake_modifier_selection_interval(consensus);
    let selection_interval_start =
        (prev.block_time() / interval) * interval - selection_interval;
    let mut candidates: Vec<(i64, Uint256)> = Vec::new();
    let mut cursor = Some(prev_id);
    while let Some(id) = cursor {
        let entry = chain.entry(id);
        if entry.block_time() < selection_interval_start {
            break;
        }
        candidates.push((entry.block_time(), entry.hash));
        cursor = entry.prev;
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut new_modifier = 0u64;
    let mut selection_stop = selection_interval_start;
    let mut selected: BTreeMap<Uint256, BlockIndexId> = BTreeMap::new();
    for round in 0..64.min(candidates.len()) {
        selection_stop += get_stake_modifier_selection_interval_section(consensus, round);
        let id =
            select_block_from_candidates(chain, &candidates, &selected, selection_stop, modifier)?
                .ok_or(ConsensusError::ModifierSelectionFailed(round))?;
        let entry = chain.entry(id);
        new_modifier |= entry.stake_entropy_bit() << round;
        selected.insert(entry.hash, id);
        trace!(
            round,
            selection_stop,
            height = entry.height,
            bit = entry.stake_entropy_bit(),
            "selected stake-modifier block"
        );
    }

    debug!(
        modifier = format_args!("{new_modifier:#018x}"),
        time = prev.block_time(),
        "computed new stake modifier"
    );
    Ok((new_modifier, true))
}

/// The modifier used to hash a kernel is the one about a selection interval
/// *after* the block holding the staked coin: walk forward on the active
/// chain until the last generated modifier is old enough.
pub fn get_kernel_stake_modifier(
    chain: &ChainIndex,
    kernel_block: BlockIndexId,
    current_height: i32,
    consensus: &Consensus,
    now: i64,
) -> ConsensusResult<u64> {
    let from = chain.entry(kernel_block);
    let from_time = from.block_time();
    let selection_interval = get_stake_modifier_selection_interval(consensus);
    let stake_min_age = i64::from(consensus.stake_min_age(current_height));

    let mut id = kernel_block;
    let mut modifier_height = from.height;
    let mut modifier_time = from_time;
    while modifier_time < from_time + selection_interval {
        let next = match chain.next_in_active_chain(id) {
            Some(next) => next,
            None => {
                // Reached the best block; happens when the node is behind.
                let best = chain.entry(id);
                if best.block_time() + stake_min_age - selection_interval > now {
                    warn!(
                        best = %best.hash,
                        height = best.height,
                        kernel = %from.hash,
                        "reached best block before the kernel's selection interval elapsed"
                    );
                } else {
                    debug!(
                        best = %best.hash,
                        height = best.height,
                        "stake modifier not yet available; may reconvene after sync"
                    );
                }
                return Err(ConsensusError::KernelModifierUnavailable {
                    best: best.hash,
                    height: best.height,
                });
            }
        };
        id = next;
        let entry = chain.entry(id);
        if entry.generated_stake_modifier() {
            modifier_height = entry.height;
            modifier_time = entry.block_time();
        }
    }

    let entry = chain.entry(id);
    trace!(
        modifier_height,
        modifier_time,
        "kernel stake modifier located"
    );
    Ok(entry.stake_modifier)
}

/// Time weight of a staked interval: seconds beyond the minimum age, capped
/// at the maximum stake age.
pub fn get_weight(
    consensus: &Consensus,
    current_height: i32,
    interval_beginning: i64,
    interval_end: i64,
) -> i64 {
    // Weight starts from zero at the minimum age; this draws more active
    // coins into hashing when proof-of-stake difficulty is low.
    let stake_min_age = i64::from(consensus.stake_min_age(current_height));
    (interval_end - interval_beginning - stake_min_age).min(consensus.stake_max_age)
}

/// Whether a kernel hash meets its coin-day target.
///
/// The product may exceed 256 bits; the original arithmetic treated that
/// overflow as an automatic pass, which exact arithmetic reproduces since
/// every 256-bit hash is below a product of 2^256 or more.
pub fn stake_target_reached(
    hash_proof_of_stake: &Uint256,
    coin_day_weight: &BigUint,
    target_per_coin_day: &BigUint,
) -> bool {
    hash_proof_of_stake.to_biguint() <= coin_day_weight * target_per_coin_day
}

/// Check that the kernel (input 0 of a coin-stake) meets the hash target
/// per coin-day.
#[allow(clippy::too_many_arguments)]
pub fn check_stake_kernel_hash(
    chain: &ChainIndex,
    prev: BlockIndexId,
    bits: u32,
    kernel_block: BlockIndexId,
    tx_prev_offset: u32,
    tx_prev: &Transaction,
    prevout: &OutPoint,
    time_tx: u32,
    consensus: &Consensus,
    now: i64,
) -> ConsensusResult<KernelProof> {
    if time_tx < tx_prev.time {
        return Err(ConsensusError::TimestampViolation {
            tx_time: time_tx,
            kernel_time: tx_prev.time,
        });
    }

    let current_height = chain.entry(prev).height + 1;
    let time_block_from = chain.entry(kernel_block).block_time();
    let stake_min_age = i64::from(consensus.stake_min_age(current_height));
    if time_block_from + stake_min_age > i64::from(time_tx) {
        return Err(ConsensusError::MinAgeViolation {
            block_from_time: time_block_from,
            tx_time: time_tx,
        });
    }

    let target_per_coin_day = compact_to_target(bits).target;
    let value_in = tx_prev
        .vout
        .get(prevout.n as usize)
        .ok_or(ConsensusError::PrevoutOutOfRange(*prevout))?
        .value;

    let weight = get_weight(
        consensus,
        current_height,
        i64::from(tx_prev.time),
        i64::from(time_tx),
    )
    .max(0);
    let coin_day_weight =
        BigUint::from(value_in as u64) * weight as u64 / COIN as u64 / (24 * 60 * 60u64);

    let stake_modifier =
        get_kernel_stake_modifier(chain, kernel_block, current_height, consensus, now)?;

    let mut writer = HashWriter::new();
    writer
        .write_u64(stake_modifier)
        .write_u32(time_block_from as u32)
        .write_u32(tx_prev_offset)
        .write_u32(tx_prev.time)
        .write_u32(prevout.n)
        .write_u32(time_tx);
    let hash_proof_of_stake = writer.finalize();

    if !stake_target_reached(&hash_proof_of_stake, &coin_day_weight, &target_per_coin_day) {
        return Err(ConsensusError::KernelTargetNotMet {
            hash_proof_of_stake,
        });
    }

    trace!(
        modifier = format_args!("{stake_modifier:#018x}"),
        time_block_from,
        tx_prev_offset,
        time_tx_prev = tx_prev.time,
        prevout_n = prevout.n,
        time_tx,
        hash_proof = %hash_proof_of_stake,
        "kernel hash meets target"
    );
    Ok(KernelProof {
        hash_proof_of_stake,
        target_proof_of_stake: coin_day_weight * target_per_coin_day,
    })
}

/// Check the kernel hash target and the coin-stake signature.
///
/// Reads the previous transaction through the transaction index and block
/// files, verifies the coin-stake scriptSig against the spent output, then
/// checks the kernel hash. Kernel failures are soft (DoS 1): they are
/// expected while behind on sync, and the peer-to-peer layer resupplies the
/// block later.
#[allow(clippy::too_many_arguments)]
pub fn check_proof_of_stake(
    chain: &ChainIndex,
    prev: BlockIndexId,
    tx: &Transaction,
    bits: u32,
    tx_index: Option<&dyn TxIndex>,
    block_reader: &dyn BlockTxReader,
    script_verifier: &dyn ScriptVerifier,
    consensus: &Consensus,
    now: i64,
) -> ConsensusResult<KernelProof> {
    if !tx.is_coin_stake() {
        return Err(ConsensusError::MalformedCoinStake(tx.txid()));
    }

    // The transaction index is required to locate txPrev inside its block.
    let tx_index = tx_index.ok_or(ConsensusError::TxIndexUnavailable)?;

    let txin = &tx.vin[0];
    let position = tx_index
        .find_tx_position(&txin.prevout.hash)
        .ok_or(ConsensusError::TxPrevNotFound(txin.prevout.hash))?;

    let (header, tx_prev) = block_reader
        .read_header_and_tx(&position)
        .map_err(|err| ConsensusError::BlockFile(err.to_string()))?;
    if tx_prev.txid() != txin.prevout.hash {
        return Err(ConsensusError::TxidMismatch {
            expected: txin.prevout.hash,
        });
    }

    let kernel_block = chain
        .lookup(&header.hash())
        .ok_or(ConsensusError::InvalidPrevout(txin.prevout))?;

    let prev_out = tx_prev
        .vout
        .get(txin.prevout.n as usize)
        .ok_or(ConsensusError::PrevoutOutOfRange(txin.prevout))?;

    script_verifier
        .verify_coinstake_script(tx, 0, prev_out)
        .map_err(|err| ConsensusError::CoinStakeScriptFailed {
            txid: tx.txid(),
            reason: err.to_string(),
        })?;

    check_stake_kernel_hash(
        chain,
        prev,
        bits,
        kernel_block,
        position.tx_offset + BlockHeader::SERIALIZED_SIZE,
        &tx_prev,
        &txin.prevout,
        tx.time,
        consensus,
        now,
    )
    .map_err(|err| {
        debug!(txid = %tx.txid(), %err, "kernel check failed on coin-stake");
        err
    })
}

/// The coin-stake timestamp must equal the block timestamp (v0.3 protocol).
pub fn check_coin_stake_timestamp(time_block: i64, time_tx: i64) -> bool {
    time_block == time_tx
}

/// Stake-modifier checksum: folds the previous checksum with this block's
/// flags, proof hash (proof-of-stake only) and modifier into 32 bits,
/// making modifier history tamper-evident.
pub fn get_stake_modifier_checksum(
    prev_checksum: Option<u32>,
    is_proof_of_stake: bool,
    hash_proof_of_stake: &Uint256,
    stake_modifier: u64,
    flags: u32,
) -> u32 {
    let mut writer = HashWriter::new();
    if let Some(prev) = prev_checksum {
        writer.write_u32(prev);
    }
    let proof_hash = if is_proof_of_stake {
        *hash_proof_of_stake
    } else {
        Uint256::ZERO
    };
    writer
        .write_u32(flags)
        .write_uint256(&proof_hash)
        .write_u64(stake_modifier);

    let checksum = writer.finalize().to_biguint() >> (256usize - 32);
    checksum.iter_u32_digits().next().unwrap_or(0)
}

/// Verify a computed checksum against the hard checkpoints.
pub fn check_stake_modifier_checkpoints(
    consensus: &Consensus,
    height: i32,
    checksum: u32,
) -> bool {
    match consensus.stake_modifier_checkpoints.get(&height) {
        Some(expected) => *expected == checksum,
        None => true,
    }
}
