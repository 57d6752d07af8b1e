//! Difficulty retargeting.
//!
//! Three versions of the PPCoin-style per-block retarget filter, selected by
//! height: V1 below 2000, V3 from the retarget-correction fork, V2 between.
//! All versions retarget from the previous two blocks *of the requested
//! proof kind*; V3 replaces the naive two-block spacing with an average of
//! sorted adjacent differences over the last hundred blocks.

use crate::error::{ConsensusError, ConsensusResult};
use crate::params::Consensus;
use neblio_chain::{BlockIndexId, ChainIndex};
use neblio_primitives::{compact_to_target, target_to_compact, Uint256};
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

/// Rewind from `start` to the nearest block matching the requested proof
/// kind (stopping at genesis regardless).
pub fn get_last_block_index(
    chain: &ChainIndex,
    start: BlockIndexId,
    proof_of_stake: bool,
) -> BlockIndexId {
    let mut id = start;
    loop {
        let entry = chain.entry(id);
        match entry.prev {
            Some(prev) if entry.is_proof_of_stake() != proof_of_stake => id = prev,
            _ => return id,
        }
    }
}

/// Compute the required compact target for the block after `tip`.
pub fn get_next_work_required(
    chain: &ChainIndex,
    tip: Option<BlockIndexId>,
    proof_of_stake: bool,
    consensus: &Consensus,
) -> u32 {
    let target_limit = if proof_of_stake {
        &consensus.pos_limit
    } else {
        &consensus.pow_limit
    };

    let tip_id = match tip {
        Some(id) => id,
        None => return target_to_compact(target_limit), // genesis block
    };

    if consensus.pow_no_retargeting {
        if proof_of_stake {
            return target_to_compact(&consensus.pow_limit);
        }
        return chain.entry(tip_id).bits;
    }

    let height = chain.entry(tip_id).height;
    if height < 2000 {
        next_target_v1(chain, tip_id, proof_of_stake, consensus)
    } else if height >= consensus.fork4_retarget_correct_height {
        next_target_v3(chain, tip_id, proof_of_stake, consensus)
    } else {
        next_target_v2(chain, tip_id, proof_of_stake, consensus)
    }
}

/// Find the previous two blocks of the requested kind; `None` means the
/// chain is too short and the caller returns the target limit.
fn two_last_of_kind(
    chain: &ChainIndex,
    tip_id: BlockIndexId,
    proof_of_stake: bool,
) -> Option<(BlockIndexId, BlockIndexId)> {
    let prev = get_last_block_index(chain, tip_id, proof_of_stake);
    let before_prev = chain.entry(prev).prev?; // first block
    let prev_prev = get_last_block_index(chain, before_prev, proof_of_stake);
    Some((prev, prev_prev))
}

/// Retarget with an exponential move toward the target spacing.
fn retarget(prev_bits: u32, numerator: i64, denominator: i64, limit: &BigUint) -> u32 {
    if numerator <= 0 {
        // A negative multiplier wraps in 512-bit arithmetic and is clamped
        // to the limit.
        return target_to_compact(limit);
    }
    let prev_target = compact_to_target(prev_bits).target;
    let new_target = prev_target * numerator as u64 / denominator as u64;
    if new_target.is_zero() || new_target > *limit {
        return target_to_compact(limit);
    }
    target_to_compact(&new_target)
}

fn next_target_v1(
    chain: &ChainIndex,
    tip_id: BlockIndexId,
    proof_of_stake: bool,
    consensus: &Consensus,
) -> u32 {
    let limit = if proof_of_stake {
        &consensus.pos_limit
    } else {
        &consensus.pow_limit
    };
    let (prev, prev_prev) = match two_last_of_kind(chain, tip_id, proof_of_stake) {
        Some(pair) => pair,
        None => return target_to_compact(limit),
    };
    if chain.entry(prev_prev).prev.is_none() {
        return target_to_compact(limit); // second block
    }

    let actual_spacing = chain.entry(prev).block_time() - chain.entry(prev_prev).block_time();
    let spacing = i64::from(consensus.target_spacing(chain.entry(tip_id).height));
    let interval = consensus.target_timespan / spacing;

    retarget(
        chain.entry(prev).bits,
        (interval - 1) * spacing + 2 * actual_spacing,
        (interval + 1) * spacing,
        limit,
    )
}

fn next_target_v2(
    chain: &ChainIndex,
    tip_id: BlockIndexId,
    proof_of_stake: bool,
    consensus: &Consensus,
) -> u32 {
    let limit = if proof_of_stake {
        &consensus.pos_limit
    } else {
        &consensus.pow_limit
    };
    let (prev, prev_prev) = match two_last_of_kind(chain, tip_id, proof_of_stake) {
        Some(pair) => pair,
        None => return target_to_compact(limit),
    };

    let spacing = i64::from(consensus.target_spacing(chain.entry(tip_id).height));
    let mut actual_spacing = chain.entry(prev).block_time() - chain.entry(prev_prev).block_time();
    if actual_spacing < 0 {
        actual_spacing = spacing;
    }
    let interval = consensus.target_timespan / spacing;

    retarget(
        chain.entry(prev).bits,
        (interval - 1) * spacing + 2 * actual_spacing,
        (interval + 1) * spacing,
        limit,
    )
}

fn next_target_v3(
    chain: &ChainIndex,
    tip_id: BlockIndexId,
    proof_of_stake: bool,
    consensus: &Consensus,
) -> u32 {
    let limit = if proof_of_stake {
        &consensus.pos_limit
    } else {
        &consensus.pow_limit
    };
    let (prev, prev_prev) = match two_last_of_kind(chain, tip_id, proof_of_stake) {
        Some(pair) => pair,
        None => return target_to_compact(limit),
    };
    if chain.entry(prev_prev).prev.is_none() {
        return target_to_compact(limit); // second block
    }

    let tip_height = chain.entry(tip_id).height;
    let spacing = i64::from(consensus.target_spacing(tip_height));
    let mut actual_spacing = calculate_actual_block_spacing_v3(chain, tip_id, consensus);
    if actual_spacing < 0 {
        actual_spacing = spacing;
    }

    // k, l and m are tuned for a per-block difficulty shift in [-3%, +5%]
    // with actual spacing in [0, FutureDrift]; retune them together.
    assert_eq!(crate::stake::future_drift(0), 10 * 60);
    assert_eq!(consensus.target_spacing(tip_height), 30);
    assert_eq!(consensus.target_timespan, 2 * 60 * 60);

    const K: i64 = 15;
    const L: i64 = 7;
    const M: i64 = 90;
    let interval = consensus.target_timespan / spacing;

    retarget(
        chain.entry(prev).bits,
        (interval - L + K) * spacing + (M + L) * actual_spacing,
        (interval + K) * spacing + M * actual_spacing,
        limit,
    )
}

/// Average block spacing over the last hundred blocks, computed from sorted
/// adjacent differences so stray timestamps cannot go negative.
pub fn calculate_actual_block_spacing_v3(
    chain: &ChainIndex,
    tip_id: BlockIndexId,
    consensus: &Consensus,
) -> i64 {
    const TARGET_AVERAGE_BLOCK_COUNT: i64 = 100;

    let fork_block = i64::from(consensus.fork4_retarget_correct_height);
    let tip = chain.entry(tip_id);
    let mut count = i64::from(tip.height) - (fork_block + 1);
    count = count.clamp(2, TARGET_AVERAGE_BLOCK_COUNT);

    let mut block_times = Vec::with_capacity(count as usize);
    let mut cursor = Some(tip_id);
    for _ in 0..count {
        match cursor {
            Some(id) => {
                let entry = chain.entry(id);
                block_times.push(entry.block_time());
                cursor = entry.prev;
            }
            None => break,
        }
    }
    debug_assert!(block_times.len() >= 2);
    block_times.sort_unstable();

    let spread: i64 = block_times
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .sum();
    spread / (block_times.len() as i64 - 1)
}

/// Bitcoin-style clamped retarget used by the signet/regtest lineage.
pub fn calculate_next_work_required(
    chain: &ChainIndex,
    tip_id: BlockIndexId,
    first_block_time: i64,
    consensus: &Consensus,
) -> u32 {
    let tip = chain.entry(tip_id);
    if consensus.pow_no_retargeting {
        return tip.bits;
    }

    let mut actual_timespan = tip.block_time() - first_block_time;
    actual_timespan = actual_timespan.clamp(
        consensus.pow_target_timespan / 4,
        consensus.pow_target_timespan * 4,
    );

    let new_target = compact_to_target(tip.bits).target * actual_timespan as u64
        / consensus.pow_target_timespan as u64;
    if new_target > consensus.pow_limit {
        return target_to_compact(&consensus.pow_limit);
    }
    target_to_compact(&new_target)
}

/// Check a hash against its claimed compact target.
pub fn check_proof_of_work(
    hash: &Uint256,
    bits: u32,
    consensus: &Consensus,
) -> ConsensusResult<()> {
    let decoded = compact_to_target(bits);
    if decoded.negative
        || decoded.target.is_zero()
        || decoded.overflow
        || decoded.target > consensus.pow_limit
    {
        return Err(ConsensusError::InvalidTarget(bits));
    }
    if hash.to_biguint() > decoded.target {
        debug!(%hash, bits = format_args!("{bits:#010x}"), "hash above target");
        return Err(ConsensusError::HighHash(*hash));
    }
    Ok(())
}
