//! The block-index arena.
//!
//! Every connected block gets one `BlockIndexEntry`, owned by the arena for
//! the lifetime of the chain state and addressed by a stable integer id;
//! back-references are ids, not pointers. A hash map resolves block hashes
//! to ids and a height-ordered vector tracks the active chain.
//!
//! Readers of an entry's staking fields (modifier, checksum, proof hash,
//! flags) must observe them as one tuple; callers achieve that by wrapping
//! the whole index in the main-chain lock and installing the fields through
//! a single `&mut` borrow.

use crate::error::{ChainError, ChainResult};
use neblio_primitives::{block_proof, OutPoint, Uint256};
use num_bigint::BigUint;
use std::collections::{BTreeSet, HashMap};

/// Stable id of an entry in the arena.
pub type BlockIndexId = usize;

/// Bits of `BlockIndexEntry::flags`.
pub mod flags {
    /// The block is proof-of-stake.
    pub const PROOF_OF_STAKE: u32 = 1 << 0;
    /// The entropy bit of the block hash.
    pub const STAKE_ENTROPY: u32 = 1 << 1;
    /// A new stake modifier was generated at this block.
    pub const STAKE_MODIFIER: u32 = 1 << 2;
}

/// In-memory record for a connected block.
#[derive(Debug, Clone)]
pub struct BlockIndexEntry {
    pub hash: Uint256,
    pub prev: Option<BlockIndexId>,
    pub height: i32,
    /// Cumulative work up to and including this block.
    pub chain_work: BigUint,
    pub bits: u32,
    pub time: u32,
    pub flags: u32,
    pub stake_modifier: u64,
    pub stake_modifier_checksum: u32,
    pub hash_proof_of_stake: Uint256,
    /// Kernel outpoint of the coin-stake, proof-of-stake blocks only.
    pub prevout_stake: Option<OutPoint>,
    /// Coin-stake transaction time, proof-of-stake blocks only.
    pub stake_time: u32,
}

impl BlockIndexEntry {
    pub fn is_proof_of_stake(&self) -> bool {
        self.flags & flags::PROOF_OF_STAKE != 0
    }

    pub fn is_proof_of_work(&self) -> bool {
        !self.is_proof_of_stake()
    }

    pub fn generated_stake_modifier(&self) -> bool {
        self.flags & flags::STAKE_MODIFIER != 0
    }

    pub fn stake_entropy_bit(&self) -> u64 {
        ((self.flags & flags::STAKE_ENTROPY) >> 1) as u64
    }

    /// Returns false if the bit is out of range.
    pub fn set_stake_entropy_bit(&mut self, bit: u64) -> bool {
        if bit > 1 {
            return false;
        }
        self.flags &= !flags::STAKE_ENTROPY;
        self.flags |= (bit as u32) << 1;
        true
    }

    pub fn set_stake_modifier(&mut self, modifier: u64, generated: bool) {
        self.stake_modifier = modifier;
        if generated {
            self.flags |= flags::STAKE_MODIFIER;
        } else {
            self.flags &= !flags::STAKE_MODIFIER;
        }
    }

    pub fn block_time(&self) -> i64 {
        i64::from(self.time)
    }
}

/// The block-index arena plus active-chain view.
#[derive(Debug, Default)]
pub struct ChainIndex {
    entries: Vec<BlockIndexEntry>,
    by_hash: HashMap<Uint256, BlockIndexId>,
    /// Active chain: `active[h]` is the id of the main-chain block at height `h`.
    active: Vec<BlockIndexId>,
    /// Entries with staking fields modified since the last flush.
    dirty: BTreeSet<BlockIndexId>,
}

impl ChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block to the index, chaining height and work from the parent.
    ///
    /// Staking fields start zeroed; they are installed later by the
    /// contextual proof-of-stake checks.
    pub fn insert(
        &mut self,
        hash: Uint256,
        prev: Option<BlockIndexId>,
        bits: u32,
        time: u32,
        proof_of_stake: bool,
    ) -> ChainResult<BlockIndexId> {
        if self.by_hash.contains_key(&hash) {
            return Err(ChainError::DuplicateBlock(hash));
        }
        let (height, parent_work) = match prev {
            Some(prev_id) => {
                let parent = self
                    .entries
                    .get(prev_id)
                    .ok_or(ChainError::UnknownParent(prev_id))?;
                (parent.height + 1, parent.chain_work.clone())
            }
            None => (0, BigUint::default()),
        };

        let id = self.entries.len();
        self.entries.push(BlockIndexEntry {
            hash,
            prev,
            height,
            chain_work: parent_work + block_proof(bits),
            bits,
            time,
            flags: if proof_of_stake {
                flags::PROOF_OF_STAKE
            } else {
                0
            },
            stake_modifier: 0,
            stake_modifier_checksum: 0,
            hash_proof_of_stake: Uint256::ZERO,
            prevout_stake: None,
            stake_time: 0,
        });
        self.by_hash.insert(hash, id);
        Ok(id)
    }

    pub fn lookup(&self, hash: &Uint256) -> Option<BlockIndexId> {
        self.by_hash.get(hash).copied()
    }

    pub fn entry(&self, id: BlockIndexId) -> &BlockIndexEntry {
        &self.entries[id]
    }

    pub fn entry_mut(&mut self, id: BlockIndexId) -> &mut BlockIndexEntry {
        &mut self.entries[id]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Id of the active-chain tip.
    pub fn tip(&self) -> Option<BlockIndexId> {
        self.active.last().copied()
    }

    /// Id of the active-chain block at a height.
    pub fn at_height(&self, height: i32) -> Option<BlockIndexId> {
        if height < 0 {
            return None;
        }
        self.active.get(height as usize).copied()
    }

    /// Extend the active chain by one block; the block's parent must be the
    /// current tip (or the chain must be empty for genesis).
    pub fn connect_tip(&mut self, id: BlockIndexId) -> ChainResult<()> {
        let entry = &self.entries[id];
        match self.tip() {
            None => {}
            Some(tip_id) if entry.prev == Some(tip_id) => {}
            Some(tip_id) => {
                return Err(ChainError::DoesNotConnect {
                    hash: entry.hash,
                    tip: self.entries[tip_id].hash,
                });
            }
        }
        self.active.push(id);
        Ok(())
    }

    /// Rebuild the active chain so that `tip` is its last block, following
    /// back-references to genesis. Used when switching to a better fork.
    pub fn set_active_tip(&mut self, tip: BlockIndexId) {
        let mut chain = Vec::with_capacity((self.entries[tip].height + 1) as usize);
        let mut cursor = Some(tip);
        while let Some(id) = cursor {
            chain.push(id);
            cursor = self.entries[id].prev;
        }
        chain.reverse();
        self.active = chain;
    }

    /// The active-chain successor of `id`, if `id` is itself on the active
    /// chain and not the tip.
    pub fn next_in_active_chain(&self, id: BlockIndexId) -> Option<BlockIndexId> {
        let height = self.entries[id].height;
        if self.at_height(height) != Some(id) {
            return None;
        }
        self.at_height(height + 1)
    }

    /// Queue an entry for flushing to persistent storage.
    pub fn mark_dirty(&mut self, id: BlockIndexId) {
        self.dirty.insert(id);
    }

    /// Drain the pending-flush set.
    pub fn take_dirty(&mut self) -> Vec<BlockIndexId> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neblio_primitives::block_proof;

    fn hash(n: u8) -> Uint256 {
        Uint256::from_le_bytes([n; 32])
    }

    fn build_chain(index: &mut ChainIndex, count: u8) -> Vec<BlockIndexId> {
        let mut ids = Vec::new();
        let mut prev = None;
        for n in 0..count {
            let id = index
                .insert(hash(n + 1), prev, 0x207f_ffff, 1_600_000_000 + n as u32 * 30, n % 2 == 1)
                .unwrap();
            index.connect_tip(id).unwrap();
            ids.push(id);
            prev = Some(id);
        }
        ids
    }

    #[test]
    fn test_height_and_chain_work_chain_from_parent() {
        let mut index = ChainIndex::new();
        let ids = build_chain(&mut index, 4);
        for (expected_height, &id) in ids.iter().enumerate() {
            let entry = index.entry(id);
            assert_eq!(entry.height, expected_height as i32);
            let parent_work = entry
                .prev
                .map(|p| index.entry(p).chain_work.clone())
                .unwrap_or_default();
            assert_eq!(entry.chain_work, parent_work + block_proof(entry.bits));
        }
    }

    #[test]
    fn test_duplicate_hash_rejected() {
        let mut index = ChainIndex::new();
        index.insert(hash(1), None, 0x207f_ffff, 0, false).unwrap();
        assert!(matches!(
            index.insert(hash(1), None, 0x207f_ffff, 0, false),
            Err(ChainError::DuplicateBlock(_))
        ));
    }

    #[test]
    fn test_connect_tip_requires_parent() {
        let mut index = ChainIndex::new();
        let genesis = index.insert(hash(1), None, 0x207f_ffff, 0, false).unwrap();
        index.connect_tip(genesis).unwrap();
        let orphan_side = index
            .insert(hash(9), None, 0x207f_ffff, 0, false)
            .unwrap();
        assert!(matches!(
            index.connect_tip(orphan_side),
            Err(ChainError::DoesNotConnect { .. })
        ));
    }

    #[test]
    fn test_next_in_active_chain() {
        let mut index = ChainIndex::new();
        let ids = build_chain(&mut index, 3);
        assert_eq!(index.next_in_active_chain(ids[0]), Some(ids[1]));
        assert_eq!(index.next_in_active_chain(ids[2]), None);

        // A fork entry off block 0 is not on the active chain.
        let fork = index
            .insert(hash(0xee), Some(ids[0]), 0x207f_ffff, 5, false)
            .unwrap();
        assert_eq!(index.next_in_active_chain(fork), None);
    }

    #[test]
    fn test_set_active_tip_rebuilds_from_back_references() {
        let mut index = ChainIndex::new();
        let ids = build_chain(&mut index, 3);
        let fork_a = index
            .insert(hash(0xa0), Some(ids[1]), 0x207f_ffff, 99, false)
            .unwrap();
        index.set_active_tip(fork_a);
        assert_eq!(index.tip(), Some(fork_a));
        assert_eq!(index.at_height(0), Some(ids[0]));
        assert_eq!(index.at_height(1), Some(ids[1]));
        assert_eq!(index.at_height(2), Some(fork_a));
        assert_eq!(index.at_height(3), None);
    }

    #[test]
    fn test_entropy_bit_round_trip() {
        let mut index = ChainIndex::new();
        let id = index.insert(hash(1), None, 0x207f_ffff, 0, false).unwrap();
        let entry = index.entry_mut(id);
        assert!(entry.set_stake_entropy_bit(1));
        assert_eq!(entry.stake_entropy_bit(), 1);
        assert!(entry.set_stake_entropy_bit(0));
        assert_eq!(entry.stake_entropy_bit(), 0);
        assert!(!entry.set_stake_entropy_bit(2));
    }

    #[test]
    fn test_stake_modifier_flag() {
        let mut index = ChainIndex::new();
        let id = index.insert(hash(1), None, 0x207f_ffff, 0, true).unwrap();
        let entry = index.entry_mut(id);
        entry.set_stake_modifier(0xdead_beef, true);
        assert!(entry.generated_stake_modifier());
        assert_eq!(entry.stake_modifier, 0xdead_beef);
        entry.set_stake_modifier(0xdead_beef, false);
        assert!(!entry.generated_stake_modifier());
        assert!(entry.is_proof_of_stake());
    }

    #[test]
    fn test_dirty_set_drains() {
        let mut index = ChainIndex::new();
        let ids = build_chain(&mut index, 2);
        index.mark_dirty(ids[1]);
        index.mark_dirty(ids[0]);
        index.mark_dirty(ids[1]);
        assert_eq!(index.take_dirty(), vec![ids[0], ids[1]]);
        assert!(index.take_dirty().is_empty());
    }
}
