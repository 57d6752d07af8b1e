//! Orphan-block pool.
//!
//! Blocks whose parent is unknown wait here until the parent connects. The
//! pool is bounded: when it is full, adding a block first evicts the deepest
//! descendant of a uniformly random entry, so no peer can pin the pool with
//! a long orphan chain.
//!
//! All externally visible operations take the single pool mutex; callers
//! that need to batch several operations atomically take the guard once via
//! [`OrphanBlocks::lock`] and use the inner methods directly.

use neblio_primitives::{Block, Uint256};
use parking_lot::{Mutex, MutexGuard};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::error;

/// Default pool capacity.
pub const MAX_ORPHANS_DEFAULT: usize = 64;

/// An orphaned block and the peer that supplied it.
#[derive(Debug, Clone)]
pub struct OrphanBlock {
    pub block: Arc<Block>,
    pub sender_node_id: Option<i64>,
    hash: Uint256,
}

impl OrphanBlock {
    fn make(block: Arc<Block>, sender_node_id: Option<i64>) -> Self {
        let hash = block.hash();
        OrphanBlock {
            block,
            sender_node_id,
            hash,
        }
    }

    pub fn hash(&self) -> Uint256 {
        self.hash
    }

    pub fn prev_hash(&self) -> Uint256 {
        self.block.header.hash_prev_block
    }
}

/// Pool state; obtained through [`OrphanBlocks::lock`] for batched use.
#[derive(Debug)]
pub struct OrphanBlocksInner {
    by_hash: BTreeMap<Uint256, OrphanBlock>,
    by_prev_hash: BTreeMap<Uint256, Vec<OrphanBlock>>,
    max_orphans: usize,
    rng: SmallRng,
}

impl OrphanBlocksInner {
    pub fn block_exists(&self, hash: &Uint256) -> bool {
        self.by_hash.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_hash.clear();
        self.by_prev_hash.clear();
    }

    /// Add a block; returns false if it is already pooled. Evicts first if
    /// the pool is at capacity.
    pub fn add_block(&mut self, block: Arc<Block>, sender_node_id: Option<i64>) -> bool {
        let orphan = OrphanBlock::make(block, sender_node_id);
        if self.by_hash.contains_key(&orphan.hash) {
            return false;
        }

        self.prune();

        self.by_prev_hash
            .entry(orphan.prev_hash())
            .or_default()
            .push(orphan.clone());
        self.by_hash.insert(orphan.hash, orphan);
        true
    }

    /// Hash of the topmost ancestor of `hash` still in the pool.
    pub fn get_block_root(&self, hash: &Uint256) -> Option<Uint256> {
        let mut current = self.by_hash.get(hash)?;
        loop {
            match self.by_hash.get(&current.prev_hash()) {
                Some(parent) => current = parent,
                None => return Some(current.hash),
            }
        }
    }

    /// Orphans whose parent is exactly `block_hash`, without removing them.
    pub fn children_of(&self, block_hash: &Uint256) -> &[OrphanBlock] {
        self.by_prev_hash
            .get(block_hash)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remove and return all orphans whose parent is exactly `block_hash`
    /// (one level only; the caller iterates to drain a subtree).
    pub fn take_all_children_of(&mut self, block_hash: &Uint256) -> Vec<OrphanBlock> {
        let children = match self.by_prev_hash.get(block_hash) {
            Some(children) => children.clone(),
            None => return Vec::new(),
        };
        for child in &children {
            self.drop_block(&child.hash);
        }
        children
    }

    /// Remove one block from both indexes, deleting its parent bucket if it
    /// becomes empty.
    pub fn drop_block(&mut self, hash: &Uint256) -> bool {
        let orphan = match self.by_hash.remove(hash) {
            Some(orphan) => orphan,
            None => return false,
        };
        let prev_hash = orphan.prev_hash();
        match self.by_prev_hash.get_mut(&prev_hash) {
            Some(bucket) if bucket.len() == 1 => {
                self.by_prev_hash.remove(&prev_hash);
            }
            Some(bucket) => {
                let before = bucket.len();
                bucket.retain(|candidate| candidate.hash != *hash);
                if bucket.len() == before {
                    error!(%hash, "orphan missing from its parent bucket");
                }
            }
            None => {
                debug_assert!(false, "orphan without a parent bucket");
                error!(%hash, "orphan without a parent bucket");
            }
        }
        true
    }

    /// Evict the deepest descendant of a uniformly random entry, if the pool
    /// is at capacity.
    fn prune(&mut self) {
        if self.by_hash.len() < self.max_orphans {
            return;
        }

        let victim_root = {
            let index = self.rng.gen_range(0..self.by_hash.len());
            *self.by_hash.keys().nth(index).expect("index is in range")
        };
        self.del_one_deepest_child(victim_root);
    }

    fn del_one_deepest_child(&mut self, root: Uint256) {
        let mut current = root;
        while let Some(children) = self.by_prev_hash.get(&current) {
            current = children[0].hash;
        }
        self.drop_block(&current);
    }
}

/// The orphan pool.
#[derive(Debug)]
pub struct OrphanBlocks {
    inner: Mutex<OrphanBlocksInner>,
}

impl OrphanBlocks {
    pub fn new(max_orphans: usize) -> Self {
        Self::with_rng(max_orphans, SmallRng::from_entropy())
    }

    /// Deterministic construction for tests.
    pub fn with_seed(max_orphans: usize, seed: u64) -> Self {
        Self::with_rng(max_orphans, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(max_orphans: usize, rng: SmallRng) -> Self {
        assert!(max_orphans > 0);
        OrphanBlocks {
            inner: Mutex::new(OrphanBlocksInner {
                by_hash: BTreeMap::new(),
                by_prev_hash: BTreeMap::new(),
                max_orphans,
                rng,
            }),
        }
    }

    /// Take the pool lock for a batch of operations.
    pub fn lock(&self) -> MutexGuard<'_, OrphanBlocksInner> {
        self.inner.lock()
    }

    pub fn add_block(&self, block: Arc<Block>, sender_node_id: Option<i64>) -> bool {
        self.lock().add_block(block, sender_node_id)
    }

    pub fn block_exists(&self, hash: &Uint256) -> bool {
        self.lock().block_exists(hash)
    }

    pub fn get_block_root(&self, hash: &Uint256) -> Option<Uint256> {
        self.lock().get_block_root(hash)
    }

    pub fn take_all_children_of(&self, block_hash: &Uint256) -> Vec<OrphanBlock> {
        self.lock().take_all_children_of(block_hash)
    }

    pub fn clear(&self) {
        self.lock().clear()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for OrphanBlocks {
    fn default() -> Self {
        Self::new(MAX_ORPHANS_DEFAULT)
    }
}
