//! Intermediate block index.
//!
//! While a peer-supplied header run is being evaluated we stage the headers
//! in memory, chaining height and work forward from a known connected block.
//! The entries are indexed twice — by height and by hash — over shared
//! ownership; heights are unique because only a contiguous run is staged.

use crate::block_index::BlockIndexEntry;
use neblio_primitives::{block_proof, BlockHeader, Uint256};
use num_bigint::BigUint;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A staged header with its would-be chain position.
#[derive(Debug, Clone)]
pub struct IntermediateBlockIndexEntry {
    pub header: BlockHeader,
    pub hash: Uint256,
    pub height: i32,
    pub chain_work: BigUint,
}

impl IntermediateBlockIndexEntry {
    /// Chain a header onto a predecessor's work and height.
    pub fn new(header: BlockHeader, prev_work: &BigUint, prev_height: i32) -> Self {
        let hash = header.hash();
        let chain_work = prev_work + block_proof(header.bits);
        IntermediateBlockIndexEntry {
            header,
            hash,
            height: prev_height + 1,
            chain_work,
        }
    }

    pub fn block_hash(&self) -> Uint256 {
        self.hash
    }
}

/// Dual-keyed index over staged headers.
#[derive(Debug, Default)]
pub struct IntermediateBlockIndex {
    by_height: BTreeMap<i32, Arc<IntermediateBlockIndexEntry>>,
    by_hash: BTreeMap<Uint256, Arc<IntermediateBlockIndexEntry>>,
}

impl IntermediateBlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert into both indexes; fails (and changes nothing) if either key
    /// is already present.
    pub fn insert(&mut self, entry: Arc<IntermediateBlockIndexEntry>) -> bool {
        if self.by_height.contains_key(&entry.height) || self.by_hash.contains_key(&entry.hash) {
            return false;
        }
        self.by_height.insert(entry.height, Arc::clone(&entry));
        self.by_hash.insert(entry.hash, entry);
        true
    }

    pub fn get_by_hash(&self, hash: &Uint256) -> Option<&Arc<IntermediateBlockIndexEntry>> {
        self.by_hash.get(hash)
    }

    pub fn get_by_height(&self, height: i32) -> Option<&Arc<IntermediateBlockIndexEntry>> {
        self.by_height.get(&height)
    }

    /// Entry at offset `i` from the first by height.
    pub fn get(&self, offset: usize) -> Option<&Arc<IntermediateBlockIndexEntry>> {
        let first_height = *self.by_height.keys().next()?;
        self.by_height.get(&(first_height + offset as i32))
    }

    /// Remove across both indexes atomically.
    pub fn erase_by_hash(&mut self, hash: &Uint256) -> bool {
        match self.by_hash.remove(hash) {
            Some(entry) => {
                self.by_height.remove(&entry.height);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.by_height.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_height.is_empty()
    }

    /// Entries in height order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<IntermediateBlockIndexEntry>> {
        self.by_height.values()
    }
}

/// Stage a run of headers extending from a connected block.
///
/// Headers before `to_skip` are already known and ignored; the header at
/// `to_skip` must extend `preceding` directly.
pub fn headers_to_intermediate_block_index(
    to_skip: usize,
    preceding: &BlockIndexEntry,
    headers: &[BlockHeader],
) -> IntermediateBlockIndex {
    let mut index = IntermediateBlockIndex::new();
    if to_skip >= headers.len() {
        return index;
    }
    assert_eq!(
        preceding.hash, headers[to_skip].hash_prev_block,
        "first staged header must extend the preceding block"
    );

    let mut prev_entry = Arc::new(IntermediateBlockIndexEntry::new(
        headers[to_skip].clone(),
        &preceding.chain_work,
        preceding.height,
    ));
    index.insert(Arc::clone(&prev_entry));
    for header in &headers[to_skip + 1..] {
        prev_entry = Arc::new(IntermediateBlockIndexEntry::new(
            header.clone(),
            &prev_entry.chain_work,
            prev_entry.height,
        ));
        index.insert(Arc::clone(&prev_entry));
    }
    index
}

/// A block position that may be backed by either a connected index entry or
/// a staged header; callers comparing forks dispatch through this.
#[derive(Debug, Clone)]
pub enum BlockIndexRef<'a> {
    Connected(&'a BlockIndexEntry),
    Intermediate(&'a IntermediateBlockIndexEntry),
}

impl BlockIndexRef<'_> {
    pub fn chain_work(&self) -> &BigUint {
        match self {
            BlockIndexRef::Connected(entry) => &entry.chain_work,
            BlockIndexRef::Intermediate(entry) => &entry.chain_work,
        }
    }

    pub fn height(&self) -> i32 {
        match self {
            BlockIndexRef::Connected(entry) => entry.height,
            BlockIndexRef::Intermediate(entry) => entry.height,
        }
    }

    pub fn block_hash(&self) -> Uint256 {
        match self {
            BlockIndexRef::Connected(entry) => entry.hash,
            BlockIndexRef::Intermediate(entry) => entry.block_hash(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_index::ChainIndex;

    fn header_chain(prev: Uint256, count: usize, start_time: u32) -> Vec<BlockHeader> {
        let mut headers = Vec::new();
        let mut prev_hash = prev;
        for i in 0..count {
            let header = BlockHeader {
                version: 1,
                hash_prev_block: prev_hash,
                hash_merkle_root: Uint256::from_le_bytes([i as u8 + 1; 32]),
                time: start_time + i as u32 * 30,
                bits: 0x207f_ffff,
                nonce: 0,
            };
            prev_hash = header.hash();
            headers.push(header);
        }
        headers
    }

    fn connected_genesis() -> (ChainIndex, usize) {
        let mut index = ChainIndex::new();
        let id = index
            .insert(
                Uint256::from_le_bytes([0xfe; 32]),
                None,
                0x207f_ffff,
                1_600_000_000,
                false,
            )
            .unwrap();
        index.connect_tip(id).unwrap();
        (index, id)
    }

    #[test]
    fn test_staging_chains_height_and_work() {
        let (index, genesis) = connected_genesis();
        let preceding = index.entry(genesis);
        let headers = header_chain(preceding.hash, 3, 1_600_000_030);

        let staged = headers_to_intermediate_block_index(0, preceding, &headers);
        assert_eq!(staged.len(), 3);
        for (i, entry) in staged.iter().enumerate() {
            assert_eq!(entry.height, preceding.height + 1 + i as i32);
        }
        let first = staged.get(0).unwrap();
        assert_eq!(
            first.chain_work,
            &preceding.chain_work + neblio_primitives::block_proof(0x207f_ffff)
        );
    }

    #[test]
    fn test_staging_skips_known_prefix() {
        let (index, genesis) = connected_genesis();
        let preceding = index.entry(genesis);

        // Two bogus headers in front that the caller already has; the run we
        // stage starts at to_skip and must extend `preceding`.
        let mut headers = header_chain(Uint256::from_le_bytes([0x11; 32]), 2, 1_599_999_000);
        headers.extend(header_chain(preceding.hash, 2, 1_600_000_030));

        let staged = headers_to_intermediate_block_index(2, preceding, &headers);
        assert_eq!(staged.len(), 2);
        assert_eq!(staged.get(0).unwrap().height, 1);
    }

    #[test]
    fn test_staging_empty_when_all_skipped() {
        let (index, genesis) = connected_genesis();
        let preceding = index.entry(genesis);
        let headers = header_chain(preceding.hash, 2, 1_600_000_030);
        assert!(headers_to_intermediate_block_index(5, preceding, &headers).is_empty());
    }

    #[test]
    fn test_both_indexes_agree() {
        let (index, genesis) = connected_genesis();
        let preceding = index.entry(genesis);
        let headers = header_chain(preceding.hash, 4, 1_600_000_030);
        let staged = headers_to_intermediate_block_index(0, preceding, &headers);

        for entry in staged.iter() {
            let by_height = staged.get_by_height(entry.height).unwrap();
            let by_hash = staged.get_by_hash(&entry.hash).unwrap();
            assert!(Arc::ptr_eq(by_height, by_hash));
        }
    }

    #[test]
    fn test_erase_by_hash_removes_from_both() {
        let (index, genesis) = connected_genesis();
        let preceding = index.entry(genesis);
        let headers = header_chain(preceding.hash, 3, 1_600_000_030);
        let mut staged = headers_to_intermediate_block_index(0, preceding, &headers);

        let victim = staged.get(1).unwrap().clone();
        assert!(staged.erase_by_hash(&victim.hash));
        assert!(staged.get_by_hash(&victim.hash).is_none());
        assert!(staged.get_by_height(victim.height).is_none());
        assert_eq!(staged.len(), 2);
        assert!(!staged.erase_by_hash(&victim.hash));
    }

    #[test]
    fn test_insert_rejects_duplicate_keys() {
        let mut staged = IntermediateBlockIndex::new();
        let header = BlockHeader {
            version: 1,
            hash_prev_block: Uint256::ZERO,
            hash_merkle_root: Uint256::ZERO,
            time: 0,
            bits: 0x207f_ffff,
            nonce: 0,
        };
        let entry = Arc::new(IntermediateBlockIndexEntry::new(
            header,
            &BigUint::default(),
            0,
        ));
        assert!(staged.insert(Arc::clone(&entry)));
        assert!(!staged.insert(entry));
        assert_eq!(staged.len(), 1);
    }

    #[test]
    fn test_variant_accessors_dispatch() {
        let (index, genesis) = connected_genesis();
        let preceding = index.entry(genesis);
        let headers = header_chain(preceding.hash, 1, 1_600_000_030);
        let staged = headers_to_intermediate_block_index(0, preceding, &headers);
        let entry = staged.get(0).unwrap();

        let connected = BlockIndexRef::Connected(preceding);
        let intermediate = BlockIndexRef::Intermediate(entry);
        assert_eq!(connected.height(), 0);
        assert_eq!(intermediate.height(), 1);
        assert_eq!(connected.block_hash(), preceding.hash);
        assert_eq!(intermediate.block_hash(), entry.hash);
        assert!(intermediate.chain_work() > connected.chain_work());
    }
}
