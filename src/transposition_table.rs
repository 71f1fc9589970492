//! Bucketed transposition table mapping Zobrist keys to search-tree nodes.
//!
//! 1024 buckets selected by the low 10 bits of the key, each an ordered
//! map ([`crate::bst::Bst`]) keyed by the full hash so two positions that
//! collide on their low bits still resolve correctly within a bucket (see
//! DESIGN.md for the sentinel-root simplification this drops).
//!
//! The table stores [`NodeId`]s, not `Node`s: the [`crate::search_tree::NodeArena`]
//! is the sole owner of node storage, and this table is cleared at the
//! start of every root search so it can never hold an index into a wiped
//! arena generation.

use crate::bst::Bst;
use crate::search_tree::NodeId;

const BUCKET_COUNT: usize = 1024;
const BUCKET_MASK: u64 = (BUCKET_COUNT - 1) as u64;

pub struct TranspositionTable {
    buckets: Vec<Bst<u64, NodeId>>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        TranspositionTable { buckets: (0..BUCKET_COUNT).map(|_| Bst::new()).collect() }
    }

    #[inline]
    fn bucket_index(hash: u64) -> usize {
        (hash & BUCKET_MASK) as usize
    }

    pub fn insert(&mut self, hash: u64, id: NodeId) {
        self.buckets[Self::bucket_index(hash)].insert(hash, id);
    }

    /// Alias for [`Self::insert`]. This table always overwrites on a key
    /// collision, since a stale entry at the same key can only be from a
    /// position that is no longer reachable within the current root
    /// search.
    pub fn set(&mut self, hash: u64, id: NodeId) {
        self.insert(hash, id);
    }

    pub fn get(&self, hash: u64) -> Option<NodeId> {
        self.buckets[Self::bucket_index(hash)].get(hash).copied()
    }

    pub fn exists(&self, hash: u64) -> bool {
        self.buckets[Self::bucket_index(hash)].exists(hash)
    }

    pub fn remove(&mut self, hash: u64) -> Option<NodeId> {
        self.buckets[Self::bucket_index(hash)].remove(hash)
    }

    /// Drop every entry. Called at the start of each root search, since
    /// the node arena it points into is wiped at the same time.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}
