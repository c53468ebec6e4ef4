//! Updatable min-priority queue over equation ids.
//!
//! Keys are `(cost, degree, id)` triples compared lexicographically; the id
//! component makes the order total, so a pop never resolves a tie
//! nondeterministically. Overwrites go through a current-key side table:
//! the binary heap keeps the superseded entries and `pop_min` discards any
//! entry whose key disagrees with the side table.

use crate::error::{Result, TearingError};
use crate::graph::NodeId;
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Priority key: `(cost, total degree, equation id)`.
///
/// `cost` is `degree - 1` when the equation still has an allowed match
/// candidate and `degree` otherwise, penalizing equations that cannot be
/// matched.
pub type HeapKey = (usize, usize, NodeId);

#[derive(Debug, Default)]
pub struct EqHeap {
    heap: BinaryHeap<Reverse<HeapKey>>,
    current: FxHashMap<NodeId, HeapKey>,
}

impl EqHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite the key of a live equation. Amortized O(log n).
    pub fn insert_or_update(&mut self, id: NodeId, key: HeapKey) {
        debug_assert_eq!(key.2, id, "id component of the key must match");
        self.current.insert(id, key);
        self.heap.push(Reverse(key));
    }

    /// Remove and return the live entry with the smallest key.
    pub fn pop_min(&mut self) -> Result<(NodeId, HeapKey)> {
        while let Some(Reverse(key)) = self.heap.pop() {
            let id = key.2;
            match self.current.get(&id) {
                Some(&live) if live == key => {
                    self.current.remove(&id);
                    return Ok((id, key));
                }
                // stale entry, superseded by a later overwrite or pop
                _ => {}
            }
        }
        Err(TearingError::EmptyQueue)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }
}
