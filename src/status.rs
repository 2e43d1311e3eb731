//! C4: the sweep status structure — an AVL tree ordered by the segment
//! comparator (C3) rather than by its own keys.
//!
//! The keys are synthetic `f64` values chosen only to encode the order the
//! comparator already settled on; they carry no geometric meaning of their
//! own; and their neighbor/comparison operations use *topological*
//! traversal (parent pointers) rather than a value-based search, since the
//! caller typically already holds a handle to the node in question (via
//! `seg_idx`) and wants "the node next to this one," not "the node nearest
//! some arbitrary key."

use std::collections::HashMap;
use std::cmp::Ordering;

use ordered_float::OrderedFloat;

use crate::avl::arena::{Arena, NodeId};
use crate::comparator::compare_segments;
use crate::geometry::Segment;

const VALUE_SPREAD: f64 = 512.0;
const VALUE_MIN: f64 = 1e-8;

struct Entry {
    seg_idx: usize,
    segment: Segment,
}

/// The live sweep status: segments currently crossing the sweep line,
/// ordered top to bottom.
pub struct StatusMap {
    arena: Arena<OrderedFloat<f64>, Entry>,
    index: HashMap<usize, NodeId>,
}

impl Default for StatusMap {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusMap {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, seg_idx: usize) -> bool {
        self.index.contains_key(&seg_idx)
    }

    pub fn segment(&self, seg_idx: usize) -> Option<&Segment> {
        let id = *self.index.get(&seg_idx)?;
        Some(&self.arena.value(id).segment)
    }

    /// Inserts `segment` (tagged with `seg_idx`) at the position the
    /// comparator dictates. Returns `false`, changing nothing, if a
    /// segment the comparator considers equal is already present.
    pub fn insert(&mut self, seg_idx: usize, segment: Segment, tol: f64) -> bool {
        let Some(root) = self.arena.root() else {
            let id = self.arena.insert_root(OrderedFloat(0.0), Entry { seg_idx, segment });
            self.index.insert(seg_idx, id);
            return true;
        };
        let mut cur = root;
        loop {
            match compare_segments(&self.arena.value(cur).segment, &segment, tol) {
                Ordering::Greater => {
                    if let Some(l) = self.arena.left(cur) {
                        cur = l;
                        continue;
                    }
                    let id = self.arena.attach_child(cur, true, OrderedFloat(0.0), Entry { seg_idx, segment });
                    self.finish_insert(id, cur, true);
                    self.index.insert(seg_idx, id);
                    return true;
                }
                Ordering::Less => {
                    if let Some(r) = self.arena.right(cur) {
                        cur = r;
                        continue;
                    }
                    let id = self.arena.attach_child(cur, false, OrderedFloat(0.0), Entry { seg_idx, segment });
                    self.finish_insert(id, cur, false);
                    self.index.insert(seg_idx, id);
                    return true;
                }
                Ordering::Equal => return false,
            }
        }
    }

    /// Assigns the synthetic key for a freshly attached leaf, rebalances
    /// tree shape, and triggers a full key rebalance if the new key landed
    /// too close to its neighbor.
    fn finish_insert(&mut self, id: NodeId, parent: NodeId, is_left: bool) {
        let (up, dn) = if is_left {
            (Some(self.arena.key(parent).0), self.arena.predecessor(id).map(|n| self.arena.key(n).0))
        } else {
            (self.arena.successor(id).map(|n| self.arena.key(n).0), Some(self.arena.key(parent).0))
        };
        let mut needs_rebalance = false;
        let key = match (up, dn) {
            (Some(u), None) => u - VALUE_SPREAD,
            (None, Some(d)) => d + VALUE_SPREAD,
            (Some(u), Some(d)) => {
                if (u - d).abs() < VALUE_MIN {
                    needs_rebalance = true;
                }
                (u + d) / 2.0
            }
            (None, None) => unreachable!("a freshly attached leaf always has its parent as one neighbor"),
        };
        self.arena.set_key(id, OrderedFloat(key));
        self.arena.rebalance_after_insert(parent);
        if needs_rebalance {
            self.rebalance_keys();
        }
    }

    /// Removes the segment tagged `seg_idx`, returning it.
    pub fn delete(&mut self, seg_idx: usize) -> Option<Segment> {
        let id = self.index.remove(&seg_idx)?;
        let (_, entry) = self.arena.remove(id);
        Some(entry.segment)
    }

    /// Exchanges the segment payloads at two currently-tracked indices,
    /// leaving both nodes' tree positions (and synthetic keys) untouched.
    /// Used when two segments' relative order swaps at an intersection, so
    /// the status structure's shape doesn't need to change, only which
    /// index occupies which slot.
    pub fn swap(&mut self, ix_1: usize, ix_2: usize) {
        let id_1 = self.index[&ix_1];
        let id_2 = self.index[&ix_2];
        let seg_1 = self.arena.value(id_1).segment;
        let seg_2 = self.arena.value(id_2).segment;
        self.arena.value_mut(id_1).segment = seg_2;
        self.arena.value_mut(id_1).seg_idx = ix_2;
        self.arena.value_mut(id_2).segment = seg_1;
        self.arena.value_mut(id_2).seg_idx = ix_1;
        self.index.insert(ix_1, id_2);
        self.index.insert(ix_2, id_1);
    }

    /// Among the given (currently tracked) segment indices, the one
    /// highest in status order.
    pub fn highest_of(&self, seg_idxs: &[usize]) -> Option<usize> {
        seg_idxs
            .iter()
            .copied()
            .max_by_key(|&ix| *self.arena.key(self.index[&ix]))
    }

    /// Among the given (currently tracked) segment indices, the one
    /// lowest in status order.
    pub fn lowest_of(&self, seg_idxs: &[usize]) -> Option<usize> {
        seg_idxs
            .iter()
            .copied()
            .min_by_key(|&ix| *self.arena.key(self.index[&ix]))
    }

    /// Sorts `seg_idxs` (all must be currently tracked) into ascending
    /// status order, i.e. bottom-to-top along the sweep line. Used by the
    /// sweep driver to put a set of interior-crossing segments into status
    /// order before pairing them off for the order-reversal at their shared
    /// event, since the set's original iteration order (segment index) has
    /// no relation to where each segment currently sits in the status.
    pub fn sort_by_position(&self, seg_idxs: &mut [usize]) {
        seg_idxs.sort_by_key(|&ix| *self.arena.key(self.index[&ix]));
    }

    /// The segment index immediately below `seg_idx` in status order, via
    /// topological (parent-pointer) traversal.
    pub fn predecessor_of(&self, seg_idx: usize) -> Option<usize> {
        let id = *self.index.get(&seg_idx)?;
        let p = self.arena.predecessor(id)?;
        Some(self.arena.value(p).seg_idx)
    }

    /// The segment index immediately above `seg_idx` in status order, via
    /// topological (parent-pointer) traversal.
    pub fn successor_of(&self, seg_idx: usize) -> Option<usize> {
        let id = *self.index.get(&seg_idx)?;
        let s = self.arena.successor(id)?;
        Some(self.arena.value(s).seg_idx)
    }

    /// Reassigns every node's synthetic key to a fresh, evenly spaced
    /// sequence, without moving any node's tree position. Keeps synthetic
    /// keys from ever drifting close enough together to lose precision.
    fn rebalance_keys(&mut self) {
        let n = self.arena.len();
        if n == 0 {
            return;
        }
        let mut value = -VALUE_SPREAD * (n / 2) as f64;
        let mut cur = self.arena.min();
        while let Some(id) = cur {
            self.arena.set_key(id, OrderedFloat(value));
            value += VALUE_SPREAD;
            cur = self.arena.successor(id);
        }
    }
}
