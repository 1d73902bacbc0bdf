//! Sentinel-anchored chain over a slab arena.
//!
//! The chain owns every node outright. One payload-less sentinel marks the
//! "before-first / after-last" position: its successor is the first live
//! node (or unset when empty) and its predecessor is the last live node (or
//! the sentinel itself when empty). The chain is not circular — forward
//! traversal stops on an unset successor, backward traversal stops on
//! reaching the sentinel — so forward iteration is a pure null check while
//! the sentinel doubles as the unique empty-chain marker.
//!
//! The chain keeps no element counter. Size lives in the owning collection
//! and is passed in through the [`Host`] contract, the same way external
//! storage is passed into every call in slab-backed list designs.
//!
//! # Example
//!
//! ```
//! use chain_collections::{Census, Chain, Host};
//!
//! let mut chain: Chain<u32> = Chain::new();
//! let mut census = Census::new();
//!
//! let a = chain.push_back(1);
//! census.node_added();
//! let b = chain.push_back(2);
//! census.node_added();
//!
//! assert_eq!(chain.get(a), Some(&1));
//!
//! // O(1) removal from anywhere; the host is told once per node.
//! assert_eq!(chain.unlink(&mut census, b), 2);
//! assert_eq!(census.size(), 1);
//! ```

use std::fmt::{self, Debug};

use slab::Slab;

use crate::error::ChainError;
use crate::host::Host;
use crate::node::{NIL, Node};
use crate::range::{Direction, Range, Span};

/// An intrusive doubly-linked sequence over a slab arena.
///
/// Node refs returned by insertion are stable until the node is unlinked,
/// but any structural mutation performed through another path invalidates
/// refs a caller has kept; do not hold a ref across such a call.
pub struct Chain<T> {
    pub(crate) arena: Slab<Node<T>>,
    pub(crate) sentinel: usize,
}

impl<T> Chain<T> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        let mut arena = Slab::new();
        let sentinel = arena.insert(Node::sentinel());
        arena[sentinel].prev = sentinel;
        Self { arena, sentinel }
    }

    /// Creates an empty chain with room for `capacity` live nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut arena = Slab::with_capacity(capacity + 1);
        let sentinel = arena.insert(Node::sentinel());
        arena[sentinel].prev = sentinel;
        Self { arena, sentinel }
    }

    /// Returns `true` if the chain holds no live nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arena[self.sentinel].next == NIL
    }

    /// Ref of the first live node, or `None` if empty.
    #[inline]
    pub fn first(&self) -> Option<usize> {
        let at = self.arena[self.sentinel].next;
        if at == NIL { None } else { Some(at) }
    }

    /// Ref of the last live node, or `None` if empty.
    #[inline]
    pub fn last(&self) -> Option<usize> {
        let at = self.arena[self.sentinel].prev;
        if at == self.sentinel { None } else { Some(at) }
    }

    /// Returns a reference to the payload at `at`, if the ref is live.
    #[inline]
    pub fn get(&self, at: usize) -> Option<&T> {
        self.arena.get(at).and_then(|node| node.slot.as_ref())
    }

    /// Returns a mutable reference to the payload at `at`, if the ref is live.
    #[inline]
    pub fn get_mut(&mut self, at: usize) -> Option<&mut T> {
        self.arena.get_mut(at).and_then(|node| node.slot.as_mut())
    }

    /// Ref of the node after `at`, or `None` if `at` is last.
    #[inline]
    pub fn next(&self, at: usize) -> Option<usize> {
        let n = self.arena.get(at)?.next;
        if n == NIL { None } else { Some(n) }
    }

    /// Ref of the node before `at`, or `None` if `at` is first.
    #[inline]
    pub fn prev(&self, at: usize) -> Option<usize> {
        let p = self.arena.get(at)?.prev;
        if p == self.sentinel { None } else { Some(p) }
    }

    // ========================================================================
    // Splice primitives
    // ========================================================================

    /// Appends a payload, returning the new node's ref.
    ///
    /// The owning collection records the insertion itself; only removals are
    /// notified through [`Host`].
    pub fn push_back(&mut self, payload: T) -> usize {
        let at = self.arena.insert(Node::live(payload));
        self.attach_back(at);
        at
    }

    /// Prepends a payload, returning the new node's ref.
    pub fn push_front(&mut self, payload: T) -> usize {
        let at = self.arena.insert(Node::live(payload));
        self.attach_front(at);
        at
    }

    /// Unlinks one node and returns its payload.
    ///
    /// Notifies the host exactly once.
    ///
    /// # Panics
    ///
    /// Panics if `at` is not a live node ref.
    pub fn unlink<H: Host>(&mut self, host: &mut H, at: usize) -> T {
        assert!(at != self.sentinel, "cannot unlink the sentinel");
        self.detach(at);
        let node = self.arena.remove(at);
        host.node_removed();
        node.slot.expect("live node has a payload")
    }

    /// Moves a node to the front of the chain.
    ///
    /// # Panics
    ///
    /// Panics if `at` is not a live node ref.
    pub fn move_to_front(&mut self, at: usize) {
        if self.arena[at].prev == self.sentinel {
            return;
        }
        self.detach(at);
        self.attach_front(at);
    }

    /// Moves a node to the back of the chain.
    ///
    /// # Panics
    ///
    /// Panics if `at` is not a live node ref.
    pub fn move_to_back(&mut self, at: usize) {
        if self.arena[at].next == NIL {
            return;
        }
        self.detach(at);
        self.attach_back(at);
    }

    /// Unlinks every live node, notifying the host once per node.
    pub fn clear<H: Host>(&mut self, host: &mut H) {
        let mut at = self.arena[self.sentinel].next;
        while at != NIL {
            let next = self.arena[at].next;
            self.arena.remove(at);
            host.node_removed();
            at = next;
        }
        self.arena[self.sentinel].next = NIL;
        self.arena[self.sentinel].prev = self.sentinel;
    }

    /// Relinks the neighbors around `at`, leaving `at`'s own links stale.
    pub(crate) fn detach(&mut self, at: usize) {
        let p = self.arena[at].prev;
        let n = self.arena[at].next;
        self.arena[p].next = n;
        if n != NIL {
            self.arena[n].prev = p;
        } else {
            self.arena[self.sentinel].prev = p;
        }
    }

    /// Splices a detached node in as the new first node.
    pub(crate) fn attach_front(&mut self, at: usize) {
        let first = self.arena[self.sentinel].next;
        self.arena[at].prev = self.sentinel;
        self.arena[at].next = first;
        if first != NIL {
            self.arena[first].prev = at;
        } else {
            self.arena[self.sentinel].prev = at;
        }
        self.arena[self.sentinel].next = at;
    }

    /// Splices a detached node in as the new last node.
    pub(crate) fn attach_back(&mut self, at: usize) {
        let last = self.arena[self.sentinel].prev;
        self.arena[at].prev = last;
        self.arena[at].next = NIL;
        self.arena[last].next = at;
        self.arena[self.sentinel].prev = at;
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Resolves an index to a node ref, walking from the nearest end.
    ///
    /// Walks forward from the sentinel when `index <= size / 2`, otherwise
    /// backward from the sentinel's predecessor; `O(size / 2)` worst case.
    pub(crate) fn node_at(&self, size: usize, index: usize) -> Result<usize, ChainError> {
        if index >= size {
            return Err(ChainError::IndexOutOfRange { index, size });
        }
        if index <= size / 2 {
            let mut at = self.arena[self.sentinel].next;
            for _ in 0..index {
                at = self.arena[at].next;
            }
            Ok(at)
        } else {
            let mut at = self.arena[self.sentinel].prev;
            for _ in 0..(size - 1 - index) {
                at = self.arena[at].prev;
            }
            Ok(at)
        }
    }

    /// Returns a reference to the payload at `index`.
    ///
    /// # Errors
    ///
    /// [`ChainError::IndexOutOfRange`] if `index >= host.size()`.
    pub fn get_at<H: Host>(&self, host: &H, index: usize) -> Result<&T, ChainError> {
        let at = self.node_at(host.size(), index)?;
        Ok(self.payload(at))
    }

    /// Returns a mutable reference to the payload at `index`.
    ///
    /// # Errors
    ///
    /// [`ChainError::IndexOutOfRange`] if `index >= host.size()`.
    pub fn get_at_mut<H: Host>(&mut self, host: &H, index: usize) -> Result<&mut T, ChainError> {
        let at = self.node_at(host.size(), index)?;
        Ok(self.payload_mut(at))
    }

    /// Validates a range address and resolves its first node.
    ///
    /// The three length cases are checked to completion before any node is
    /// touched. A zero-length, zero-offset range resolves to the sentinel
    /// (empty but anchored); other zero-length ranges resolve to the
    /// detached empty span.
    pub(crate) fn resolve(&self, size: usize, range: Range) -> Result<Span, ChainError> {
        let Range { offset, length } = range;
        let out_of_range = ChainError::OutOfRange {
            offset,
            length,
            size,
        };

        if length > 0 {
            let count = length as usize;
            if offset > size || size - offset < count {
                return Err(out_of_range);
            }
            Ok(Span {
                start: self.node_at(size, offset)?,
                count,
                dir: Direction::Forward,
            })
        } else if length < 0 {
            let count = length.unsigned_abs();
            if offset >= size || count > offset + 1 {
                return Err(out_of_range);
            }
            Ok(Span {
                start: self.node_at(size, offset)?,
                count,
                dir: Direction::Backward,
            })
        } else {
            if offset > size {
                return Err(out_of_range);
            }
            if offset == 0 {
                Ok(Span::anchored(self.sentinel))
            } else {
                Ok(Span::EMPTY)
            }
        }
    }

    /// One step along the given direction; `NIL` past either end.
    #[inline]
    pub(crate) fn step(&self, at: usize, dir: Direction) -> usize {
        match dir {
            Direction::Forward => self.arena[at].next,
            Direction::Backward => {
                let p = self.arena[at].prev;
                if p == self.sentinel { NIL } else { p }
            }
        }
    }

    /// Lowest- and highest-index nodes of a non-empty span.
    pub(crate) fn span_ends(&self, span: Span) -> Option<(usize, usize)> {
        if span.count == 0 || span.start == NIL || span.start == self.sentinel {
            return None;
        }
        let mut far = span.start;
        for _ in 1..span.count {
            far = self.step(far, span.dir);
        }
        match span.dir {
            Direction::Forward => Some((span.start, far)),
            Direction::Backward => Some((far, span.start)),
        }
    }

    #[inline]
    pub(crate) fn payload(&self, at: usize) -> &T {
        self.arena[at].slot.as_ref().expect("live node")
    }

    #[inline]
    pub(crate) fn payload_mut(&mut self, at: usize) -> &mut T {
        self.arena[at].slot.as_mut().expect("live node")
    }

    // ========================================================================
    // Swap / reverse / shuffle
    // ========================================================================

    /// Exchanges the positions of two nodes by relinking their boundary
    /// links; payloads do not move. O(1).
    ///
    /// # Panics
    ///
    /// Panics if either ref is not a live node.
    pub fn swap_nodes(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        // Normalize adjacency so `a` is the left neighbor when adjacent.
        let (a, b) = if self.arena[b].next == a {
            (b, a)
        } else {
            (a, b)
        };

        let pa = self.arena[a].prev;
        let na = self.arena[a].next;
        let nb = self.arena[b].next;

        if na == b {
            // pa -> b -> a -> nb
            self.arena[pa].next = b;
            self.arena[b].prev = pa;
            self.arena[b].next = a;
            self.arena[a].prev = b;
            self.arena[a].next = nb;
            if nb != NIL {
                self.arena[nb].prev = a;
            } else {
                self.arena[self.sentinel].prev = a;
            }
        } else {
            let pb = self.arena[b].prev;

            self.arena[pa].next = b;
            self.arena[b].prev = pa;
            self.arena[b].next = na;
            if na != NIL {
                self.arena[na].prev = b;
            } else {
                self.arena[self.sentinel].prev = b;
            }

            self.arena[pb].next = a;
            self.arena[a].prev = pb;
            self.arena[a].next = nb;
            if nb != NIL {
                self.arena[nb].prev = a;
            } else {
                self.arena[self.sentinel].prev = a;
            }
        }
    }

    /// Exchanges the nodes at two indices.
    ///
    /// # Errors
    ///
    /// [`ChainError::IndexOutOfRange`] for either index; checked before any
    /// relinking.
    pub fn swap<H: Host>(&mut self, host: &H, i: usize, j: usize) -> Result<(), ChainError> {
        let size = host.size();
        let a = self.node_at(size, i)?;
        let b = self.node_at(size, j)?;
        self.swap_nodes(a, b);
        Ok(())
    }

    /// Reverses the whole chain in place.
    pub fn reverse<H: Host>(&mut self, host: &H) {
        let size = host.size();
        if size < 2 {
            return;
        }
        let left = self.arena[self.sentinel].next;
        let right = self.arena[self.sentinel].prev;
        self.reverse_span(left, right, size);
    }

    /// Reverses the addressed sub-range in place.
    ///
    /// # Errors
    ///
    /// [`ChainError::OutOfRange`] if the range does not fit `host.size()`.
    pub fn reverse_range<H: Host>(&mut self, host: &H, range: Range) -> Result<(), ChainError> {
        let span = self.resolve(host.size(), range)?;
        if span.count < 2 {
            return Ok(());
        }
        let (low, high) = self.span_ends(span).expect("non-empty span");
        self.reverse_span(low, high, span.count);
        Ok(())
    }

    /// Two cursors walking inward, pairwise-swapping, for half the span.
    fn reverse_span(&mut self, left: usize, right: usize, count: usize) {
        let mut l = left;
        let mut r = right;
        for done in 0..count / 2 {
            self.swap_nodes(l, r);
            if done + 1 < count / 2 {
                // The swap exchanged the two positions; step inward from
                // where each node now sits.
                let next_l = self.arena[r].next;
                let next_r = self.arena[l].prev;
                l = next_l;
                r = next_r;
            }
        }
    }

    /// Shuffle is not available in this variant.
    ///
    /// # Errors
    ///
    /// Always [`ChainError::Unsupported`].
    pub fn shuffle<H: Host>(&mut self, _host: &mut H) -> Result<(), ChainError> {
        Err(ChainError::Unsupported("shuffle"))
    }

    // ========================================================================
    // Read-only cursor
    // ========================================================================

    /// Returns a forward iterator over payload references.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chain: self,
            at: self.arena[self.sentinel].next,
        }
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Debug> Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for Chain<T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for Chain<T> {}

/// Read-only forward cursor over a chain.
pub struct Iter<'a, T> {
    chain: &'a Chain<T>,
    at: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.at == NIL {
            return None;
        }
        let node = &self.chain.arena[self.at];
        self.at = node.next;
        node.slot.as_ref()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Census;

    fn build(values: &[u32]) -> (Chain<u32>, Census) {
        let mut chain = Chain::new();
        let mut census = Census::new();
        for &v in values {
            chain.push_back(v);
            census.node_added();
        }
        (chain, census)
    }

    #[test]
    fn new_is_empty() {
        let chain: Chain<u32> = Chain::new();
        chain.assert_chain(&[]);
        assert!(chain.first().is_none());
        assert!(chain.last().is_none());
    }

    #[test]
    fn push_back_order() {
        let (chain, census) = build(&[1, 2, 3]);
        chain.assert_chain(&[1, 2, 3]);
        assert_eq!(census.size(), 3);
    }

    #[test]
    fn push_front_order() {
        let mut chain = Chain::new();
        chain.push_front(1);
        chain.push_front(2);
        chain.push_front(3);
        chain.assert_chain(&[3, 2, 1]);
    }

    #[test]
    fn unlink_middle_and_ends() {
        let (mut chain, mut census) = build(&[1, 2, 3, 4]);
        let b = chain.first().and_then(|f| chain.next(f)).unwrap();
        assert_eq!(chain.unlink(&mut census, b), 2);
        chain.assert_chain(&[1, 3, 4]);

        let first = chain.first().unwrap();
        assert_eq!(chain.unlink(&mut census, first), 1);
        chain.assert_chain(&[3, 4]);

        let last = chain.last().unwrap();
        assert_eq!(chain.unlink(&mut census, last), 4);
        chain.assert_chain(&[3]);

        let only = chain.first().unwrap();
        assert_eq!(chain.unlink(&mut census, only), 3);
        chain.assert_chain(&[]);
        assert_eq!(census.size(), 0);
    }

    #[test]
    fn move_to_front_and_back() {
        let (mut chain, _census) = build(&[1, 2, 3]);
        let last = chain.last().unwrap();
        chain.move_to_front(last);
        chain.assert_chain(&[3, 1, 2]);

        let first = chain.first().unwrap();
        chain.move_to_back(first);
        chain.assert_chain(&[1, 2, 3]);

        // Already in place: no-ops.
        let first = chain.first().unwrap();
        chain.move_to_front(first);
        let last = chain.last().unwrap();
        chain.move_to_back(last);
        chain.assert_chain(&[1, 2, 3]);
    }

    #[test]
    fn clear_notifies_per_node() {
        let (mut chain, mut census) = build(&[1, 2, 3]);
        chain.clear(&mut census);
        chain.assert_chain(&[]);
        assert_eq!(census.size(), 0);
    }

    #[test]
    fn get_at_nearest_end() {
        let (chain, census) = build(&[10, 20, 30, 40, 50]);
        for (i, v) in [10u32, 20, 30, 40, 50].iter().enumerate() {
            assert_eq!(chain.get_at(&census, i), Ok(v));
        }
        assert_eq!(
            chain.get_at(&census, 5),
            Err(ChainError::IndexOutOfRange { index: 5, size: 5 })
        );
    }

    #[test]
    fn get_at_mut_writes_through() {
        let (mut chain, census) = build(&[1, 2, 3]);
        *chain.get_at_mut(&census, 1).unwrap() = 20;
        chain.assert_chain(&[1, 20, 3]);
    }

    #[test]
    fn resolve_validates_three_cases() {
        let (chain, census) = build(&[1, 2, 3, 4]);
        let size = census.size();

        // Forward: offset + length must fit.
        assert!(chain.resolve(size, Range::new(0, 4)).is_ok());
        assert!(chain.resolve(size, Range::new(2, 2)).is_ok());
        assert!(matches!(
            chain.resolve(size, Range::new(2, 3)),
            Err(ChainError::OutOfRange { .. })
        ));

        // Backward: |length| nodes must exist at or below the offset.
        assert!(chain.resolve(size, Range::new(3, -4)).is_ok());
        assert!(matches!(
            chain.resolve(size, Range::new(2, -4)),
            Err(ChainError::OutOfRange { .. })
        ));
        assert!(matches!(
            chain.resolve(size, Range::new(4, -1)),
            Err(ChainError::OutOfRange { .. })
        ));

        // Zero length: anchored at zero, empty elsewhere, bounded by size.
        let anchored = chain.resolve(size, Range::new(0, 0)).unwrap();
        assert_eq!(anchored.start, chain.sentinel);
        let empty = chain.resolve(size, Range::new(3, 0)).unwrap();
        assert_eq!(empty.start, NIL);
        assert!(matches!(
            chain.resolve(size, Range::new(5, 0)),
            Err(ChainError::OutOfRange { .. })
        ));
    }

    #[test]
    fn swap_non_adjacent() {
        let (mut chain, census) = build(&[1, 2, 3, 4, 5]);
        chain.swap(&census, 0, 4).unwrap();
        chain.assert_chain(&[5, 2, 3, 4, 1]);
    }

    #[test]
    fn swap_adjacent_both_orders() {
        let (mut chain, census) = build(&[1, 2, 3]);
        chain.swap(&census, 0, 1).unwrap();
        chain.assert_chain(&[2, 1, 3]);

        let (mut chain, census) = build(&[1, 2, 3]);
        chain.swap(&census, 2, 1).unwrap();
        chain.assert_chain(&[1, 3, 2]);
    }

    #[test]
    fn swap_involution() {
        let (mut chain, census) = build(&[1, 2, 3, 4]);
        chain.swap(&census, 1, 3).unwrap();
        chain.swap(&census, 1, 3).unwrap();
        chain.assert_chain(&[1, 2, 3, 4]);
        assert_eq!(census.size(), 4);
    }

    #[test]
    fn swap_out_of_range_before_mutation() {
        let (mut chain, census) = build(&[1, 2, 3]);
        assert!(chain.swap(&census, 0, 3).is_err());
        chain.assert_chain(&[1, 2, 3]);
    }

    #[test]
    fn reverse_whole() {
        let (mut chain, census) = build(&[1, 2, 3, 4, 5]);
        chain.reverse(&census);
        chain.assert_chain(&[5, 4, 3, 2, 1]);

        let (mut chain, census) = build(&[1, 2]);
        chain.reverse(&census);
        chain.assert_chain(&[2, 1]);

        let (mut chain, census) = build(&[1]);
        chain.reverse(&census);
        chain.assert_chain(&[1]);
    }

    #[test]
    fn reverse_involution() {
        let (mut chain, census) = build(&[1, 2, 3, 4]);
        chain.reverse(&census);
        chain.reverse(&census);
        chain.assert_chain(&[1, 2, 3, 4]);
    }

    #[test]
    fn reverse_range_forward_and_backward_addressing() {
        let (mut chain, census) = build(&[1, 2, 3, 4, 5]);
        chain.reverse_range(&census, Range::new(1, 3)).unwrap();
        chain.assert_chain(&[1, 4, 3, 2, 5]);

        // The backward address of the same node set reverses it back.
        chain.reverse_range(&census, Range::new(3, -3)).unwrap();
        chain.assert_chain(&[1, 2, 3, 4, 5]);
    }

    #[test]
    fn shuffle_is_unsupported() {
        let (mut chain, mut census) = build(&[1, 2, 3]);
        assert_eq!(
            chain.shuffle(&mut census),
            Err(ChainError::Unsupported("shuffle"))
        );
        chain.assert_chain(&[1, 2, 3]);
    }

    #[test]
    fn iter_forward() {
        let (chain, _census) = build(&[1, 2, 3]);
        let got: Vec<u32> = chain.iter().copied().collect();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn handle_navigation() {
        let (chain, _census) = build(&[1, 2, 3]);
        let a = chain.first().unwrap();
        let b = chain.next(a).unwrap();
        let c = chain.next(b).unwrap();
        assert_eq!(chain.next(c), None);
        assert_eq!(chain.prev(c), Some(b));
        assert_eq!(chain.prev(a), None);
        assert_eq!(chain.get(b), Some(&2));
    }

    #[test]
    fn eq_ignores_arena_layout() {
        let (mut a, mut census) = build(&[9, 1, 2, 3]);
        let first = a.first().unwrap();
        a.unlink(&mut census, first);

        let (b, _b_census) = build(&[1, 2, 3]);
        assert_eq!(a, b);
    }
}
