//! Bidirectional range addressing.
//!
//! A [`Range`] is an `(offset, signed length)` pair: the offset locates a
//! node by its 0-based distance from the start, and the sign of the length
//! selects the traversal direction. One encoding carries both a subsequence
//! and the order it is visited in, which lets every bulk operation run
//! direction-agnostically through a [`Direction`] strategy.

use crate::node::NIL;

/// A range address over a chain.
///
/// - `length >= 0`: the half-open forward range `[offset, offset + length)`.
/// - `length < 0`: `|length|` nodes ending at and including `offset`,
///   visited walking toward lower indices.
/// - `length == 0`: an empty range anchored at `offset`.
///
/// # Example
///
/// ```
/// use chain_collections::Range;
///
/// // Nodes 1, 2, 3 visited front-to-back.
/// let fwd = Range::new(1, 3);
/// // Nodes 3, 2, 1 visited back-to-front: the same node set.
/// let back = Range::new(3, -3);
///
/// assert_eq!(fwd.len(), back.len());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// 0-based distance of the anchor node from the start of the chain.
    pub offset: usize,
    /// Signed node count; the sign selects the traversal direction.
    pub length: isize,
}

impl Range {
    /// Creates a range address.
    #[inline]
    pub const fn new(offset: usize, length: isize) -> Self {
        Self { offset, length }
    }

    /// Number of nodes the range addresses.
    #[inline]
    pub const fn len(&self) -> usize {
        self.length.unsigned_abs()
    }

    /// Returns `true` if the range addresses no nodes.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns `true` if the range is visited toward lower indices.
    #[inline]
    pub const fn is_backward(&self) -> bool {
        self.length < 0
    }
}

/// Single-step traversal strategy.
///
/// Range algorithms are written once against `Direction` and run either
/// way; the chain resolves a step into the node's successor or predecessor
/// ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Step to the successor.
    Forward,
    /// Step to the predecessor.
    Backward,
}

impl Direction {
    /// The opposite strategy.
    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// A resolved range: concrete start node, node count, and direction.
///
/// `start` is `NIL` for a detached empty span, or the sentinel ref for the
/// zero-offset "empty but anchored" case. Both count as nothing-to-iterate;
/// walkers check the count before the first step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) count: usize,
    pub(crate) dir: Direction,
}

impl Span {
    /// The empty span with no anchor node.
    pub(crate) const EMPTY: Self = Self {
        start: NIL,
        count: 0,
        dir: Direction::Forward,
    };

    /// The empty span anchored at a concrete node (the sentinel).
    #[inline]
    pub(crate) const fn anchored(at: usize) -> Self {
        Self {
            start: at,
            count: 0,
            dir: Direction::Forward,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_range() {
        let r = Range::new(2, 3);
        assert_eq!(r.len(), 3);
        assert!(!r.is_backward());
        assert!(!r.is_empty());
    }

    #[test]
    fn backward_range() {
        let r = Range::new(4, -3);
        assert_eq!(r.len(), 3);
        assert!(r.is_backward());
    }

    #[test]
    fn empty_range() {
        let r = Range::new(0, 0);
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert!(!r.is_backward());
    }

    #[test]
    fn direction_reversed() {
        assert_eq!(Direction::Forward.reversed(), Direction::Backward);
        assert_eq!(Direction::Backward.reversed(), Direction::Forward);
    }
}
