//! Owning-collection contract.
//!
//! The chain keeps no element counter of its own. Every bounds check and the
//! nearest-end navigation heuristic read the logical size from the owning
//! collection, and every unlinked node is reported back to it, the same way
//! storage is passed into each call as an explicit collaborator elsewhere in
//! this crate's lineage.

/// Contract between a chain and the collection that owns it.
///
/// Mutating chain operations take a `&mut impl Host`; read-only operations
/// take `&impl Host` for the size alone.
pub trait Host {
    /// Current logical element count of the collection.
    fn size(&self) -> usize;

    /// Called exactly once per node the chain unlinks.
    fn node_removed(&mut self);

    /// Called when a drain-style operation aborts early, after the chain
    /// has unlinked every remaining node.
    ///
    /// `remaining` is the number of nodes discarded without being handed to
    /// the sink; together with the per-node [`node_removed`] calls for the
    /// consumed prefix, the collection's size ends at zero.
    ///
    /// [`node_removed`]: Host::node_removed
    fn drain_abandoned(&mut self, remaining: usize) {
        for _ in 0..remaining {
            self.node_removed();
        }
    }
}

/// A bare element counter implementing [`Host`].
///
/// The minimal owning collection: used by [`ChainList`](crate::ChainList)
/// and by tests that need size bookkeeping without a full container.
///
/// # Example
///
/// ```
/// use chain_collections::{Census, Chain, Host};
///
/// let mut chain: Chain<u32> = Chain::new();
/// let mut census = Census::new();
///
/// chain.push_back(1);
/// census.node_added();
/// chain.push_back(2);
/// census.node_added();
///
/// assert_eq!(census.size(), 2);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Census {
    count: usize,
}

impl Census {
    /// Creates a counter at zero.
    #[inline]
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Records one insertion.
    #[inline]
    pub fn node_added(&mut self) {
        self.count += 1;
    }

    /// Current count.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the count is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl Host for Census {
    #[inline]
    fn size(&self) -> usize {
        self.count
    }

    #[inline]
    fn node_removed(&mut self) {
        self.count -= 1;
    }

    #[inline]
    fn drain_abandoned(&mut self, remaining: usize) {
        self.count -= remaining;
    }
}
