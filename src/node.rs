//! Node record for the chain.
//!
//! Nodes live in a slab arena and embed their own prev/next refs, the same
//! index-link layout used for intrusive lists. A ref is a plain `usize` slab
//! key; `NIL` is a reserved value meaning "no successor".

/// Reserved ref meaning "no node".
///
/// Only ever stored in `next` (a live node's `prev` always points at a real
/// node, the sentinel included). Never a valid slab key in practice.
pub(crate) const NIL: usize = usize::MAX;

/// A chain node: payload slot plus predecessor/successor refs.
///
/// The payload slot is `Some` for every live node and `None` exactly for the
/// chain's sentinel.
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) slot: Option<T>,
    pub(crate) prev: usize,
    pub(crate) next: usize,
}

impl<T> Node<T> {
    /// Creates a live node with both links unset.
    #[inline]
    pub(crate) fn live(payload: T) -> Self {
        Self {
            slot: Some(payload),
            prev: NIL,
            next: NIL,
        }
    }

    /// Creates the payload-less sentinel record.
    ///
    /// Links are patched to their self-referential empty-chain state by the
    /// chain constructor once the sentinel's own ref is known.
    #[inline]
    pub(crate) fn sentinel() -> Self {
        Self {
            slot: None,
            prev: NIL,
            next: NIL,
        }
    }
}
