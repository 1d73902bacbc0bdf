//! Arena-backed doubly-linked sequence engine with range-addressed bulk
//! operations.
//!
//! This crate provides the storage engine behind list- and ordered-map-like
//! containers: insertion-order-preserving, O(1)-splice node storage with a
//! rich bulk-operation surface. The key split: the chain owns structure, the
//! owning collection owns bookkeeping.
//!
//! # Design
//!
//! ```text
//! Chain<T>      - slab arena of linked nodes + one sentinel; navigation,
//!                 range addressing, sort, bulk query/copy/removal
//! Host          - the owning collection: supplies the size, receives one
//!                 notification per unlinked node
//! KvChain<K, V> - key/value projection over the same physical nodes
//! ChainList<T>  - Chain + Census bundled, when no larger owner exists
//! ```
//!
//! The chain keeps no element counter. Every bounds check and the
//! nearest-end navigation heuristic read the logical size from the [`Host`]
//! passed into the call, and every unlinked node is reported back through
//! it, so the owner's count never drifts from the structure.
//!
//! Properties the engine maintains:
//! - **Stable refs**: node refs survive unrelated splices; only removal of
//!   the node itself invalidates its ref.
//! - **Bidirectional addressing**: every bulk operation takes an
//!   `(offset, signed length)` [`Range`]; the sign selects the traversal
//!   direction over the same node set.
//! - **Failure safety**: a failing sort comparator rolls the chain back to
//!   a consistent pre-sort state before the error propagates.
//!
//! # Quick Start
//!
//! ```
//! use chain_collections::{Census, Chain, Range};
//!
//! let mut chain: Chain<u64> = Chain::new();
//! let mut census = Census::new();
//!
//! for v in [5, 3, 1, 4, 2] {
//!     chain.push_back(v);
//!     census.node_added();
//! }
//!
//! chain.sort();
//! assert_eq!(chain.to_vec(), vec![1, 2, 3, 4, 5]);
//!
//! // Backward range: 3 nodes ending at index 3, visited back-to-front.
//! let tail_first = chain.copy_range(&census, Range::new(3, -3)).unwrap();
//! assert_eq!(tail_first, vec![4, 3, 2]);
//!
//! // Removal reports back to the owner.
//! let removed = chain.remove_range(&mut census, Range::new(0, 2)).unwrap();
//! assert_eq!(removed, 2);
//! assert_eq!(census.len(), 3);
//! ```
//!
//! # Key/value projection
//!
//! [`KvChain`] runs the same engine over `Entry { key, value }` payloads
//! and projects every bulk operation onto either axis: sort by key, then
//! search by value, over the identical nodes.
//!
//! # Critical Invariant: One Host Per Chain
//!
//! All operations on a chain must use the host that actually owns it.
//! This is the caller's responsibility. Passing a host whose size does not
//! match the chain's true node count makes bounds checks and navigation
//! meaningless.

#![warn(missing_docs)]

pub mod chain;
pub mod error;
pub mod host;
pub mod kv;
pub mod owned;
pub mod range;

mod bulk;
mod node;
mod sort;

pub use chain::{Chain, Iter};
pub use error::{ChainError, Step};
pub use host::{Census, Host};
pub use kv::{Entry, KvChain, ValueCursor};
pub use owned::ChainList;
pub use range::{Direction, Range};
