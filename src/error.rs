//! Error and control-flow types for chain operations.
//!
//! Bounds violations and not-yet-implemented operations surface as distinct
//! [`ChainError`] variants so an owning collection can decide to retry,
//! translate, or propagate. Early termination of a scan is *not* an error;
//! callbacks report it through [`Step`].

use core::convert::Infallible;
use core::fmt;

/// Verdict returned by scanning callbacks after each node.
///
/// `Stop` ends the walk early and is distinguishable from "no match found";
/// it never surfaces as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep walking.
    Continue,
    /// End the walk now.
    Stop,
}

impl Step {
    /// Returns `true` for [`Step::Stop`].
    #[inline]
    pub const fn is_stop(self) -> bool {
        matches!(self, Step::Stop)
    }
}

/// Error type for chain operations.
///
/// `E` is the error type of a caller-supplied fallible callback; operations
/// taking only infallible callbacks use the default [`Infallible`], which
/// makes the `Callback` variant unconstructible for them.
///
/// Bounds violations are detected and reported before any node is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError<E = Infallible> {
    /// A `(offset, length)` range address does not fit the current size.
    OutOfRange {
        /// Attempted offset.
        offset: usize,
        /// Attempted signed length.
        length: isize,
        /// Chain size at the time of the call.
        size: usize,
    },
    /// A single index is outside `0..size`.
    IndexOutOfRange {
        /// Attempted index.
        index: usize,
        /// Chain size at the time of the call.
        size: usize,
    },
    /// The operation is deliberately not available in this variant.
    Unsupported(&'static str),
    /// A caller-supplied comparison/predicate/callback failed.
    ///
    /// Sort rolls the chain back to a consistent state before returning
    /// this; every other operation propagates it immediately.
    Callback(E),
}

impl<E: fmt::Display> fmt::Display for ChainError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::OutOfRange {
                offset,
                length,
                size,
            } => write!(
                f,
                "range (offset {offset}, length {length}) out of range for size {size}"
            ),
            ChainError::IndexOutOfRange { index, size } => {
                write!(f, "index {index} out of range for size {size}")
            }
            ChainError::Unsupported(op) => write!(f, "operation not available: {op}"),
            ChainError::Callback(e) => write!(f, "callback failed: {e}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ChainError<E> {}

impl ChainError<Infallible> {
    /// Widens an infallible-callback error into any callback error type.
    pub(crate) fn widen<E>(self) -> ChainError<E> {
        match self {
            ChainError::OutOfRange {
                offset,
                length,
                size,
            } => ChainError::OutOfRange {
                offset,
                length,
                size,
            },
            ChainError::IndexOutOfRange { index, size } => {
                ChainError::IndexOutOfRange { index, size }
            }
            ChainError::Unsupported(op) => ChainError::Unsupported(op),
            ChainError::Callback(e) => match e {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let e: ChainError = ChainError::OutOfRange {
            offset: 2,
            length: -4,
            size: 3,
        };
        assert_eq!(
            e.to_string(),
            "range (offset 2, length -4) out of range for size 3"
        );

        let e: ChainError = ChainError::IndexOutOfRange { index: 7, size: 3 };
        assert_eq!(e.to_string(), "index 7 out of range for size 3");

        let e: ChainError = ChainError::Unsupported("shuffle");
        assert_eq!(e.to_string(), "operation not available: shuffle");
    }

    #[test]
    fn kinds_are_distinguishable() {
        let range: ChainError = ChainError::OutOfRange {
            offset: 0,
            length: 1,
            size: 0,
        };
        let unsupported: ChainError = ChainError::Unsupported("shuffle");
        assert_ne!(range, unsupported);
        assert!(matches!(unsupported, ChainError::Unsupported(_)));
    }

    #[test]
    fn step_verdict() {
        assert!(Step::Stop.is_stop());
        assert!(!Step::Continue.is_stop());
    }
}
