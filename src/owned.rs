//! ChainList - a chain bundled with its own census.
//!
//! The engine itself keeps no element counter; every operation reads the
//! size from a [`Host`]. `ChainList` is the convenience pairing of a
//! [`Chain`] with a [`Census`] for callers that don't embed the chain in a
//! larger collection. It merely delegates; all semantics live in the
//! engine.

use core::cmp::Ordering;

use crate::chain::{Chain, Iter};
use crate::error::{ChainError, Step};
use crate::host::{Census, Host};
use crate::range::Range;

/// A doubly-linked sequence that owns its size bookkeeping.
///
/// # Example
///
/// ```
/// use chain_collections::ChainList;
///
/// let mut list: ChainList<u32> = ChainList::new();
/// list.push_back(3);
/// list.push_back(1);
/// list.push_back(2);
///
/// list.sort();
/// assert_eq!(list.len(), 3);
/// assert_eq!(list.pop_front(), Some(1));
/// ```
#[derive(Debug)]
pub struct ChainList<T> {
    chain: Chain<T>,
    census: Census,
}

impl<T> Default for ChainList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ChainList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            chain: Chain::new(),
            census: Census::new(),
        }
    }

    /// Creates an empty list with arena capacity for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chain: Chain::with_capacity(capacity),
            census: Census::new(),
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.census.len()
    }

    /// Returns `true` if the list is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.census.is_empty()
    }

    /// The underlying chain, for operations this façade doesn't forward.
    #[inline]
    pub fn chain(&self) -> &Chain<T> {
        &self.chain
    }

    /// The census standing in as the chain's [`Host`].
    #[inline]
    pub fn census(&self) -> &Census {
        &self.census
    }

    /// Appends an element at the back.
    pub fn push_back(&mut self, value: T) {
        self.chain.push_back(value);
        self.census.node_added();
    }

    /// Prepends an element at the front.
    pub fn push_front(&mut self, value: T) {
        self.chain.push_front(value);
        self.census.node_added();
    }

    /// Removes and returns the first element.
    pub fn pop_front(&mut self) -> Option<T> {
        let at = self.chain.first()?;
        Some(self.chain.unlink(&mut self.census, at))
    }

    /// Removes and returns the last element.
    pub fn pop_back(&mut self) -> Option<T> {
        let at = self.chain.last()?;
        Some(self.chain.unlink(&mut self.census, at))
    }

    /// Reference to the first element.
    pub fn front(&self) -> Option<&T> {
        self.chain.first().and_then(|at| self.chain.get(at))
    }

    /// Reference to the last element.
    pub fn back(&self) -> Option<&T> {
        self.chain.last().and_then(|at| self.chain.get(at))
    }

    /// Reference to the element at `index`, located from the nearest end.
    pub fn get(&self, index: usize) -> Result<&T, ChainError> {
        self.chain.get_at(&self.census, index)
    }

    /// Mutable reference to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, ChainError> {
        self.chain.get_at_mut(&self.census, index)
    }

    /// Borrowing iterator, front-to-back.
    pub fn iter(&self) -> Iter<'_, T> {
        self.chain.iter()
    }

    /// Sorts ascending.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.chain.sort();
    }

    /// Sorts by a comparator.
    pub fn sort_by(&mut self, cmp: impl FnMut(&T, &T) -> Ordering) {
        self.chain.sort_by(cmp);
    }

    /// Reverses the list in place.
    pub fn reverse(&mut self) {
        self.chain.reverse(&self.census);
    }

    /// Swaps the elements at two indices.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<(), ChainError> {
        self.chain.swap(&self.census, i, j)
    }

    /// Removes the element at `index` and returns it.
    pub fn remove_at(&mut self, index: usize) -> Result<T, ChainError> {
        let at = self.chain.node_at(self.census.size(), index)?;
        Ok(self.chain.unlink(&mut self.census, at))
    }

    /// Removes later duplicates, keeping the first of each. Returns the
    /// number removed.
    pub fn dedup(&mut self) -> usize
    where
        T: PartialEq,
    {
        self.chain.dedup(&mut self.census)
    }

    /// Unlinks the addressed range. Returns the number removed.
    pub fn remove_range(&mut self, range: Range) -> Result<usize, ChainError> {
        self.chain.remove_range(&mut self.census, range)
    }

    /// Drains every element into `sink`; an early `Stop` abandons (and
    /// removes) the remainder.
    pub fn drain_into(&mut self, sink: impl FnMut(T) -> Step) -> usize {
        self.chain.drain_into(&mut self.census, sink)
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.chain.clear(&mut self.census);
    }
}

impl<T> Extend<T> for ChainList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for ChainList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T: PartialEq> PartialEq for ChainList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.chain == other.chain
    }
}

impl<T: Eq> Eq for ChainList<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_both_ends() {
        let mut list = ChainList::new();
        list.push_back(2);
        list.push_back(3);
        list.push_front(1);
        assert_eq!(list.len(), 3);
        assert_eq!(list.front(), Some(&1));
        assert_eq!(list.back(), Some(&3));

        assert_eq!(list.pop_front(), Some(1));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), Some(2));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn census_tracks_every_path() {
        let mut list: ChainList<i32> = (0..10).collect();
        assert_eq!(list.len(), 10);

        list.remove_at(4).unwrap();
        assert_eq!(list.len(), 9);

        list.remove_range(Range::new(0, 3)).unwrap();
        assert_eq!(list.len(), 6);

        list.dedup();
        assert_eq!(list.len(), 6);

        let consumed = list.drain_into(|v| if v >= 7 { Step::Stop } else { Step::Continue });
        assert!(consumed >= 1);
        // Abandoned remainder is removed too.
        assert_eq!(list.len(), 0);
        assert!(list.chain().is_empty());
    }

    #[test]
    fn indexed_access() {
        let mut list: ChainList<i32> = (0..5).collect();
        assert_eq!(list.get(3), Ok(&3));
        *list.get_mut(3).unwrap() = 30;
        assert_eq!(list.get(3), Ok(&30));
        assert_eq!(
            list.get(9),
            Err(ChainError::IndexOutOfRange { index: 9, size: 5 })
        );
    }

    #[test]
    fn sort_reverse_swap() {
        let mut list: ChainList<i32> = [3, 1, 2].into_iter().collect();
        list.sort();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);

        list.reverse();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);

        list.swap(0, 2).unwrap();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn equality_and_clear() {
        let a: ChainList<i32> = [1, 2].into_iter().collect();
        let b: ChainList<i32> = [1, 2].into_iter().collect();
        let c: ChainList<i32> = [2, 1].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut d = a;
        d.clear();
        assert!(d.is_empty());
        assert_eq!(d.len(), 0);
    }
}
