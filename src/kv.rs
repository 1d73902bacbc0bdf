//! Key/value projection layer.
//!
//! [`KvChain`] wraps a [`Chain`] of [`Entry`] nodes and projects the bulk
//! operations onto either the key or the value of each node independently:
//! separate sort orders, separate searches, separate distinct/dedup passes,
//! all over the identical physical nodes. Removing "by key" and removing
//! "by value" unlink the same node type.
//!
//! Sortedness by one axis implies nothing about the other.

use core::cmp::Ordering;
use core::convert::Infallible;

use crate::chain::Chain;
use crate::error::{ChainError, Step};
use crate::host::Host;
use crate::node::NIL;
use crate::range::Range;

/// One key/value node payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry<K, V> {
    /// Key axis.
    pub key: K,
    /// Value axis.
    pub value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates an entry.
    #[inline]
    pub const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

/// A chain of key/value entries with per-axis bulk operations.
///
/// # Example
///
/// ```
/// use chain_collections::{Census, KvChain};
///
/// let mut kv: KvChain<&str, u32> = KvChain::new();
/// let mut census = Census::new();
///
/// kv.push_back("b", 2);
/// census.node_added();
/// kv.push_back("a", 1);
/// census.node_added();
///
/// kv.sort_by_key();
/// assert_eq!(kv.keys_vec(), vec!["a", "b"]);
/// assert_eq!(kv.values_vec(), vec![2, 1]);
/// ```
#[derive(Debug, PartialEq)]
pub struct KvChain<K, V> {
    chain: Chain<Entry<K, V>>,
}

impl<K, V> Default for KvChain<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> KvChain<K, V> {
    /// Creates an empty key/value chain.
    pub fn new() -> Self {
        Self {
            chain: Chain::new(),
        }
    }

    /// Creates an empty key/value chain with arena capacity for `capacity`
    /// entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chain: Chain::with_capacity(capacity),
        }
    }

    /// Returns `true` if the chain holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Appends an entry at the back.
    pub fn push_back(&mut self, key: K, value: V) {
        self.chain.push_back(Entry::new(key, value));
    }

    /// Prepends an entry at the front.
    pub fn push_front(&mut self, key: K, value: V) {
        self.chain.push_front(Entry::new(key, value));
    }

    /// Borrowing iterator over entries, front-to-back.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<K, V>> {
        self.chain.iter()
    }

    /// The underlying chain.
    #[inline]
    pub fn chain(&self) -> &Chain<Entry<K, V>> {
        &self.chain
    }

    /// Mutable access to the underlying chain, for element-axis operations
    /// on whole entries.
    #[inline]
    pub fn chain_mut(&mut self) -> &mut Chain<Entry<K, V>> {
        &mut self.chain
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Index of the first entry whose key equals `key`.
    pub fn position_of_key(&self, key: &K) -> Option<usize>
    where
        K: PartialEq,
    {
        self.chain.position_if(|entry| entry.key == *key)
    }

    /// Index of the first entry whose value equals `value`.
    pub fn position_of_value(&self, value: &V) -> Option<usize>
    where
        V: PartialEq,
    {
        self.chain.position_if(|entry| entry.value == *value)
    }

    /// Ranged key search; the returned index is absolute.
    pub fn position_of_key_in<H: Host>(
        &self,
        host: &H,
        range: Range,
        key: &K,
    ) -> Result<Option<usize>, ChainError>
    where
        K: PartialEq,
    {
        self.chain
            .position_in_if(host, range, |entry| entry.key == *key)
    }

    /// Ranged value search; the returned index is absolute.
    pub fn position_of_value_in<H: Host>(
        &self,
        host: &H,
        range: Range,
        value: &V,
    ) -> Result<Option<usize>, ChainError>
    where
        V: PartialEq,
    {
        self.chain
            .position_in_if(host, range, |entry| entry.value == *value)
    }

    /// Returns `true` if any entry's key equals `key`.
    pub fn contains_key(&self, key: &K) -> bool
    where
        K: PartialEq,
    {
        self.position_of_key(key).is_some()
    }

    /// Returns `true` if any entry's value equals `value`.
    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.position_of_value(value).is_some()
    }

    /// Number of entries whose key equals `key`.
    pub fn count_key(&self, key: &K) -> usize
    where
        K: PartialEq,
    {
        self.chain.count_if(|entry| entry.key == *key)
    }

    /// Number of entries whose value equals `value`.
    pub fn count_value(&self, value: &V) -> usize
    where
        V: PartialEq,
    {
        self.chain.count_if(|entry| entry.value == *value)
    }

    /// Value of the first entry whose key is equivalent to `key` under
    /// `eq`.
    pub fn value_for_key<Q: ?Sized>(
        &self,
        key: &Q,
        mut eq: impl FnMut(&K, &Q) -> bool,
    ) -> Option<&V> {
        self.chain
            .find_if(|entry| eq(&entry.key, key))
            .map(|entry| &entry.value)
    }

    // ========================================================================
    // Copy
    // ========================================================================

    /// Copies every key, front-to-back.
    pub fn keys_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.chain.iter().map(|entry| entry.key.clone()).collect()
    }

    /// Copies every value, front-to-back.
    pub fn values_vec(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.chain.iter().map(|entry| entry.value.clone()).collect()
    }

    /// Copies the keys of the addressed range, in range order.
    pub fn keys_vec_in<H: Host>(&self, host: &H, range: Range) -> Result<Vec<K>, ChainError>
    where
        K: Clone,
    {
        let mut out = Vec::new();
        self.chain.scan_in(host, range, |entry| {
            out.push(entry.key.clone());
            Step::Continue
        })?;
        Ok(out)
    }

    /// Copies the values of the addressed range, in range order.
    pub fn values_vec_in<H: Host>(&self, host: &H, range: Range) -> Result<Vec<V>, ChainError>
    where
        V: Clone,
    {
        let mut out = Vec::new();
        self.chain.scan_in(host, range, |entry| {
            out.push(entry.value.clone());
            Step::Continue
        })?;
        Ok(out)
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Unlinks the first entry whose key equals `key` and returns it.
    pub fn remove_by_key<H: Host>(&mut self, host: &mut H, key: &K) -> Option<Entry<K, V>>
    where
        K: PartialEq,
    {
        self.remove_first_on(host, |entry| entry.key == *key)
    }

    /// Unlinks the first entry whose value equals `value` and returns it.
    pub fn remove_by_value<H: Host>(&mut self, host: &mut H, value: &V) -> Option<Entry<K, V>>
    where
        V: PartialEq,
    {
        self.remove_first_on(host, |entry| entry.value == *value)
    }

    fn remove_first_on<H: Host>(
        &mut self,
        host: &mut H,
        mut pred: impl FnMut(&Entry<K, V>) -> bool,
    ) -> Option<Entry<K, V>> {
        let mut at = self.chain.first();
        while let Some(node) = at {
            if pred(self.chain.get(node)?) {
                return Some(self.chain.unlink(host, node));
            }
            at = self.chain.next(node);
        }
        None
    }

    // ========================================================================
    // Replace / substitute (value axis)
    // ========================================================================

    /// Overwrites every value equal to `old` with a clone of `new`, leaving
    /// keys untouched. Returns the number replaced.
    pub fn replace_values(&mut self, old: &V, new: &V) -> usize
    where
        V: Clone + PartialEq,
    {
        self.substitute_values(|_, value| (value == old).then(|| new.clone()))
    }

    /// Rewrites values in place: `f` sees each `(key, value)` pair and
    /// returns `Some(new)` to substitute the value, `None` to keep it.
    /// Returns the number substituted.
    pub fn substitute_values(&mut self, mut f: impl FnMut(&K, &V) -> Option<V>) -> usize {
        let mut substituted = 0;
        let mut at = self.chain.first();
        while let Some(node) = at {
            let next = self.chain.next(node);
            if let Some(entry) = self.chain.get(node)
                && let Some(new) = f(&entry.key, &entry.value)
                && let Some(entry) = self.chain.get_mut(node)
            {
                entry.value = new;
                substituted += 1;
            }
            at = next;
        }
        substituted
    }

    // ========================================================================
    // Sort (either axis)
    // ========================================================================

    /// Sorts entries ascending by key. Stable on the key axis.
    pub fn sort_by_key(&mut self)
    where
        K: Ord,
    {
        self.chain.sort_by(|a, b| a.key.cmp(&b.key));
    }

    /// Sorts entries ascending by value. Stable on the value axis.
    pub fn sort_by_value(&mut self)
    where
        V: Ord,
    {
        self.chain.sort_by(|a, b| a.value.cmp(&b.value));
    }

    /// Sorts entries by a key comparator.
    pub fn sort_by_key_with(&mut self, mut cmp: impl FnMut(&K, &K) -> Ordering) {
        self.chain.sort_by(|a, b| cmp(&a.key, &b.key));
    }

    /// Sorts entries by a value comparator.
    pub fn sort_by_value_with(&mut self, mut cmp: impl FnMut(&V, &V) -> Ordering) {
        self.chain.sort_by(|a, b| cmp(&a.value, &b.value));
    }

    /// Sorts entries by a fallible key comparator; rolls back on failure.
    pub fn try_sort_by_key_with<E>(
        &mut self,
        mut cmp: impl FnMut(&K, &K) -> Result<Ordering, E>,
    ) -> Result<(), E> {
        self.chain.try_sort_by(|a, b| cmp(&a.key, &b.key))
    }

    /// Sorts entries by a fallible value comparator; rolls back on failure.
    pub fn try_sort_by_value_with<E>(
        &mut self,
        mut cmp: impl FnMut(&V, &V) -> Result<Ordering, E>,
    ) -> Result<(), E> {
        self.chain.try_sort_by(|a, b| cmp(&a.value, &b.value))
    }

    /// Sorts the addressed node set by a key comparator.
    pub fn sort_range_by_key_with<H: Host>(
        &mut self,
        host: &H,
        range: Range,
        mut cmp: impl FnMut(&K, &K) -> Ordering,
    ) -> Result<(), ChainError> {
        self.chain
            .try_sort_range_by(host, range, |a: &Entry<K, V>, b: &Entry<K, V>| {
                Ok::<_, Infallible>(cmp(&a.key, &b.key))
            })
    }

    /// Sorts the addressed node set by a value comparator.
    pub fn sort_range_by_value_with<H: Host>(
        &mut self,
        host: &H,
        range: Range,
        mut cmp: impl FnMut(&V, &V) -> Ordering,
    ) -> Result<(), ChainError> {
        self.chain
            .try_sort_range_by(host, range, |a: &Entry<K, V>, b: &Entry<K, V>| {
                Ok::<_, Infallible>(cmp(&a.value, &b.value))
            })
    }

    /// Ranged fallible key-axis sort; rolls back the span on failure.
    pub fn try_sort_range_by_key_with<H: Host, E>(
        &mut self,
        host: &H,
        range: Range,
        mut cmp: impl FnMut(&K, &K) -> Result<Ordering, E>,
    ) -> Result<(), ChainError<E>> {
        self.chain
            .try_sort_range_by(host, range, |a, b| cmp(&a.key, &b.key))
    }

    /// Ranged fallible value-axis sort; rolls back the span on failure.
    pub fn try_sort_range_by_value_with<H: Host, E>(
        &mut self,
        host: &H,
        range: Range,
        mut cmp: impl FnMut(&V, &V) -> Result<Ordering, E>,
    ) -> Result<(), ChainError<E>> {
        self.chain
            .try_sort_range_by(host, range, |a, b| cmp(&a.value, &b.value))
    }

    // ========================================================================
    // Distinct / dedup (either axis)
    // ========================================================================

    /// Copies out the first occurrence of each key, in forward order. The
    /// chain is not modified.
    pub fn distinct_keys(&self) -> Vec<K>
    where
        K: Clone + PartialEq,
    {
        match (self.chain.first(), self.chain.last()) {
            (Some(low), Some(high)) => {
                self.chain
                    .distinct_core(low, high, |entry| &entry.key, |a, b| a == b)
            }
            _ => Vec::new(),
        }
    }

    /// Copies out the first occurrence of each value, in forward order.
    pub fn distinct_values(&self) -> Vec<V>
    where
        V: Clone + PartialEq,
    {
        match (self.chain.first(), self.chain.last()) {
            (Some(low), Some(high)) => {
                self.chain
                    .distinct_core(low, high, |entry| &entry.value, |a, b| a == b)
            }
            _ => Vec::new(),
        }
    }

    /// Unlinks every entry with an already-seen key, keeping the first of
    /// each. Returns the number removed.
    pub fn dedup_by_key<H: Host>(&mut self, host: &mut H) -> usize
    where
        K: PartialEq,
    {
        self.chain.dedup_by(host, |a, b| a.key == b.key)
    }

    /// Unlinks every entry with an already-seen value, keeping the first of
    /// each. Returns the number removed.
    pub fn dedup_by_value<H: Host>(&mut self, host: &mut H) -> usize
    where
        V: PartialEq,
    {
        self.chain.dedup_by(host, |a, b| a.value == b.value)
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    /// A mutable cursor over values, parked at the first entry (or nowhere
    /// if the chain is empty).
    pub fn value_cursor(&mut self) -> ValueCursor<'_, K, V> {
        let at = self.chain.first().unwrap_or(NIL);
        ValueCursor {
            chain: &mut self.chain,
            at,
        }
    }
}

impl<K, V> Extend<(K, V)> for KvChain<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.push_back(key, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for KvChain<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut kv = Self::new();
        kv.extend(iter);
        kv
    }
}

/// Mutable cursor over the value axis.
///
/// Holds the chain's mutable borrow while alive, so handle invalidation
/// can only come from the cursor's own removals, which it absorbs by
/// advancing past the unlinked node.
pub struct ValueCursor<'a, K, V> {
    chain: &'a mut Chain<Entry<K, V>>,
    at: usize,
}

impl<K, V> ValueCursor<'_, K, V> {
    /// Returns `true` while the cursor is parked on an entry.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.at != NIL
    }

    /// Key of the current entry.
    pub fn key(&self) -> Option<&K> {
        self.chain.get(self.at).map(|entry| &entry.key)
    }

    /// Value of the current entry.
    pub fn value(&self) -> Option<&V> {
        self.chain.get(self.at).map(|entry| &entry.value)
    }

    /// Mutable value of the current entry.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.chain.get_mut(self.at).map(|entry| &mut entry.value)
    }

    /// Steps to the next entry. Returns `false` (and invalidates the
    /// cursor) when stepping off the back.
    pub fn move_next(&mut self) -> bool {
        if self.at == NIL {
            return false;
        }
        self.at = self.chain.next(self.at).unwrap_or(NIL);
        self.at != NIL
    }

    /// Steps to the previous entry. Returns `false` (and invalidates the
    /// cursor) when stepping off the front.
    pub fn move_prev(&mut self) -> bool {
        if self.at == NIL {
            return false;
        }
        self.at = self.chain.prev(self.at).unwrap_or(NIL);
        self.at != NIL
    }

    /// Replaces the current value, returning the old one.
    pub fn replace(&mut self, value: V) -> Option<V> {
        self.value_mut().map(|slot| core::mem::replace(slot, value))
    }

    /// Unlinks the current entry and advances past it. Returns the entry,
    /// or `None` if the cursor is invalid.
    pub fn remove<H: Host>(&mut self, host: &mut H) -> Option<Entry<K, V>> {
        if self.at == NIL {
            return None;
        }
        let next = self.chain.next(self.at).unwrap_or(NIL);
        let entry = self.chain.unlink(host, self.at);
        self.at = next;
        Some(entry)
    }
}
