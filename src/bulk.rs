//! Bulk operations over the chain.
//!
//! Every operation here shares one shape: resolve a start node from the
//! range address, walk node-to-node through the direction strategy, and
//! apply a per-node function. Three calling conventions recur throughout,
//! mirrored from the engine's lineage:
//!
//! - plain variants compare payloads with `PartialEq`;
//! - `_eq` / `_by` variants take an explicit equivalence function;
//! - `_if` variants take a boolean predicate.
//!
//! Scanning callbacks answer [`Step`] after every node; `Stop` ends the
//! walk and is never treated as a failure. Fallible callbacks propagate
//! their error immediately — sort (see `sort.rs`) is the only algorithm
//! with a rollback, because it is the only one whose intermediate state is
//! not itself a valid chain.

use core::convert::Infallible;

use crate::chain::Chain;
use crate::error::{ChainError, Step};
use crate::host::Host;
use crate::node::NIL;
use crate::range::{Direction, Range, Span};

/// Iterator over the node refs of a resolved span, in range order.
pub(crate) struct SpanIter<'a, T> {
    chain: &'a Chain<T>,
    at: usize,
    left: usize,
    dir: Direction,
}

impl<T> Iterator for SpanIter<'_, T> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.left == 0 || self.at == NIL || self.at == self.chain.sentinel {
            return None;
        }
        let cur = self.at;
        self.left -= 1;
        if self.left > 0 {
            self.at = self.chain.step(cur, self.dir);
        }
        Some(cur)
    }
}

impl<T> Chain<T> {
    pub(crate) fn span_iter(&self, span: Span) -> SpanIter<'_, T> {
        SpanIter {
            chain: self,
            at: span.start,
            left: span.count,
            dir: span.dir,
        }
    }

    // ========================================================================
    // Scanning
    // ========================================================================

    /// Visits every payload front-to-back.
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        for payload in self.iter() {
            f(payload);
        }
    }

    /// Visits the addressed range in range order.
    ///
    /// # Errors
    ///
    /// [`ChainError::OutOfRange`] if the range does not fit `host.size()`.
    pub fn for_each_in<H: Host>(
        &self,
        host: &H,
        range: Range,
        mut f: impl FnMut(&T),
    ) -> Result<(), ChainError> {
        self.scan_in(host, range, |payload| {
            f(payload);
            Step::Continue
        })?;
        Ok(())
    }

    /// Visits payloads front-to-back until the callback answers `Stop`.
    ///
    /// Returns `Step::Stop` if the callback ended the walk, `Step::Continue`
    /// if the walk ran off the end.
    pub fn scan(&self, mut f: impl FnMut(&T) -> Step) -> Step {
        match self.try_scan(|payload| Ok::<_, Infallible>(f(payload))) {
            Ok(step) => step,
            Err(e) => match e {},
        }
    }

    /// Fallible [`scan`](Chain::scan); a callback error propagates
    /// immediately, with no rollback.
    pub fn try_scan<E>(&self, mut f: impl FnMut(&T) -> Result<Step, E>) -> Result<Step, E> {
        let mut at = self.arena[self.sentinel].next;
        while at != NIL {
            if f(self.payload(at))?.is_stop() {
                return Ok(Step::Stop);
            }
            at = self.arena[at].next;
        }
        Ok(Step::Continue)
    }

    /// Visits the addressed range in range order until the callback answers
    /// `Stop`.
    ///
    /// # Errors
    ///
    /// [`ChainError::OutOfRange`] if the range does not fit `host.size()`.
    pub fn scan_in<H: Host>(
        &self,
        host: &H,
        range: Range,
        mut f: impl FnMut(&T) -> Step,
    ) -> Result<Step, ChainError> {
        self.try_scan_in(host, range, |payload| Ok::<_, Infallible>(f(payload)))
    }

    /// Fallible ranged scan; a callback error propagates immediately.
    pub fn try_scan_in<H: Host, E>(
        &self,
        host: &H,
        range: Range,
        mut f: impl FnMut(&T) -> Result<Step, E>,
    ) -> Result<Step, ChainError<E>> {
        let span = self.resolve(host.size(), range).map_err(ChainError::widen)?;
        for at in self.span_iter(span) {
            if f(self.payload(at)).map_err(ChainError::Callback)?.is_stop() {
                return Ok(Step::Stop);
            }
        }
        Ok(Step::Continue)
    }

    // ========================================================================
    // Copy
    // ========================================================================

    /// Copies every payload into a `Vec`, front-to-back.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Copies the addressed range into a `Vec`, in range order.
    ///
    /// # Errors
    ///
    /// [`ChainError::OutOfRange`] if the range does not fit `host.size()`.
    pub fn copy_range<H: Host>(&self, host: &H, range: Range) -> Result<Vec<T>, ChainError>
    where
        T: Clone,
    {
        let span = self.resolve(host.size(), range)?;
        Ok(self
            .span_iter(span)
            .map(|at| self.payload(at).clone())
            .collect())
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Index of the first payload equal to `value`.
    pub fn position(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.position_if(|payload| payload == value)
    }

    /// Index of the first payload equivalent to `value` under `eq`.
    pub fn position_eq(&self, value: &T, mut eq: impl FnMut(&T, &T) -> bool) -> Option<usize> {
        self.position_if(|payload| eq(payload, value))
    }

    /// Index of the first payload satisfying `pred`.
    pub fn position_if(&self, mut pred: impl FnMut(&T) -> bool) -> Option<usize> {
        self.iter().position(|payload| pred(payload))
    }

    /// Absolute index of the first in-range payload equal to `value`,
    /// searching in range order.
    pub fn position_in<H: Host>(
        &self,
        host: &H,
        range: Range,
        value: &T,
    ) -> Result<Option<usize>, ChainError>
    where
        T: PartialEq,
    {
        self.position_in_if(host, range, |payload| payload == value)
    }

    /// Ranged search under an explicit equivalence function.
    pub fn position_in_eq<H: Host>(
        &self,
        host: &H,
        range: Range,
        value: &T,
        mut eq: impl FnMut(&T, &T) -> bool,
    ) -> Result<Option<usize>, ChainError> {
        self.position_in_if(host, range, |payload| eq(payload, value))
    }

    /// Ranged search under a predicate; the returned index is absolute.
    pub fn position_in_if<H: Host>(
        &self,
        host: &H,
        range: Range,
        mut pred: impl FnMut(&T) -> bool,
    ) -> Result<Option<usize>, ChainError> {
        let span = self.resolve(host.size(), range)?;
        for (k, at) in self.span_iter(span).enumerate() {
            if pred(self.payload(at)) {
                let index = match span.dir {
                    Direction::Forward => range.offset + k,
                    Direction::Backward => range.offset - k,
                };
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Reference to the first payload equal to `value`.
    pub fn find(&self, value: &T) -> Option<&T>
    where
        T: PartialEq,
    {
        self.find_if(|payload| payload == value)
    }

    /// Reference to the first payload equivalent to `value` under `eq`.
    pub fn find_eq(&self, value: &T, mut eq: impl FnMut(&T, &T) -> bool) -> Option<&T> {
        self.find_if(|payload| eq(payload, value))
    }

    /// Reference to the first payload satisfying `pred`.
    pub fn find_if(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.iter().find(|payload| pred(payload))
    }

    /// Reference to the first in-range payload equal to `value`, in range
    /// order.
    pub fn find_in<H: Host>(
        &self,
        host: &H,
        range: Range,
        value: &T,
    ) -> Result<Option<&T>, ChainError>
    where
        T: PartialEq,
    {
        self.find_in_if(host, range, |payload| payload == value)
    }

    /// Ranged search under an explicit equivalence function, returning a
    /// reference.
    pub fn find_in_eq<H: Host>(
        &self,
        host: &H,
        range: Range,
        value: &T,
        mut eq: impl FnMut(&T, &T) -> bool,
    ) -> Result<Option<&T>, ChainError> {
        self.find_in_if(host, range, |payload| eq(payload, value))
    }

    /// Reference to the first in-range payload satisfying `pred`, in range
    /// order.
    pub fn find_in_if<H: Host>(
        &self,
        host: &H,
        range: Range,
        mut pred: impl FnMut(&T) -> bool,
    ) -> Result<Option<&T>, ChainError> {
        let span = self.resolve(host.size(), range)?;
        for at in self.span_iter(span) {
            if pred(self.payload(at)) {
                return Ok(Some(self.payload(at)));
            }
        }
        Ok(None)
    }

    // ========================================================================
    // Count / contains
    // ========================================================================

    /// Number of payloads equal to `value`.
    pub fn count(&self, value: &T) -> usize
    where
        T: PartialEq,
    {
        self.count_if(|payload| payload == value)
    }

    /// Number of payloads satisfying `pred`.
    pub fn count_if(&self, mut pred: impl FnMut(&T) -> bool) -> usize {
        self.iter().filter(|payload| pred(payload)).count()
    }

    /// Number of in-range payloads equal to `value`.
    pub fn count_in<H: Host>(&self, host: &H, range: Range, value: &T) -> Result<usize, ChainError>
    where
        T: PartialEq,
    {
        self.count_in_if(host, range, |payload| payload == value)
    }

    /// Number of in-range payloads satisfying `pred`.
    pub fn count_in_if<H: Host>(
        &self,
        host: &H,
        range: Range,
        mut pred: impl FnMut(&T) -> bool,
    ) -> Result<usize, ChainError> {
        let span = self.resolve(host.size(), range)?;
        Ok(self
            .span_iter(span)
            .filter(|&at| pred(self.payload(at)))
            .count())
    }

    /// Returns `true` if any payload equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.position(value).is_some()
    }

    /// Returns `true` if any in-range payload equals `value`.
    pub fn contains_in<H: Host>(&self, host: &H, range: Range, value: &T) -> Result<bool, ChainError>
    where
        T: PartialEq,
    {
        Ok(self.position_in(host, range, value)?.is_some())
    }

    // ========================================================================
    // Set algebra
    // ========================================================================

    /// Returns `true` if every element of `others` occurs in the chain.
    pub fn contains_all_of(&self, others: &[T]) -> bool
    where
        T: PartialEq,
    {
        others.iter().all(|value| self.contains(value))
    }

    /// Unlinks every payload that occurs in `others` (set difference, in
    /// place). Returns the number removed.
    pub fn remove_all_of<H: Host>(&mut self, host: &mut H, others: &[T]) -> usize
    where
        T: PartialEq,
    {
        self.remove_if(host, |payload| others.contains(payload))
    }

    /// Ranged [`remove_all_of`](Chain::remove_all_of).
    pub fn remove_all_of_in<H: Host>(
        &mut self,
        host: &mut H,
        range: Range,
        others: &[T],
    ) -> Result<usize, ChainError>
    where
        T: PartialEq,
    {
        let span = self.resolve(host.size(), range)?;
        let mut removed = 0;
        let mut at = span.start;
        for _ in 0..span.count {
            let next = self.step(at, span.dir);
            if others.contains(self.payload(at)) {
                self.unlink(host, at);
                removed += 1;
            }
            if next == NIL {
                break;
            }
            at = next;
        }
        Ok(removed)
    }

    /// Unlinks every payload that does *not* occur in `others` (set
    /// intersection, in place). Returns the number removed.
    pub fn retain_all_of<H: Host>(&mut self, host: &mut H, others: &[T]) -> usize
    where
        T: PartialEq,
    {
        self.remove_if(host, |payload| !others.contains(payload))
    }

    /// Ranged [`retain_all_of`](Chain::retain_all_of): nodes outside the
    /// range are untouched.
    pub fn retain_all_of_in<H: Host>(
        &mut self,
        host: &mut H,
        range: Range,
        others: &[T],
    ) -> Result<usize, ChainError>
    where
        T: PartialEq,
    {
        let span = self.resolve(host.size(), range)?;
        let mut removed = 0;
        let mut at = span.start;
        for _ in 0..span.count {
            let next = self.step(at, span.dir);
            if !others.contains(self.payload(at)) {
                self.unlink(host, at);
                removed += 1;
            }
            if next == NIL {
                break;
            }
            at = next;
        }
        Ok(removed)
    }

    // ========================================================================
    // Replace / substitute
    // ========================================================================

    /// Overwrites every payload equal to `old` with a clone of `new`.
    /// Returns the number replaced.
    pub fn replace_all(&mut self, old: &T, new: &T) -> usize
    where
        T: Clone + PartialEq,
    {
        let mut replaced = 0;
        let mut at = self.arena[self.sentinel].next;
        while at != NIL {
            if self.payload(at) == old {
                *self.payload_mut(at) = new.clone();
                replaced += 1;
            }
            at = self.arena[at].next;
        }
        replaced
    }

    /// Ranged [`replace_all`](Chain::replace_all).
    pub fn replace_all_in<H: Host>(
        &mut self,
        host: &H,
        range: Range,
        old: &T,
        new: &T,
    ) -> Result<usize, ChainError>
    where
        T: Clone + PartialEq,
    {
        self.substitute_in(host, range, |payload| {
            (payload == old).then(|| new.clone())
        })
    }

    /// Rewrites payloads in place: `f` returns `Some(new)` to substitute,
    /// `None` to leave the node unchanged. Returns the number substituted.
    pub fn substitute(&mut self, mut f: impl FnMut(&T) -> Option<T>) -> usize {
        let mut substituted = 0;
        let mut at = self.arena[self.sentinel].next;
        while at != NIL {
            if let Some(new) = f(self.payload(at)) {
                *self.payload_mut(at) = new;
                substituted += 1;
            }
            at = self.arena[at].next;
        }
        substituted
    }

    /// Ranged [`substitute`](Chain::substitute), applied in range order.
    pub fn substitute_in<H: Host>(
        &mut self,
        host: &H,
        range: Range,
        mut f: impl FnMut(&T) -> Option<T>,
    ) -> Result<usize, ChainError> {
        let span = self.resolve(host.size(), range)?;
        let mut substituted = 0;
        let mut at = span.start;
        for k in 0..span.count {
            if let Some(new) = f(self.payload(at)) {
                *self.payload_mut(at) = new;
                substituted += 1;
            }
            if k + 1 < span.count {
                at = self.step(at, span.dir);
            }
        }
        Ok(substituted)
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Unlinks the first payload equal to `value` and returns it.
    pub fn remove_first<H: Host>(&mut self, host: &mut H, value: &T) -> Option<T>
    where
        T: PartialEq,
    {
        let mut at = self.arena[self.sentinel].next;
        while at != NIL {
            if self.payload(at) == value {
                return Some(self.unlink(host, at));
            }
            at = self.arena[at].next;
        }
        None
    }

    /// Unlinks every payload satisfying `pred`. Returns the number removed.
    pub fn remove_if<H: Host>(&mut self, host: &mut H, mut pred: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        let mut at = self.arena[self.sentinel].next;
        while at != NIL {
            let next = self.arena[at].next;
            if pred(self.payload(at)) {
                self.unlink(host, at);
                removed += 1;
            }
            at = next;
        }
        removed
    }

    /// Unlinks the addressed range. Returns the number removed.
    ///
    /// # Errors
    ///
    /// [`ChainError::OutOfRange`] if the range does not fit `host.size()`;
    /// validation completes before any node is unlinked.
    pub fn remove_range<H: Host>(&mut self, host: &mut H, range: Range) -> Result<usize, ChainError> {
        let span = self.resolve(host.size(), range)?;
        let mut removed = 0;
        let mut at = span.start;
        for _ in 0..span.count {
            let next = self.step(at, span.dir);
            self.unlink(host, at);
            removed += 1;
            if next == NIL {
                break;
            }
            at = next;
        }
        Ok(removed)
    }

    /// Unlinks the nodes at the given indices; repeated indices are
    /// consumed once. Returns the number removed.
    ///
    /// The indices are sorted ascending, then one full backward walk
    /// unlinks a node whenever the running index matches the next
    /// (largest-remaining) requested index: `O(size + m log m)` instead of
    /// one navigation per index.
    ///
    /// # Errors
    ///
    /// [`ChainError::IndexOutOfRange`] for the first offending index;
    /// every index is validated before any node is unlinked.
    pub fn remove_indices<H: Host>(
        &mut self,
        host: &mut H,
        indices: &[usize],
    ) -> Result<usize, ChainError> {
        let size = host.size();
        for &index in indices {
            if index >= size {
                return Err(ChainError::IndexOutOfRange { index, size });
            }
        }
        if indices.is_empty() {
            return Ok(0);
        }

        let mut sorted = indices.to_vec();
        sorted.sort_unstable();

        let mut removed = 0;
        let mut cursor = self.arena[self.sentinel].prev;
        let mut cursor_index = size - 1;
        // No valid index equals usize::MAX, so it marks "none consumed yet".
        let mut consumed = usize::MAX;
        for &target in sorted.iter().rev() {
            if target == consumed {
                continue;
            }
            consumed = target;
            while cursor_index > target {
                cursor = self.arena[cursor].prev;
                cursor_index -= 1;
            }
            let before = self.arena[cursor].prev;
            self.unlink(host, cursor);
            removed += 1;
            cursor = before;
            cursor_index = cursor_index.wrapping_sub(1);
        }
        Ok(removed)
    }

    // ========================================================================
    // Distinct / dedup
    // ========================================================================

    /// Copies out the first occurrence of each payload, preserving forward
    /// order. The chain is not modified.
    pub fn distinct(&self) -> Vec<T>
    where
        T: Clone + PartialEq,
    {
        self.distinct_by(|a, b| a == b)
    }

    /// [`distinct`](Chain::distinct) under an explicit equivalence function.
    pub fn distinct_by(&self, eq: impl FnMut(&T, &T) -> bool) -> Vec<T>
    where
        T: Clone,
    {
        match (self.first(), self.last()) {
            (Some(low), Some(high)) => self.distinct_core(low, high, |t| t, eq),
            _ => Vec::new(),
        }
    }

    /// Ranged [`distinct`](Chain::distinct) over the addressed node set,
    /// output in forward order.
    pub fn distinct_in<H: Host>(&self, host: &H, range: Range) -> Result<Vec<T>, ChainError>
    where
        T: Clone + PartialEq,
    {
        let span = self.resolve(host.size(), range)?;
        match self.span_ends(span) {
            Some((low, high)) => Ok(self.distinct_core(low, high, |t| t, |a, b| a == b)),
            None => Ok(Vec::new()),
        }
    }

    /// Scans the span from its high end toward its low end so that "no
    /// duplicate later in the scan" coincides with "first forward
    /// occurrence"; the pairwise lookahead is quadratic in the span size.
    ///
    /// `proj` selects the payload axis under comparison; the key/value
    /// layer passes key- or value-projections through here.
    pub(crate) fn distinct_core<A: Clone>(
        &self,
        low: usize,
        high: usize,
        proj: impl Fn(&T) -> &A,
        mut eq: impl FnMut(&A, &A) -> bool,
    ) -> Vec<A> {
        let boundary = self.arena[low].prev;
        let mut out = Vec::new();
        let mut at = high;
        loop {
            let mut probe = self.arena[at].prev;
            let mut duplicate = false;
            while probe != boundary {
                if eq(proj(self.payload(probe)), proj(self.payload(at))) {
                    duplicate = true;
                    break;
                }
                probe = self.arena[probe].prev;
            }
            if !duplicate {
                out.push(proj(self.payload(at)).clone());
            }
            if at == low {
                break;
            }
            at = self.arena[at].prev;
        }
        out.reverse();
        out
    }

    /// Unlinks every later duplicate in place, keeping the first of each.
    /// Returns the number removed.
    pub fn dedup<H: Host>(&mut self, host: &mut H) -> usize
    where
        T: PartialEq,
    {
        self.dedup_by(host, |a, b| a == b)
    }

    /// [`dedup`](Chain::dedup) under an explicit equivalence function.
    pub fn dedup_by<H: Host>(
        &mut self,
        host: &mut H,
        eq: impl FnMut(&T, &T) -> bool,
    ) -> usize {
        let size = host.size();
        self.dedup_in_by(host, Range::new(0, size as isize), eq)
            .expect("whole-chain range is valid")
    }

    /// Ranged dedup: removes later duplicates within the addressed node
    /// set only.
    pub fn dedup_in<H: Host>(&mut self, host: &mut H, range: Range) -> Result<usize, ChainError>
    where
        T: PartialEq,
    {
        self.dedup_in_by(host, range, |a, b| a == b)
    }

    fn dedup_in_by<H: Host>(
        &mut self,
        host: &mut H,
        range: Range,
        mut eq: impl FnMut(&T, &T) -> bool,
    ) -> Result<usize, ChainError> {
        let span = self.resolve(host.size(), range)?;
        let Some((low, _)) = self.span_ends(span) else {
            return Ok(0);
        };

        let mut removed = 0;
        let mut remaining = span.count;
        let mut keep = low;
        let mut keep_pos = 0;
        while keep_pos + 1 < remaining {
            let mut probe = self.arena[keep].next;
            let mut probe_pos = keep_pos + 1;
            while probe_pos < remaining {
                let next = self.arena[probe].next;
                if eq(self.payload(probe), self.payload(keep)) {
                    self.unlink(host, probe);
                    removed += 1;
                    remaining -= 1;
                } else {
                    probe_pos += 1;
                }
                probe = next;
            }
            keep = self.arena[keep].next;
            keep_pos += 1;
        }
        Ok(removed)
    }

    // ========================================================================
    // Drain
    // ========================================================================

    /// Hands every payload to `sink` front-to-back, unlinking as it goes.
    ///
    /// If the sink answers `Stop`, every remaining node is unlinked as well
    /// and the host is told the abandoned count — an early-stopped drain
    /// leaves the chain empty, never half-visited. Returns the number of
    /// payloads the sink consumed.
    pub fn drain_into<H: Host>(&mut self, host: &mut H, mut sink: impl FnMut(T) -> Step) -> usize {
        let mut consumed = 0;
        while let Some(first) = self.first() {
            let payload = self.unlink(host, first);
            consumed += 1;
            if sink(payload).is_stop() {
                let abandoned = self.abandon_rest();
                host.drain_abandoned(abandoned);
                break;
            }
        }
        consumed
    }

    /// Conditional move: hands payloads satisfying `pred` to `sink`,
    /// unlinking them; non-matching nodes stay. The abandon policy of
    /// [`drain_into`](Chain::drain_into) applies: a `Stop` from the sink
    /// empties the whole remainder of the chain.
    pub fn drain_matching<H: Host>(
        &mut self,
        host: &mut H,
        mut pred: impl FnMut(&T) -> bool,
        mut sink: impl FnMut(T) -> Step,
    ) -> usize {
        let mut consumed = 0;
        let mut at = self.arena[self.sentinel].next;
        while at != NIL {
            let next = self.arena[at].next;
            if pred(self.payload(at)) {
                let payload = self.unlink(host, at);
                consumed += 1;
                if sink(payload).is_stop() {
                    let abandoned = self.abandon_rest();
                    host.drain_abandoned(abandoned);
                    break;
                }
            }
            at = next;
        }
        consumed
    }

    /// Unlinks every remaining node without per-node notification; the
    /// caller reports the count through [`Host::drain_abandoned`].
    fn abandon_rest(&mut self) -> usize {
        let mut abandoned = 0;
        let mut at = self.arena[self.sentinel].next;
        while at != NIL {
            let next = self.arena[at].next;
            self.arena.remove(at);
            abandoned += 1;
            at = next;
        }
        self.arena[self.sentinel].next = NIL;
        self.arena[self.sentinel].prev = self.sentinel;
        abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Census;

    fn build(values: &[i32]) -> (Chain<i32>, Census) {
        let mut chain = Chain::new();
        let mut census = Census::new();
        for &v in values {
            chain.push_back(v);
            census.node_added();
        }
        (chain, census)
    }

    #[test]
    fn for_each_whole_and_ranged() {
        let (chain, census) = build(&[1, 2, 3, 4]);
        let mut sum = 0;
        chain.for_each(|&v| sum += v);
        assert_eq!(sum, 10);

        let mut seen = Vec::new();
        chain
            .for_each_in(&census, Range::new(3, -2), |&v| seen.push(v))
            .unwrap();
        assert_eq!(seen, vec![4, 3]);
    }

    #[test]
    fn scan_stops_early() {
        let (chain, _census) = build(&[1, 2, 3, 4]);
        let mut seen = Vec::new();
        let step = chain.scan(|&v| {
            seen.push(v);
            if v == 2 { Step::Stop } else { Step::Continue }
        });
        assert_eq!(step, Step::Stop);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn scan_runs_off_the_end() {
        let (chain, _census) = build(&[1, 2]);
        assert_eq!(chain.scan(|_| Step::Continue), Step::Continue);
    }

    #[test]
    fn try_scan_propagates_error_without_rollback() {
        let (chain, _census) = build(&[1, 2, 3]);
        let mut calls = 0;
        let err = chain.try_scan(|_| {
            calls += 1;
            if calls == 2 { Err("boom") } else { Ok(Step::Continue) }
        });
        assert_eq!(err, Err("boom"));
        chain.assert_chain(&[1, 2, 3]);
    }

    #[test]
    fn copy_range_both_directions() {
        let (chain, census) = build(&[1, 2, 3, 4, 5]);
        assert_eq!(
            chain.copy_range(&census, Range::new(1, 3)).unwrap(),
            vec![2, 3, 4]
        );
        assert_eq!(
            chain.copy_range(&census, Range::new(3, -3)).unwrap(),
            vec![4, 3, 2]
        );
        assert_eq!(
            chain.copy_range(&census, Range::new(0, 0)).unwrap(),
            Vec::<i32>::new()
        );
        assert_eq!(
            chain.copy_range(&census, Range::new(2, 0)).unwrap(),
            Vec::<i32>::new()
        );
    }

    #[test]
    fn range_symmetry() {
        // Forward [o, o+k) and the backward range anchored at o+k-1 with
        // length -k visit the same node set in opposite order.
        let (chain, census) = build(&[10, 11, 12, 13, 14, 15]);
        for offset in 0..6 {
            for len in 0..=(6 - offset) {
                let fwd = chain
                    .copy_range(&census, Range::new(offset, len as isize))
                    .unwrap();
                if len == 0 {
                    assert!(fwd.is_empty());
                    continue;
                }
                let back = chain
                    .copy_range(&census, Range::new(offset + len - 1, -(len as isize)))
                    .unwrap();
                let mut back_reversed = back.clone();
                back_reversed.reverse();
                assert_eq!(fwd, back_reversed);
            }
        }
    }

    #[test]
    fn position_variants() {
        let (chain, census) = build(&[5, 3, 1, 3, 2]);
        assert_eq!(chain.position(&3), Some(1));
        assert_eq!(chain.position(&9), None);
        assert_eq!(chain.position_if(|&v| v < 3), Some(2));
        assert_eq!(chain.position_eq(&30, |a, b| *a == b / 10), Some(1));

        // Backward range search reports the absolute index of the first
        // match in visitation order.
        assert_eq!(
            chain.position_in(&census, Range::new(4, -5), &3).unwrap(),
            Some(3)
        );
        assert_eq!(
            chain.position_in(&census, Range::new(0, 5), &3).unwrap(),
            Some(1)
        );
        assert_eq!(
            chain.position_in(&census, Range::new(0, 2), &2).unwrap(),
            None
        );
    }

    #[test]
    fn find_variants() {
        let (chain, census) = build(&[1, 2, 3]);
        assert_eq!(chain.find(&2), Some(&2));
        assert_eq!(chain.find(&9), None);
        assert_eq!(chain.find_eq(&20, |a, b| *a == b / 10), Some(&2));
        assert_eq!(chain.find_if(|&v| v > 1), Some(&2));
        assert_eq!(chain.find_if(|&v| v > 5), None);

        // Ranged forms search in range order.
        assert_eq!(
            chain.find_in(&census, Range::new(2, -3), &2).unwrap(),
            Some(&2)
        );
        assert_eq!(chain.find_in(&census, Range::new(0, 2), &3).unwrap(), None);
        assert_eq!(
            chain
                .find_in_eq(&census, Range::new(0, 3), &30, |a, b| *a == b / 10)
                .unwrap(),
            Some(&3)
        );
        assert_eq!(
            chain.find_in_if(&census, Range::new(2, -3), |&v| v > 1).unwrap(),
            Some(&3)
        );
    }

    #[test]
    fn count_and_contains() {
        let (chain, census) = build(&[1, 2, 1, 3, 1]);
        assert_eq!(chain.count(&1), 3);
        assert_eq!(chain.count_if(|&v| v > 1), 2);
        assert_eq!(chain.count_in(&census, Range::new(1, 3), &1).unwrap(), 1);
        assert!(chain.contains(&3));
        assert!(!chain.contains(&9));
        assert!(!chain.contains_in(&census, Range::new(0, 2), &3).unwrap());
    }

    #[test]
    fn set_algebra() {
        let (chain, _census) = build(&[1, 2, 3, 4]);
        assert!(chain.contains_all_of(&[2, 4]));
        assert!(!chain.contains_all_of(&[2, 5]));

        let (mut chain, mut census2) = build(&[1, 2, 3, 4, 2]);
        assert_eq!(chain.remove_all_of(&mut census2, &[2, 4]), 3);
        chain.assert_chain(&[1, 3]);
        assert_eq!(census2.size(), 2);

        let (mut chain, mut census3) = build(&[1, 2, 3, 4, 2]);
        assert_eq!(chain.retain_all_of(&mut census3, &[2, 4]), 2);
        chain.assert_chain(&[2, 4, 2]);
    }

    #[test]
    fn remove_all_of_in_range_only() {
        let (mut chain, mut census) = build(&[2, 1, 2, 3, 2]);
        let n = chain
            .remove_all_of_in(&mut census, Range::new(1, 3), &[2])
            .unwrap();
        assert_eq!(n, 1);
        chain.assert_chain(&[2, 1, 3, 2]);
    }

    #[test]
    fn retain_all_of_in_range_only() {
        let (mut chain, mut census) = build(&[1, 2, 3, 4, 1]);
        // Only the middle three nodes are intersected against {2, 4}.
        let n = chain
            .retain_all_of_in(&mut census, Range::new(1, 3), &[2, 4])
            .unwrap();
        assert_eq!(n, 1);
        chain.assert_chain(&[1, 2, 4, 1]);
        assert_eq!(census.size(), 4);

        // A backward address over the same node set removes the same nodes.
        let (mut chain, mut census) = build(&[1, 2, 3, 4, 1]);
        let n = chain
            .retain_all_of_in(&mut census, Range::new(3, -3), &[2, 4])
            .unwrap();
        assert_eq!(n, 1);
        chain.assert_chain(&[1, 2, 4, 1]);
    }

    #[test]
    fn replace_and_substitute() {
        let (mut chain, census) = build(&[1, 2, 1, 3]);
        assert_eq!(chain.replace_all(&1, &9), 2);
        chain.assert_chain(&[9, 2, 9, 3]);

        assert_eq!(
            chain
                .replace_all_in(&census, Range::new(2, 2), &9, &7)
                .unwrap(),
            1
        );
        chain.assert_chain(&[9, 2, 7, 3]);

        assert_eq!(chain.substitute(|&v| (v > 5).then_some(v - 5)), 2);
        chain.assert_chain(&[4, 2, 2, 3]);
    }

    #[test]
    fn remove_first_and_remove_if() {
        let (mut chain, mut census) = build(&[1, 2, 1, 3]);
        assert_eq!(chain.remove_first(&mut census, &1), Some(1));
        chain.assert_chain(&[2, 1, 3]);
        assert_eq!(chain.remove_first(&mut census, &9), None);

        assert_eq!(chain.remove_if(&mut census, |&v| v % 2 == 1), 2);
        chain.assert_chain(&[2]);
        assert_eq!(census.size(), 1);
    }

    #[test]
    fn remove_range_forward_and_backward() {
        let (mut chain, mut census) = build(&[1, 2, 3, 4, 5]);
        assert_eq!(chain.remove_range(&mut census, Range::new(1, 2)).unwrap(), 2);
        chain.assert_chain(&[1, 4, 5]);
        assert_eq!(census.size(), 3);

        let (mut chain, mut census) = build(&[1, 2, 3, 4, 5]);
        assert_eq!(
            chain.remove_range(&mut census, Range::new(3, -2)).unwrap(),
            2
        );
        chain.assert_chain(&[1, 2, 5]);
    }

    #[test]
    fn remove_indices_duplicates_consumed_once() {
        let (mut chain, mut census) = build(&[10, 11, 12, 13, 14]);
        let removed = chain.remove_indices(&mut census, &[3, 1, 1]).unwrap();
        assert_eq!(removed, 2);
        chain.assert_chain(&[10, 12, 14]);
        assert_eq!(census.size(), 3);
    }

    #[test]
    fn remove_indices_validates_before_mutation() {
        let (mut chain, mut census) = build(&[1, 2, 3]);
        assert_eq!(
            chain.remove_indices(&mut census, &[1, 7]),
            Err(ChainError::IndexOutOfRange { index: 7, size: 3 })
        );
        chain.assert_chain(&[1, 2, 3]);
        assert_eq!(census.size(), 3);
    }

    #[test]
    fn remove_indices_full_sweep() {
        let (mut chain, mut census) = build(&[1, 2, 3, 4]);
        assert_eq!(
            chain.remove_indices(&mut census, &[0, 1, 2, 3]).unwrap(),
            4
        );
        chain.assert_chain(&[]);
    }

    #[test]
    fn distinct_keeps_first_occurrences() {
        let (chain, _census) = build(&[1, 2, 1, 3, 2]);
        assert_eq!(chain.distinct(), vec![1, 2, 3]);
        chain.assert_chain(&[1, 2, 1, 3, 2]);
    }

    #[test]
    fn distinct_in_subrange() {
        let (chain, census) = build(&[9, 1, 2, 1, 3, 2]);
        // Range covers [1, 2, 1, 3, 2].
        assert_eq!(
            chain.distinct_in(&census, Range::new(1, 5)).unwrap(),
            vec![1, 2, 3]
        );
        // A backward address over the same node set sees the same firsts.
        assert_eq!(
            chain.distinct_in(&census, Range::new(5, -5)).unwrap(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn dedup_removes_later_duplicates() {
        let (mut chain, mut census) = build(&[1, 2, 1, 3, 2]);
        assert_eq!(chain.dedup(&mut census), 2);
        chain.assert_chain(&[1, 2, 3]);
        assert_eq!(census.size(), 3);
    }

    #[test]
    fn dedup_in_leaves_outside_untouched() {
        let (mut chain, mut census) = build(&[1, 1, 2, 2, 1]);
        // Only the middle three nodes are deduplicated.
        assert_eq!(chain.dedup_in(&mut census, Range::new(1, 3)).unwrap(), 1);
        chain.assert_chain(&[1, 1, 2, 1]);
    }

    #[test]
    fn drain_into_consumes_all() {
        let (mut chain, mut census) = build(&[1, 2, 3]);
        let mut out = Vec::new();
        let consumed = chain.drain_into(&mut census, |v| {
            out.push(v);
            Step::Continue
        });
        assert_eq!(consumed, 3);
        assert_eq!(out, vec![1, 2, 3]);
        chain.assert_chain(&[]);
        assert_eq!(census.size(), 0);
    }

    #[test]
    fn drain_abandon_empties_the_chain() {
        let (mut chain, mut census) = build(&[1, 2, 3, 4]);
        let mut out = Vec::new();
        let consumed = chain.drain_into(&mut census, |v| {
            out.push(v);
            if v == 2 { Step::Stop } else { Step::Continue }
        });
        assert_eq!(consumed, 2);
        assert_eq!(out, vec![1, 2]);
        // Abandon means drain: nothing is left half-visited.
        chain.assert_chain(&[]);
        assert_eq!(census.size(), 0);
    }

    #[test]
    fn drain_matching_moves_only_matches() {
        let (mut chain, mut census) = build(&[1, 2, 3, 4]);
        let mut out = Vec::new();
        let consumed = chain.drain_matching(
            &mut census,
            |&v| v % 2 == 0,
            |v| {
                out.push(v);
                Step::Continue
            },
        );
        assert_eq!(consumed, 2);
        assert_eq!(out, vec![2, 4]);
        chain.assert_chain(&[1, 3]);
        assert_eq!(census.size(), 2);
    }

    #[test]
    fn drain_matching_abandon_empties_the_chain() {
        let (mut chain, mut census) = build(&[1, 2, 3, 4]);
        let consumed = chain.drain_matching(&mut census, |&v| v % 2 == 0, |_| Step::Stop);
        assert_eq!(consumed, 1);
        chain.assert_chain(&[]);
        assert_eq!(census.size(), 0);
    }
}
