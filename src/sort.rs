//! Merge sort over the forward links, with failure rollback.
//!
//! Classic linked-list merge sort: split the span in half with a slow/fast
//! pointer race, sort the halves recursively, and merge by relinking
//! successor pointers only. Because the predecessor links of the span are
//! never touched until the successor chain is fully sorted, a comparator
//! failure can be undone by walking the *original* backward chain from the
//! span's recorded tail and reassigning each successor from that walk. The
//! rollback allocates nothing, so it also works when the comparator failed
//! because of resource exhaustion.
//!
//! Whole-chain and ranged sort share the same split/merge core; only the
//! boundary reattachment differs.

use core::cmp::Ordering;
use core::convert::Infallible;

use crate::chain::Chain;
use crate::error::ChainError;
use crate::host::Host;
use crate::node::NIL;
use crate::range::Range;

impl<T> Chain<T> {
    /// Sorts the whole chain ascending.
    ///
    /// Stable: equal payloads keep their relative order.
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_by(T::cmp);
    }

    /// Sorts the whole chain by a comparator.
    pub fn sort_by(&mut self, mut cmp: impl FnMut(&T, &T) -> Ordering) {
        match self.try_sort_by(|a, b| Ok::<_, Infallible>(cmp(a, b))) {
            Ok(()) => {}
            Err(e) => match e {},
        }
    }

    /// Sorts the whole chain by a fallible comparator.
    ///
    /// # Errors
    ///
    /// If the comparator fails, the chain is rolled back to its pre-sort
    /// order and the comparator's error is returned unchanged.
    pub fn try_sort_by<F, E>(&mut self, mut cmp: F) -> Result<(), E>
    where
        F: FnMut(&T, &T) -> Result<Ordering, E>,
    {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return Ok(());
        };
        self.sort_span(self.sentinel, first, last, &mut cmp)
    }

    /// Sorts the addressed node set by a comparator. A backward address
    /// names the same nodes as its forward mirror; the comparator always
    /// sees the forward orientation.
    ///
    /// # Errors
    ///
    /// [`ChainError::OutOfRange`] if the range does not fit `host.size()`.
    pub fn sort_range_by<H: Host>(
        &mut self,
        host: &H,
        range: Range,
        mut cmp: impl FnMut(&T, &T) -> Ordering,
    ) -> Result<(), ChainError> {
        self.try_sort_range_by(host, range, |a, b| Ok::<_, Infallible>(cmp(a, b)))
    }

    /// Sorts the addressed node set by a fallible comparator.
    ///
    /// # Errors
    ///
    /// [`ChainError::OutOfRange`] for a bad address (detected before any
    /// link moves); [`ChainError::Callback`] if the comparator fails, after
    /// the span has been rolled back to its pre-sort order.
    pub fn try_sort_range_by<H: Host, F, E>(
        &mut self,
        host: &H,
        range: Range,
        mut cmp: F,
    ) -> Result<(), ChainError<E>>
    where
        F: FnMut(&T, &T) -> Result<Ordering, E>,
    {
        let span = self.resolve(host.size(), range).map_err(ChainError::widen)?;
        let Some((low, high)) = self.span_ends(span) else {
            return Ok(());
        };
        let before = self.arena[low].prev;
        self.sort_span(before, low, high, &mut cmp)
            .map_err(ChainError::Callback)
    }

    /// Sorts the span `first..=last` sitting after `before` (the sentinel
    /// or a boundary node). On comparator failure the span's links are
    /// restored before the error propagates.
    fn sort_span<F, E>(
        &mut self,
        before: usize,
        first: usize,
        last: usize,
        cmp: &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(&T, &T) -> Result<Ordering, E>,
    {
        if first == last {
            return Ok(());
        }
        let after = self.arena[last].next;
        // Truncate so the recursive phase sees a NIL-terminated sublist.
        self.arena[last].next = NIL;

        match self.merge_sort_links(first, cmp) {
            Ok(head) => {
                // Successor chain is correct; one linear pass rebuilds the
                // predecessor links and finds the new tail.
                let mut prev = before;
                let mut at = head;
                while at != NIL {
                    self.arena[at].prev = prev;
                    prev = at;
                    at = self.arena[at].next;
                }
                self.arena[before].next = head;
                self.arena[prev].next = after;
                if after != NIL {
                    self.arena[after].prev = prev;
                } else {
                    self.arena[self.sentinel].prev = prev;
                }
                Ok(())
            }
            Err(e) => {
                // Predecessor links were never touched: walk the original
                // backward chain from the recorded tail and reassign each
                // successor from it.
                let mut at = last;
                while at != first {
                    let p = self.arena[at].prev;
                    self.arena[p].next = at;
                    at = p;
                }
                self.arena[last].next = after;
                Err(e)
            }
        }
    }

    /// Sorts a NIL-terminated successor sublist, returning its new head.
    /// Only `next` links are read or written.
    fn merge_sort_links<F, E>(&mut self, head: usize, cmp: &mut F) -> Result<usize, E>
    where
        F: FnMut(&T, &T) -> Result<Ordering, E>,
    {
        if head == NIL || self.arena[head].next == NIL {
            return Ok(head);
        }

        // Slow/fast race to the midpoint.
        let mut slow = head;
        let mut fast = self.arena[head].next;
        while fast != NIL {
            fast = self.arena[fast].next;
            if fast != NIL {
                slow = self.arena[slow].next;
                fast = self.arena[fast].next;
            }
        }
        let mid = self.arena[slow].next;
        self.arena[slow].next = NIL;

        let a = self.merge_sort_links(head, cmp)?;
        let b = self.merge_sort_links(mid, cmp)?;
        self.merge_links(a, b, cmp)
    }

    /// Merges two sorted NIL-terminated sublists. Stable: ties take from
    /// the first list.
    fn merge_links<F, E>(&mut self, a: usize, b: usize, cmp: &mut F) -> Result<usize, E>
    where
        F: FnMut(&T, &T) -> Result<Ordering, E>,
    {
        let mut a = a;
        let mut b = b;
        let head;
        match cmp(self.payload(a), self.payload(b))? {
            Ordering::Greater => {
                head = b;
                b = self.arena[b].next;
            }
            _ => {
                head = a;
                a = self.arena[a].next;
            }
        }

        let mut tail = head;
        while a != NIL && b != NIL {
            match cmp(self.payload(a), self.payload(b))? {
                Ordering::Greater => {
                    self.arena[tail].next = b;
                    tail = b;
                    b = self.arena[b].next;
                }
                _ => {
                    self.arena[tail].next = a;
                    tail = a;
                    a = self.arena[a].next;
                }
            }
        }
        self.arena[tail].next = if a != NIL { a } else { b };
        Ok(head)
    }
}
