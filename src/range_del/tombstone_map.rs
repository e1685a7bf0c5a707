//! Ordered interval store for the tombstones of one snapshot stripe.
//!
//! Tombstones are kept sorted by start key (user comparator order), newest
//! first among equal start keys. Coverage lookups go through a fragment index:
//! the tombstones cut into non-overlapping `[start, end)` pieces, each tagged
//! with the greatest sequence number covering it. A lookup is one binary
//! search over the fragments, however the tombstones overlap. The index is
//! dropped on insert and rebuilt by the next lookup.

use std::cell::OnceCell;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::SequenceNumber;
use crate::util::Comparator;

use super::pinned::{PinnedArena, PinnedSlice};

/// A tombstone whose boundaries live in a [`PinnedArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StoredTombstone {
    /// Inclusive start user key.
    pub(crate) start: PinnedSlice,
    /// Exclusive end user key.
    pub(crate) end: PinnedSlice,
    pub(crate) sequence: SequenceNumber,
}

/// A piece of key space covered by at least one tombstone.
#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: PinnedSlice,
    end: PinnedSlice,
    max_sequence: SequenceNumber,
}

/// Tombstones of one stripe, ordered by `(start asc, sequence desc)`.
#[derive(Debug, Default)]
pub(crate) struct TombstoneMap {
    entries: Vec<StoredTombstone>,
    /// Sorted, non-overlapping fragments of `entries`.
    fragments: OnceCell<Vec<Fragment>>,
}

pub(crate) fn compare_tombstones(
    a: &StoredTombstone,
    b: &StoredTombstone,
    arena: &PinnedArena,
    ucmp: &dyn Comparator,
) -> Ordering {
    ucmp.compare(arena.get(a.start), arena.get(b.start))
        .then_with(|| b.sequence.cmp(&a.sequence))
}

impl TombstoneMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Tombstones in start key order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &StoredTombstone> + '_ {
        self.entries.iter()
    }

    /// Insert a tombstone, keeping start key order.
    ///
    /// Sources arrive sorted, so the common case appends.
    pub(crate) fn insert(
        &mut self,
        tombstone: StoredTombstone,
        arena: &PinnedArena,
        ucmp: &dyn Comparator,
    ) {
        let appends = self.entries.last().map_or(true, |last| {
            compare_tombstones(last, &tombstone, arena, ucmp) != Ordering::Greater
        });
        let pos = if appends {
            self.entries.len()
        } else {
            self.entries.partition_point(|e| {
                compare_tombstones(e, &tombstone, arena, ucmp) != Ordering::Greater
            })
        };

        self.entries.insert(pos, tombstone);
        self.fragments.take();
    }

    /// Greatest sequence number among tombstones whose `[start, end)`
    /// contains `user_key`, or `None` when no tombstone covers it.
    pub(crate) fn max_covering_sequence(
        &self,
        user_key: &[u8],
        arena: &PinnedArena,
        ucmp: &dyn Comparator,
    ) -> Option<SequenceNumber> {
        if self.entries.is_empty() {
            return None;
        }

        let fragments = self
            .fragments
            .get_or_init(|| Self::build_fragments(&self.entries, arena, ucmp));
        let idx = fragments
            .partition_point(|f| ucmp.compare(arena.get(f.start), user_key) != Ordering::Greater);
        let fragment = fragments.get(idx.checked_sub(1)?)?;
        (ucmp.compare(arena.get(fragment.end), user_key) == Ordering::Greater)
            .then_some(fragment.max_sequence)
    }

    /// Sweep the tombstone boundaries in key order, tracking the active
    /// tombstones in a max-heap by sequence number. Tombstones that ended are
    /// only removed once they reach the top of the heap.
    fn build_fragments(
        entries: &[StoredTombstone],
        arena: &PinnedArena,
        ucmp: &dyn Comparator,
    ) -> Vec<Fragment> {
        let mut points: Vec<PinnedSlice> = entries
            .iter()
            .flat_map(|t| [t.start, t.end])
            .collect();
        points.sort_by(|a, b| ucmp.compare(arena.get(*a), arena.get(*b)));
        points.dedup_by(|a, b| ucmp.compare(arena.get(*a), arena.get(*b)) == Ordering::Equal);

        let mut fragments: Vec<Fragment> = Vec::new();
        let mut active: BinaryHeap<(SequenceNumber, Reverse<usize>)> = BinaryHeap::new();
        let mut next_entry = 0;
        for window in points.windows(2) {
            let (point, next_point) = (window[0], window[1]);

            while let Some(entry) = entries.get(next_entry) {
                if ucmp.compare(arena.get(entry.start), arena.get(point)) == Ordering::Greater {
                    break;
                }
                active.push((entry.sequence, Reverse(next_entry)));
                next_entry += 1;
            }
            while let Some(&(_, Reverse(i))) = active.peek() {
                if ucmp.compare(arena.get(entries[i].end), arena.get(point)) == Ordering::Greater {
                    break;
                }
                active.pop();
            }

            let Some(&(max_sequence, _)) = active.peek() else {
                continue;
            };
            match fragments.last_mut() {
                // Extend a contiguous fragment with the same sequence
                Some(last)
                    if last.max_sequence == max_sequence
                        && ucmp.compare(arena.get(last.end), arena.get(point))
                            == Ordering::Equal =>
                {
                    last.end = next_point;
                }
                _ => fragments.push(Fragment {
                    start: point,
                    end: next_point,
                    max_sequence,
                }),
            }
        }
        fragments
    }
}
