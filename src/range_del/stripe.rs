//! Snapshot stripes.
//!
//! A stripe is the sequence number interval `(previous snapshot, snapshot]`.
//! The last stripe is capped by [`MAX_SEQUENCE_NUMBER`], so the stripes
//! partition the whole sequence space and every sequence number maps to
//! exactly one of them.

use crate::types::{SequenceNumber, MAX_SEQUENCE_NUMBER};

use super::tombstone_map::TombstoneMap;

/// One stripe and its tombstones.
#[derive(Debug)]
pub(crate) struct Stripe {
    /// Inclusive upper sequence bound of the stripe.
    pub(crate) upper: SequenceNumber,
    pub(crate) tombstones: TombstoneMap,
}

/// Stripes in ascending sequence order.
#[derive(Debug)]
pub(crate) struct StripeMap {
    stripes: Vec<Stripe>,
}

impl StripeMap {
    /// Build stripes for the given snapshots.
    ///
    /// The list is sorted and deduplicated; snapshots at or above
    /// `MAX_SEQUENCE_NUMBER` collapse into the top stripe.
    pub(crate) fn new(snapshots: &[SequenceNumber]) -> Self {
        let mut uppers: Vec<SequenceNumber> = snapshots
            .iter()
            .copied()
            .filter(|&seq| seq < MAX_SEQUENCE_NUMBER)
            .collect();
        uppers.sort_unstable();
        uppers.dedup();
        uppers.push(MAX_SEQUENCE_NUMBER);

        let stripes = uppers
            .into_iter()
            .map(|upper| Stripe {
                upper,
                tombstones: TombstoneMap::new(),
            })
            .collect();
        Self { stripes }
    }

    /// Index of the stripe holding `seq`: the first whose upper bound is
    /// `>= seq`.
    pub(crate) fn stripe_index(&self, seq: SequenceNumber) -> usize {
        let idx = self.stripes.partition_point(|stripe| stripe.upper < seq);
        // Out-of-range sequences belong to the top stripe
        idx.min(self.stripes.len() - 1)
    }

    pub(crate) fn get(&self, seq: SequenceNumber) -> &TombstoneMap {
        &self.stripes[self.stripe_index(seq)].tombstones
    }

    pub(crate) fn get_mut(&mut self, seq: SequenceNumber) -> &mut TombstoneMap {
        let idx = self.stripe_index(seq);
        &mut self.stripes[idx].tombstones
    }

    pub(crate) fn len(&self) -> usize {
        self.stripes.len()
    }

    /// Stripes from oldest to newest, skipping the oldest when
    /// `skip_oldest` is set.
    pub(crate) fn iter_from(&self, skip_oldest: bool) -> impl Iterator<Item = &Stripe> + '_ {
        self.stripes.iter().skip(usize::from(skip_oldest))
    }

    pub(crate) fn num_tombstones(&self) -> usize {
        self.stripes.iter().map(|stripe| stripe.tombstones.len()).sum()
    }
}
