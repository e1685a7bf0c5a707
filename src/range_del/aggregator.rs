//! The range deletion aggregator.

use std::cmp::Ordering;
use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::iterator::InternalIterator;
use crate::options::RangeDelOptions;
use crate::table::TableBuilder;
use crate::types::{
    InternalKey, ParsedInternalKey, RangeTombstone, SequenceNumber,
    MAX_SEQUENCE_NUMBER,
};
use crate::util::{Comparator, InternalKeyComparator};
use crate::version::FileMetadata;
use crate::{Error, Result};

use super::pinned::PinnedArena;
use super::stripe::StripeMap;
use super::tombstone_map::{compare_tombstones, StoredTombstone};

/// Aggregates range tombstones encountered in memtables and SSTables.
///
/// Tombstones are grouped into snapshot stripes: the sequence ranges between
/// consecutive snapshots, including the higher snapshot and excluding the
/// lower one. A tombstone only deletes keys in its own stripe, so no reader
/// loses a key that was visible at its snapshot.
///
/// For flush and compaction, build the aggregator with every live snapshot
/// ([`RangeDelAggregator::new`]). For a single read, only the read's snapshot
/// matters ([`RangeDelAggregator::with_upper_bound`]); the sequence space is
/// then split into two stripes and nothing is allocated until the first
/// tombstone arrives, since most reads never see one.
pub struct RangeDelAggregator {
    icmp: InternalKeyComparator,
    options: RangeDelOptions,
    state: AggregatorState,
}

enum AggregatorState {
    /// No tombstone ingested yet on the read path.
    Empty { upper_bound: SequenceNumber },
    Populated(Box<Rep>),
}

struct Rep {
    stripes: StripeMap,
    pinned: PinnedArena,
}

impl Rep {
    fn new(snapshots: &[SequenceNumber]) -> Self {
        let stripes = StripeMap::new(snapshots);
        debug!(stripes = stripes.len(), "initialized range deletion stripes");
        Self {
            stripes,
            pinned: PinnedArena::new(),
        }
    }
}

impl RangeDelAggregator {
    /// Create an aggregator striped by every given snapshot.
    ///
    /// Stripe storage is built immediately; use this on the write path where
    /// the cost is amortized over a whole table.
    pub fn new(icmp: InternalKeyComparator, snapshots: &[SequenceNumber]) -> Self {
        Self {
            icmp,
            options: RangeDelOptions::default(),
            state: AggregatorState::Populated(Box::new(Rep::new(snapshots))),
        }
    }

    /// Create an aggregator for a read at snapshot `upper_bound`.
    ///
    /// Keeps only the snapshot until the first tombstone is ingested.
    pub fn with_upper_bound(icmp: InternalKeyComparator, upper_bound: SequenceNumber) -> Self {
        Self {
            icmp,
            options: RangeDelOptions::default(),
            state: AggregatorState::Empty { upper_bound },
        }
    }

    /// Replace the options.
    ///
    /// Returns [`Error::InvalidConfiguration`] if `options` do not validate.
    pub fn with_options(mut self, options: RangeDelOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// Get the internal key comparator.
    pub fn comparator(&self) -> &InternalKeyComparator {
        &self.icmp
    }

    /// Get the options.
    pub fn options(&self) -> &RangeDelOptions {
        &self.options
    }

    fn rep(&self) -> Option<&Rep> {
        match &self.state {
            AggregatorState::Empty { .. } => None,
            AggregatorState::Populated(rep) => Some(rep.as_ref()),
        }
    }

    fn rep_mut(state: &mut AggregatorState) -> &mut Rep {
        if let AggregatorState::Empty { upper_bound } = *state {
            *state = AggregatorState::Populated(Box::new(Rep::new(&[upper_bound])));
        }
        match state {
            AggregatorState::Populated(rep) => rep,
            AggregatorState::Empty { .. } => unreachable!("state populated above"),
        }
    }

    /// Add the range tombstones produced by `input`.
    ///
    /// `input` yields range deletion records sorted by internal key: the
    /// record key is the start key, the value is the exclusive end key.
    /// Records are read once, front to back. Their buffers stay pinned for the
    /// aggregator's lifetime, so tombstones are stored without copying.
    ///
    /// Returns [`Error::Corruption`] on the first record that does not decode
    /// to a valid range tombstone. Tombstones added before the bad record
    /// remain; callers treat the error as fatal to the whole operation.
    pub fn add_tombstones<I: InternalIterator>(&mut self, mut input: I) -> Result<()> {
        input.seek_to_first()?;

        let mut previous_key: Option<Bytes> = None;
        let mut added = 0usize;
        while input.valid() {
            let (key, value) = match (input.key(), input.value()) {
                (Some(key), Some(value)) => (key, value),
                _ => return Err(Error::internal("valid iterator returned no entry")),
            };

            let (user_key_len, sequence) =
                match self.decode_tombstone(&key, &value, previous_key.as_deref()) {
                    Ok(decoded) => decoded,
                    Err(err) => {
                        warn!(added, error = %err, "rejecting corrupted range tombstone");
                        return Err(err);
                    }
                };
            if self.options.paranoid_checks {
                previous_key = Some(key.clone());
            }

            let ucmp = self.icmp.user_comparator();
            let rep = Self::rep_mut(&mut self.state);
            let key_id = rep.pinned.pin(key);
            let value_id = rep.pinned.pin(value);
            let tombstone = StoredTombstone {
                start: rep.pinned.slice(key_id, 0..user_key_len),
                end: rep.pinned.whole(value_id),
                sequence,
            };
            trace!(
                sequence,
                start_len = tombstone.start.len(),
                end_len = tombstone.end.len(),
                "adding range tombstone"
            );
            rep.stripes
                .get_mut(sequence)
                .insert(tombstone, &rep.pinned, ucmp);
            added += 1;

            input.next()?;
        }

        if let Some(rep) = self.rep() {
            debug!(
                added,
                total = rep.stripes.num_tombstones(),
                pinned_buffers = rep.pinned.len(),
                "added range tombstones"
            );
        }
        Ok(())
    }

    /// Validate one record, returning the start user key length and the
    /// tombstone's sequence number.
    fn decode_tombstone(
        &self,
        key: &[u8],
        end_key: &[u8],
        previous_key: Option<&[u8]>,
    ) -> Result<(usize, SequenceNumber)> {
        let parsed = ParsedInternalKey::parse(key)
            .ok_or_else(|| Error::corruption("unable to parse range tombstone internal key"))?;

        if !parsed.value_type.is_range_deletion() {
            return Err(Error::corruption(format!(
                "expected range deletion record, found {:?}",
                parsed.value_type
            )));
        }

        if self.icmp.compare_user_keys(parsed.user_key, end_key) != Ordering::Less {
            return Err(Error::corruption(
                "range tombstone start key is not before its end key",
            ));
        }

        if self.options.paranoid_checks {
            let limit = self.options.max_tombstone_key_size;
            if parsed.user_key.len() > limit || end_key.len() > limit {
                return Err(Error::corruption(format!(
                    "range tombstone key exceeds {} bytes",
                    limit
                )));
            }

            if let Some(previous) = previous_key {
                if self.icmp.compare(previous, key) == Ordering::Greater {
                    return Err(Error::corruption("range tombstones out of order"));
                }
            }
        }

        Ok((parsed.user_key.len(), parsed.sequence))
    }

    /// Check whether `parsed` is covered by a tombstone in its own stripe.
    ///
    /// The key is deleted iff the newest tombstone covering it in that stripe
    /// has a sequence number greater than the key's.
    pub fn should_delete(&self, parsed: &ParsedInternalKey<'_>) -> bool {
        let Some(rep) = self.rep() else {
            return false;
        };

        let tombstones = rep.stripes.get(parsed.sequence);
        if tombstones.is_empty() {
            return false;
        }

        tombstones
            .max_covering_sequence(parsed.user_key, &rep.pinned, self.icmp.user_comparator())
            .map_or(false, |sequence| sequence > parsed.sequence)
    }

    /// [`should_delete`](Self::should_delete) for an encoded internal key.
    ///
    /// A key that does not parse is never reported as deleted.
    pub fn should_delete_encoded(&self, internal_key: &[u8]) -> bool {
        match ParsedInternalKey::parse(internal_key) {
            Some(parsed) => self.should_delete(&parsed),
            None => {
                trace!(len = internal_key.len(), "should_delete on unparsable key");
                false
            }
        }
    }

    /// Check whether an output table needs any tombstones at all.
    ///
    /// At the bottommost level, tombstones in the oldest stripe are obsolete:
    /// every key they could cover has already been compacted away.
    pub fn should_add_tombstones(&self, bottommost_level: bool) -> bool {
        self.rep().map_or(false, |rep| {
            rep.stripes
                .iter_from(bottommost_level)
                .any(|stripe| !stripe.tombstones.is_empty())
        })
    }

    /// Check whether no tombstone has been ingested.
    pub fn is_empty(&self) -> bool {
        self.rep()
            .map_or(true, |rep| rep.stripes.num_tombstones() == 0)
    }

    /// Number of ingested tombstones across all stripes.
    pub fn num_tombstones(&self) -> usize {
        self.rep().map_or(0, |rep| rep.stripes.num_tombstones())
    }

    /// Bytes of source buffers kept alive by ingested tombstones.
    pub fn pinned_bytes(&self) -> usize {
        self.rep().map_or(0, |rep| rep.pinned.pinned_bytes())
    }

    /// Write the tombstones overlapping `[lower_bound, upper_bound)` to
    /// `builder` and widen `meta`'s key range to cover them.
    ///
    /// A `None` bound leaves that side of the target range open. Tombstones
    /// are written in ascending internal key order across all stripes; two
    /// records with the same start key and sequence number are merged into one
    /// spanning the larger end key. With `bottommost_level`, the oldest stripe
    /// is skipped (see [`should_add_tombstones`](Self::should_add_tombstones)).
    ///
    /// File boundaries only move outward, and never past the bounds: a
    /// tombstone reaching below `lower_bound` yields smallest key
    /// `(lower_bound, 0)`, one reaching `upper_bound` yields largest key
    /// `(upper_bound, MAX_SEQUENCE_NUMBER)`, so adjacent tables stay
    /// key-space partitioned. An unset `meta.smallest`/`meta.largest` is
    /// taken from the tombstones outright.
    ///
    /// Only errors reported by `builder` are returned.
    pub fn add_to_builder<B: TableBuilder + ?Sized>(
        &self,
        builder: &mut B,
        lower_bound: Option<&[u8]>,
        upper_bound: Option<&[u8]>,
        meta: &mut FileMetadata,
        bottommost_level: bool,
    ) -> Result<()> {
        let Some(rep) = self.rep() else {
            return Ok(());
        };
        let ucmp = self.icmp.user_comparator();
        let pinned = &rep.pinned;

        let mut selected: Vec<StoredTombstone> = Vec::new();
        for stripe in rep.stripes.iter_from(bottommost_level) {
            for tombstone in stripe.tombstones.iter() {
                if let Some(upper) = upper_bound {
                    // Starts at or after upper_bound: belongs to the next
                    // table, and so does everything after it in this stripe
                    if ucmp.compare(upper, pinned.get(tombstone.start)) != Ordering::Greater {
                        break;
                    }
                }
                if let Some(lower) = lower_bound {
                    // Ends at or before lower_bound: belongs to the previous table
                    if ucmp.compare(pinned.get(tombstone.end), lower) != Ordering::Greater {
                        continue;
                    }
                }
                selected.push(*tombstone);
            }
        }
        if selected.is_empty() {
            return Ok(());
        }

        // Stripes cover disjoint sequence ranges, so only same-stripe
        // tombstones can share a start key and sequence number.
        selected.sort_by(|a, b| compare_tombstones(a, b, pinned, ucmp));
        selected.dedup_by(|next, kept| {
            if kept.sequence != next.sequence
                || ucmp.compare(pinned.get(kept.start), pinned.get(next.start)) != Ordering::Equal
            {
                return false;
            }
            if ucmp.compare(pinned.get(next.end), pinned.get(kept.end)) == Ordering::Greater {
                kept.end = next.end;
            }
            true
        });

        for (i, stored) in selected.iter().enumerate() {
            let tombstone = RangeTombstone::new(
                pinned.get_bytes(stored.start),
                pinned.get_bytes(stored.end),
                stored.sequence,
            );
            let (start_key, end_key) = tombstone.serialize();
            builder.add(&start_key.encode(), &end_key)?;

            if i == 0 {
                self.extend_smallest(meta, start_key, lower_bound);
            }
            self.extend_largest(meta, tombstone.serialize_end_key(), upper_bound);
        }

        debug!(
            written = selected.len(),
            bottommost_level,
            smallest = ?meta.smallest().map(InternalKey::user_key),
            largest = ?meta.largest().map(InternalKey::user_key),
            "added range tombstones to table"
        );
        Ok(())
    }

    fn extend_smallest(
        &self,
        meta: &mut FileMetadata,
        mut candidate: InternalKey,
        lower_bound: Option<&[u8]>,
    ) {
        if let Some(lower) = lower_bound {
            if self.icmp.compare_user_keys(candidate.user_key(), lower) != Ordering::Greater {
                // Lowest sequence sorts after the previous table's largest key
                candidate = InternalKey::for_range_deletion(Bytes::copy_from_slice(lower), 0);
            }
        }

        let widens = meta
            .smallest()
            .map_or(true, |smallest| {
                self.icmp.compare_keys(&candidate, smallest) == Ordering::Less
            });
        if widens {
            meta.set_smallest(candidate);
        }
    }

    fn extend_largest(
        &self,
        meta: &mut FileMetadata,
        mut candidate: InternalKey,
        upper_bound: Option<&[u8]>,
    ) {
        if let Some(upper) = upper_bound {
            if self.icmp.compare_user_keys(upper, candidate.user_key()) != Ordering::Greater {
                // Highest sequence sorts before the next table's smallest key
                candidate = InternalKey::for_range_deletion(
                    Bytes::copy_from_slice(upper),
                    MAX_SEQUENCE_NUMBER,
                );
            }
        }

        let widens = meta
            .largest()
            .map_or(true, |largest| {
                self.icmp.compare_keys(largest, &candidate) == Ordering::Less
            });
        if widens {
            meta.set_largest(candidate);
        }
    }
}

impl fmt::Debug for RangeDelAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("RangeDelAggregator");
        s.field("icmp", &self.icmp).field("options", &self.options);
        match &self.state {
            AggregatorState::Empty { upper_bound } => s.field("upper_bound", upper_bound),
            AggregatorState::Populated(rep) => s
                .field(
                    "snapshots",
                    &rep.stripes
                        .iter_from(false)
                        .map(|stripe| stripe.upper)
                        .collect::<Vec<_>>(),
                )
                .field("tombstones", &rep.stripes.num_tombstones())
                .field("pinned_bytes", &rep.pinned.pinned_bytes()),
        };
        s.finish()
    }
}
