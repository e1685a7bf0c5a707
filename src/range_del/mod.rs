//! Range deletion aggregation.
//!
//! - **RangeDelAggregator**: ingests range tombstones, answers coverage
//!   queries and re-emits tombstones into new tables
//! - **StripeMap**: partitions the sequence space by snapshot
//! - **TombstoneMap**: ordered interval store for one stripe
//! - **PinnedArena**: owns the buffers tombstone boundaries point into
//!
//! # Snapshot Stripes
//!
//! ```text
//! snapshots:      10        20
//! sequence:  0 ----|---------|---------> MAX
//! stripes:   [ (..,10] ][ (10,20] ][ (20,MAX] ]
//! ```
//!
//! A tombstone at sequence 15 lives in the middle stripe and can only delete
//! keys whose sequence also falls in `(10, 20]`.

mod aggregator;
mod pinned;
mod stripe;
mod tombstone_map;

pub use aggregator::RangeDelAggregator;
