//! # rangedel
//!
//! Range deletion aggregation for an LSM-tree storage engine.
//!
//! A range tombstone deletes every user key in `[start, end)` as of a
//! sequence number. The [`RangeDelAggregator`] collects the tombstones a read
//! or a flush/compaction encounters, answers whether a key is covered at the
//! right snapshot, and writes the tombstones a new table must keep while
//! widening that table's key boundaries.
//!
//! ## Quick Start
//!
//! ```rust
//! use rangedel::{
//!     FileMetadata, InternalKey, InternalKeyComparator, RangeDelAggregator,
//!     RangeTombstone, VecIterator, VecTableBuilder,
//! };
//!
//! // Compaction with live snapshots at 10 and 20
//! let icmp = InternalKeyComparator::default();
//! let mut agg = RangeDelAggregator::new(icmp.clone(), &[10, 20]);
//!
//! let tombstones = [RangeTombstone::new("b", "e", 15)];
//! agg.add_tombstones(VecIterator::from_tombstones(&tombstones))?;
//!
//! // Same stripe (10, 20], older than the tombstone: deleted
//! assert!(agg.should_delete(&InternalKey::for_value("c", 12).as_parsed()));
//! // Older stripe: still visible to the snapshot at 10
//! assert!(!agg.should_delete(&InternalKey::for_value("c", 8).as_parsed()));
//!
//! let mut builder = VecTableBuilder::new(icmp);
//! let mut meta = FileMetadata::empty(1);
//! agg.add_to_builder(&mut builder, None, None, &mut meta, false)?;
//! assert_eq!(meta.smallest().unwrap().user_key(), b"b");
//! assert_eq!(meta.largest().unwrap().user_key(), b"e");
//! # Ok::<(), rangedel::Error>(())
//! ```

// Public modules
pub mod error;
pub mod options;
pub mod types;

// Collaborator seams
pub mod iterator;
pub mod table;
pub mod util;
pub mod version;

mod range_del;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use options::{RangeDelOptions, RangeDelOptionsBuilder};
pub use types::{
    InternalKey, ParsedInternalKey, RangeTombstone, SequenceNumber, ValueType,
    MAX_SEQUENCE_NUMBER,
};

// Aggregation
pub use range_del::RangeDelAggregator;

// Collaborators
pub use iterator::{InternalIterator, VecIterator};
pub use table::{TableBuilder, VecTableBuilder};
pub use util::{BytewiseComparator, Comparator, InternalKeyComparator, ReverseComparator};
pub use version::FileMetadata;
