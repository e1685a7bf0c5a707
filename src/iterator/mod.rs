//! Iterators that feed range tombstones into the aggregator.
//!
//! Memtables and SSTables expose their range deletions through the
//! [`InternalIterator`] trait: a forward cursor over `(internal key, value)`
//! pairs sorted by internal key. The aggregator positions the cursor once and
//! reads it to exhaustion.

mod vec_iterator;

pub use vec_iterator::VecIterator;

use bytes::Bytes;

use crate::Result;

/// A forward cursor over sorted `(internal key, value)` entries.
pub trait InternalIterator {
    /// Check if the iterator is positioned at an entry.
    fn valid(&self) -> bool;

    /// Get the current encoded internal key.
    fn key(&self) -> Option<Bytes>;

    /// Get the current value.
    fn value(&self) -> Option<Bytes>;

    /// Move to the next entry.
    fn next(&mut self) -> Result<()>;

    /// Seek to the first entry.
    fn seek_to_first(&mut self) -> Result<()>;
}

impl<I: InternalIterator + ?Sized> InternalIterator for Box<I> {
    fn valid(&self) -> bool {
        (**self).valid()
    }

    fn key(&self) -> Option<Bytes> {
        (**self).key()
    }

    fn value(&self) -> Option<Bytes> {
        (**self).value()
    }

    fn next(&mut self) -> Result<()> {
        (**self).next()
    }

    fn seek_to_first(&mut self) -> Result<()> {
        (**self).seek_to_first()
    }
}
