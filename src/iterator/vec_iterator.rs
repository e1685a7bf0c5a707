//! In-memory internal iterator.

use bytes::Bytes;

use crate::types::RangeTombstone;
use crate::Result;

use super::InternalIterator;

/// An [`InternalIterator`] over entries held in a vector.
///
/// Entries are yielded in the order given; callers supply them sorted.
#[derive(Debug, Clone, Default)]
pub struct VecIterator {
    entries: Vec<(Bytes, Bytes)>,
    position: usize,
}

impl VecIterator {
    /// Create an iterator over raw `(encoded key, value)` entries.
    pub fn new(entries: Vec<(Bytes, Bytes)>) -> Self {
        Self {
            entries,
            position: 0,
        }
    }

    /// Create an iterator over the serialized form of range tombstones.
    pub fn from_tombstones<'a>(tombstones: impl IntoIterator<Item = &'a RangeTombstone>) -> Self {
        let entries = tombstones
            .into_iter()
            .map(|tombstone| {
                let (key, end_key) = tombstone.serialize();
                (key.encode(), end_key)
            })
            .collect();
        Self::new(entries)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl InternalIterator for VecIterator {
    fn valid(&self) -> bool {
        self.position < self.entries.len()
    }

    fn key(&self) -> Option<Bytes> {
        self.entries.get(self.position).map(|(k, _)| k.clone())
    }

    fn value(&self) -> Option<Bytes> {
        self.entries.get(self.position).map(|(_, v)| v.clone())
    }

    fn next(&mut self) -> Result<()> {
        if self.position < self.entries.len() {
            self.position += 1;
        }
        Ok(())
    }

    fn seek_to_first(&mut self) -> Result<()> {
        self.position = 0;
        Ok(())
    }
}
