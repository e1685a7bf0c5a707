//! Pinned storage for tombstone key material.
//!
//! Tombstone boundaries are stored as [`PinnedSlice`] handles into buffers the
//! arena owns, so ingestion never copies key bytes. Buffers are `Bytes`, which
//! share the source's allocation; the arena holds one reference per pinned
//! buffer and drops all of them together with the aggregator.

use std::ops::Range;

use bytes::Bytes;

/// Identifies a buffer pinned in a [`PinnedArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PinId(usize);

/// A byte range inside a pinned buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PinnedSlice {
    pin: usize,
    start: usize,
    end: usize,
}

impl PinnedSlice {
    /// Length of the referenced range.
    pub(crate) fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Owns every buffer backing ingested tombstones.
#[derive(Debug, Default)]
pub(crate) struct PinnedArena {
    pins: Vec<Bytes>,
    pinned_bytes: usize,
}

impl PinnedArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Take a reference to `buf` for the lifetime of the arena.
    pub(crate) fn pin(&mut self, buf: Bytes) -> PinId {
        self.pinned_bytes += buf.len();
        self.pins.push(buf);
        PinId(self.pins.len() - 1)
    }

    /// Handle to `range` within a pinned buffer.
    pub(crate) fn slice(&self, id: PinId, range: Range<usize>) -> PinnedSlice {
        debug_assert!(range.start <= range.end && range.end <= self.pins[id.0].len());
        PinnedSlice {
            pin: id.0,
            start: range.start,
            end: range.end,
        }
    }

    /// Handle covering an entire pinned buffer.
    pub(crate) fn whole(&self, id: PinId) -> PinnedSlice {
        self.slice(id, 0..self.pins[id.0].len())
    }

    /// Resolve a handle to its bytes.
    pub(crate) fn get(&self, slice: PinnedSlice) -> &[u8] {
        &self.pins[slice.pin][slice.start..slice.end]
    }

    /// Resolve a handle to a `Bytes` view sharing the pinned allocation.
    pub(crate) fn get_bytes(&self, slice: PinnedSlice) -> Bytes {
        self.pins[slice.pin].slice(slice.start..slice.end)
    }

    /// Number of pinned buffers.
    pub(crate) fn len(&self) -> usize {
        self.pins.len()
    }

    /// Total size of the pinned buffers.
    pub(crate) fn pinned_bytes(&self) -> usize {
        self.pinned_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_and_resolve() {
        let mut arena = PinnedArena::new();
        let key = arena.pin(Bytes::from_static(b"hello world"));
        let value = arena.pin(Bytes::from_static(b"end"));

        let hello = arena.slice(key, 0..5);
        assert_eq!(arena.get(hello), b"hello");
        assert_eq!(hello.len(), 5);
        assert_eq!(arena.get(arena.whole(value)), b"end");

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.pinned_bytes(), 14);
    }

    #[test]
    fn test_pinned_bytes_share_allocation() {
        let source = Bytes::from(b"abcdefgh".to_vec());
        let mut arena = PinnedArena::new();
        let id = arena.pin(source.clone());

        let view = arena.get_bytes(arena.slice(id, 2..4));
        assert_eq!(view.as_ref(), b"cd");
        assert_eq!(view.as_ptr(), source[2..].as_ptr());
    }

    #[test]
    fn test_pins_outlive_source() {
        let mut arena = PinnedArena::new();
        let id = {
            let source = Bytes::from(vec![b'x'; 32]);
            arena.pin(source)
        };
        // The source handle is gone; the arena keeps the buffer alive
        assert_eq!(arena.get(arena.slice(id, 0..3)), b"xxx");
    }
}
