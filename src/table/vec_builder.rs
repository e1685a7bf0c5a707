//! In-memory table builder.

use std::cmp::Ordering;

use bytes::Bytes;

use crate::util::{Comparator, InternalKeyComparator};
use crate::{Error, Result};

use super::TableBuilder;

/// A [`TableBuilder`] that keeps every entry in memory.
///
/// Enforces the ordering contract of real table writers: each key must sort
/// strictly after the previous one under the internal key comparator.
#[derive(Debug, Clone, Default)]
pub struct VecTableBuilder {
    icmp: InternalKeyComparator,
    entries: Vec<(Bytes, Bytes)>,
}

impl VecTableBuilder {
    /// Create a builder ordered by the given comparator.
    pub fn new(icmp: InternalKeyComparator) -> Self {
        Self {
            icmp,
            entries: Vec::new(),
        }
    }

    /// Entries added so far.
    pub fn entries(&self) -> &[(Bytes, Bytes)] {
        &self.entries
    }

    /// Consume the builder, returning its entries.
    pub fn into_entries(self) -> Vec<(Bytes, Bytes)> {
        self.entries
    }
}

impl TableBuilder for VecTableBuilder {
    fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if let Some((last, _)) = self.entries.last() {
            if self.icmp.compare(last, key) != Ordering::Less {
                return Err(Error::invalid_argument(
                    "keys must be added in strictly ascending order",
                ));
            }
        }

        self.entries
            .push((Bytes::copy_from_slice(key), Bytes::copy_from_slice(value)));
        Ok(())
    }

    fn num_entries(&self) -> u64 {
        self.entries.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InternalKey;

    #[test]
    fn test_builder_accepts_sorted_keys() {
        let mut builder = VecTableBuilder::default();
        let a = InternalKey::for_range_deletion(&b"a"[..], 5).encode();
        let a_older = InternalKey::for_range_deletion(&b"a"[..], 3).encode();
        let b = InternalKey::for_range_deletion(&b"b"[..], 9).encode();

        builder.add(&a, b"c").unwrap();
        builder.add(&a_older, b"d").unwrap();
        builder.add(&b, b"e").unwrap();

        assert_eq!(builder.num_entries(), 3);
        assert_eq!(builder.entries()[1].1.as_ref(), b"d");
    }

    #[test]
    fn test_builder_rejects_out_of_order() {
        let mut builder = VecTableBuilder::default();
        let b = InternalKey::for_range_deletion(&b"b"[..], 1).encode();
        let a = InternalKey::for_range_deletion(&b"a"[..], 1).encode();

        builder.add(&b, b"c").unwrap();
        assert!(matches!(
            builder.add(&a, b"c"),
            Err(Error::InvalidArgument(_))
        ));
        // Duplicate keys are rejected too
        assert!(builder.add(&b, b"c").is_err());
        assert_eq!(builder.into_entries().len(), 1);
    }
}
