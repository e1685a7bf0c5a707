//! Table builder seam.
//!
//! Emission hands range tombstones to a [`TableBuilder`], the collaborator
//! that serializes ordered entries into an on-disk table. The on-disk format
//! itself lives outside this crate; [`VecTableBuilder`] collects entries in
//! memory.

mod vec_builder;

pub use vec_builder::VecTableBuilder;

use crate::Result;

/// Sink for ordered `(internal key, value)` entries of a table being built.
pub trait TableBuilder {
    /// Add an entry.
    ///
    /// Keys must be added in strictly ascending internal key order.
    fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Number of entries added so far.
    fn num_entries(&self) -> u64;
}

impl<B: TableBuilder + ?Sized> TableBuilder for &mut B {
    fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        (**self).add(key, value)
    }

    fn num_entries(&self) -> u64 {
        (**self).num_entries()
    }
}
