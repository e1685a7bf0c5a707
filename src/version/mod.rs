//! Version bookkeeping shared with range deletion emission.
//!
//! Only [`FileMetadata`] is needed here: emission widens the key range of the
//! table being built so reads do not skip tombstones covering gaps between
//! adjacent tables.

mod file_metadata;

pub use file_metadata::FileMetadata;
