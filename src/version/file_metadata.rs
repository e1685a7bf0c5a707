//! File metadata for SSTable files.

use crate::types::InternalKey;

/// Metadata about an SSTable file.
///
/// Only the key boundaries are touched by range deletion emission; the
/// remaining fields belong to the table writer and version bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct FileMetadata {
    /// Unique file number.
    file_number: u64,
    /// File size in bytes.
    file_size: u64,
    /// Smallest key in the file, `None` until the first entry is added.
    smallest: Option<InternalKey>,
    /// Largest key in the file, `None` until the first entry is added.
    largest: Option<InternalKey>,
}

impl FileMetadata {
    /// Create new file metadata.
    pub fn new(
        file_number: u64,
        file_size: u64,
        smallest: InternalKey,
        largest: InternalKey,
    ) -> Self {
        Self {
            file_number,
            file_size,
            smallest: Some(smallest),
            largest: Some(largest),
        }
    }

    /// Create metadata for a table with no entries yet.
    pub fn empty(file_number: u64) -> Self {
        Self {
            file_number,
            ..Self::default()
        }
    }

    /// Get the file number.
    pub fn file_number(&self) -> u64 {
        self.file_number
    }

    /// Get the file size.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Get the smallest key.
    pub fn smallest(&self) -> Option<&InternalKey> {
        self.smallest.as_ref()
    }

    /// Get the largest key.
    pub fn largest(&self) -> Option<&InternalKey> {
        self.largest.as_ref()
    }

    /// Replace the smallest key.
    pub fn set_smallest(&mut self, key: InternalKey) {
        self.smallest = Some(key);
    }

    /// Replace the largest key.
    pub fn set_largest(&mut self, key: InternalKey) {
        self.largest = Some(key);
    }
}
