//! Shared utilities.

mod comparator;

pub use comparator::{BytewiseComparator, Comparator, InternalKeyComparator, ReverseComparator};
