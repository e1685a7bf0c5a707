//! Key comparison utilities.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::types::InternalKey;

/// Trait for comparing keys.
///
/// Implementations must define a total order over byte strings.
pub trait Comparator: Send + Sync {
    /// Compare two keys.
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering;

    /// Get the name of this comparator.
    fn name(&self) -> &str;
}

/// Default bytewise comparator (lexicographic ordering).
#[derive(Debug, Clone, Copy, Default)]
pub struct BytewiseComparator;

impl BytewiseComparator {
    /// Create a new bytewise comparator.
    pub fn new() -> Self {
        Self
    }
}

impl Comparator for BytewiseComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        a.cmp(b)
    }

    fn name(&self) -> &str {
        "leveldb.BytewiseComparator"
    }
}

/// Reverse comparator - inverts the ordering of another comparator.
#[derive(Debug, Clone)]
pub struct ReverseComparator<C: Comparator> {
    inner: C,
}

impl<C: Comparator> ReverseComparator<C> {
    /// Create a new reverse comparator.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: Comparator> Comparator for ReverseComparator<C> {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        self.inner.compare(b, a)
    }

    fn name(&self) -> &str {
        "reverse"
    }
}

/// Compare internal keys (user_key + sequence + type).
///
/// Internal keys are compared by:
/// 1. User key in ascending order, per the wrapped user comparator
/// 2. Sequence number in descending order (newer first)
/// 3. Type in descending order
#[derive(Clone)]
pub struct InternalKeyComparator {
    user_comparator: Arc<dyn Comparator>,
}

impl InternalKeyComparator {
    /// Create an internal key comparator over the given user comparator.
    pub fn new(user_comparator: Arc<dyn Comparator>) -> Self {
        Self { user_comparator }
    }

    /// Internal key comparator over bytewise user keys.
    pub fn bytewise() -> Self {
        Self::new(Arc::new(BytewiseComparator::new()))
    }

    /// Extract the user key from an encoded internal key.
    pub fn user_key<'a>(&self, internal_key: &'a [u8]) -> &'a [u8] {
        InternalKey::parse_user_key(internal_key).unwrap_or(internal_key)
    }

    /// Get the user comparator.
    pub fn user_comparator(&self) -> &dyn Comparator {
        self.user_comparator.as_ref()
    }

    /// Compare two user keys with the user comparator.
    pub fn compare_user_keys(&self, a: &[u8], b: &[u8]) -> Ordering {
        self.user_comparator.compare(a, b)
    }

    /// Compare two decoded internal keys.
    pub fn compare_keys(&self, a: &InternalKey, b: &InternalKey) -> Ordering {
        match self.user_comparator.compare(a.user_key(), b.user_key()) {
            Ordering::Equal => b.packed_trailer().cmp(&a.packed_trailer()),
            ord => ord,
        }
    }
}

impl Default for InternalKeyComparator {
    fn default() -> Self {
        Self::bytewise()
    }
}

impl fmt::Debug for InternalKeyComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalKeyComparator")
            .field("user_comparator", &self.user_comparator.name())
            .finish()
    }
}

impl Comparator for InternalKeyComparator {
    fn compare(&self, a: &[u8], b: &[u8]) -> Ordering {
        match self
            .user_comparator
            .compare(self.user_key(a), self.user_key(b))
        {
            Ordering::Equal => {
                match (
                    InternalKey::parse_packed_trailer(a),
                    InternalKey::parse_packed_trailer(b),
                ) {
                    // Descending order: larger sequence number comes first
                    (Some(num_a), Some(num_b)) => num_b.cmp(&num_a),
                    // Malformed keys, fall back to length comparison
                    _ => a.len().cmp(&b.len()),
                }
            }
            ord => ord,
        }
    }

    fn name(&self) -> &str {
        "leveldb.InternalKeyComparator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueType;

    #[test]
    fn test_bytewise_compare() {
        let cmp = BytewiseComparator::new();

        assert_eq!(cmp.compare(b"abc", b"abc"), Ordering::Equal);
        assert_eq!(cmp.compare(b"abc", b"abd"), Ordering::Less);
        assert_eq!(cmp.compare(b"abd", b"abc"), Ordering::Greater);
        assert_eq!(cmp.compare(b"ab", b"abc"), Ordering::Less);
        assert_eq!(cmp.compare(b"", b""), Ordering::Equal);
        assert_eq!(cmp.compare(b"", b"a"), Ordering::Less);
    }

    #[test]
    fn test_internal_key_comparator_encoded() {
        let cmp = InternalKeyComparator::bytewise();

        let make_key = |user_key: &'static [u8], seq: u64| {
            InternalKey::new(user_key, seq, ValueType::Value).encode()
        };

        // Same user key, different sequences
        let key1 = make_key(&b"user"[..], 100);
        let key2 = make_key(&b"user"[..], 200);
        assert_eq!(cmp.compare(&key2, &key1), Ordering::Less);
        assert_eq!(cmp.compare(&key1, &key2), Ordering::Greater);

        // Different user keys
        let key3 = make_key(&b"aaa"[..], 100);
        let key4 = make_key(&b"bbb"[..], 100);
        assert_eq!(cmp.compare(&key3, &key4), Ordering::Less);
    }

    #[test]
    fn test_compare_keys_uses_user_comparator() {
        let cmp = InternalKeyComparator::new(Arc::new(ReverseComparator::new(
            BytewiseComparator::new(),
        )));

        let a = InternalKey::for_value(&b"a"[..], 1);
        let b = InternalKey::for_value(&b"b"[..], 1);
        assert_eq!(cmp.compare_keys(&a, &b), Ordering::Greater);
        assert_eq!(cmp.compare_keys(&b, &a), Ordering::Less);

        // Sequence order is independent of the user comparator
        let newer = InternalKey::for_value(&b"a"[..], 9);
        assert_eq!(cmp.compare_keys(&newer, &a), Ordering::Less);
        assert_eq!(cmp.compare(&newer.encode(), &a.encode()), Ordering::Less);
    }

    #[test]
    fn test_compare_keys_type_tiebreak() {
        let cmp = InternalKeyComparator::default();
        let range_del = InternalKey::new(&b"k"[..], 5, ValueType::RangeDeletion);
        let value = InternalKey::new(&b"k"[..], 5, ValueType::Value);
        assert_eq!(cmp.compare_keys(&range_del, &value), Ordering::Less);
        assert_eq!(cmp.compare_keys(&value, &value), Ordering::Equal);
    }

    #[test]
    fn test_reverse_comparator() {
        let cmp = ReverseComparator::new(BytewiseComparator::new());

        assert_eq!(cmp.compare(b"abc", b"abd"), Ordering::Greater);
        assert_eq!(cmp.compare(b"abd", b"abc"), Ordering::Less);
        assert_eq!(cmp.compare(b"abc", b"abc"), Ordering::Equal);
    }

    #[test]
    fn test_debug_names_user_comparator() {
        let cmp = InternalKeyComparator::bytewise();
        assert!(format!("{:?}", cmp).contains("leveldb.BytewiseComparator"));
    }
}
