//! Core types for rangedel.

use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Sequence number assigned to every write.
pub type SequenceNumber = u64;

/// Maximum sequence number (56 bits).
pub const MAX_SEQUENCE_NUMBER: SequenceNumber = (1 << 56) - 1;

/// Size of the packed `(sequence, type)` trailer of an encoded internal key.
pub const INTERNAL_KEY_TRAILER_SIZE: usize = 8;

/// Value type indicator in internal keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ValueType {
    /// Normal value.
    Value = 1,
    /// Point deletion marker.
    Deletion = 2,
    /// Range deletion: the value carries the exclusive end key.
    RangeDeletion = 3,
}

impl ValueType {
    /// Create from byte.
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(ValueType::Value),
            2 => Some(ValueType::Deletion),
            3 => Some(ValueType::RangeDeletion),
            _ => None,
        }
    }

    /// Convert to byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Check if this is a range deletion marker.
    pub fn is_range_deletion(&self) -> bool {
        matches!(self, ValueType::RangeDeletion)
    }
}

fn pack_sequence_and_type(sequence: SequenceNumber, value_type: ValueType) -> u64 {
    (sequence << 8) | (value_type.to_byte() as u64)
}

/// Internal key format used for storage.
///
/// An internal key combines:
/// - User key (the key provided by the user)
/// - Sequence number (version for MVCC)
/// - Value type (Value, Deletion or RangeDeletion)
///
/// Encoded format:
/// ```text
/// [user_key][sequence (7 bytes)][value_type (1 byte)]
/// ```
///
/// The sequence and value_type are packed into 8 big-endian bytes with
/// sequence in the high 56 bits and value_type in the low 8 bits.
///
/// Ordering is defined by
/// [`InternalKeyComparator::compare_keys`](crate::util::InternalKeyComparator::compare_keys),
/// which honors the user comparator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalKey {
    /// The user-provided key.
    user_key: Bytes,
    /// Sequence number (version).
    sequence: SequenceNumber,
    /// Value type.
    value_type: ValueType,
}

impl InternalKey {
    /// Create a new internal key.
    pub fn new(user_key: impl Into<Bytes>, sequence: SequenceNumber, value_type: ValueType) -> Self {
        debug_assert!(sequence <= MAX_SEQUENCE_NUMBER);
        Self {
            user_key: user_key.into(),
            sequence,
            value_type,
        }
    }

    /// Create an internal key for a put operation.
    pub fn for_value(user_key: impl Into<Bytes>, sequence: SequenceNumber) -> Self {
        Self::new(user_key, sequence, ValueType::Value)
    }

    /// Create an internal key for a range deletion start boundary.
    pub fn for_range_deletion(user_key: impl Into<Bytes>, sequence: SequenceNumber) -> Self {
        Self::new(user_key, sequence, ValueType::RangeDeletion)
    }

    /// Get the user key.
    pub fn user_key(&self) -> &[u8] {
        &self.user_key
    }

    /// Get the sequence number.
    pub fn sequence(&self) -> SequenceNumber {
        self.sequence
    }

    /// Get the value type.
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Packed `(sequence << 8) | type` trailer.
    pub fn packed_trailer(&self) -> u64 {
        pack_sequence_and_type(self.sequence, self.value_type)
    }

    /// Borrow this key as a parsed view.
    pub fn as_parsed(&self) -> ParsedInternalKey<'_> {
        ParsedInternalKey {
            user_key: &self.user_key,
            sequence: self.sequence,
            value_type: self.value_type,
        }
    }

    /// Encode the internal key to bytes.
    ///
    /// Format: [user_key][packed_sequence_type (8 bytes)]
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode_to(&mut buf);
        buf.freeze()
    }

    /// Encode into an existing buffer.
    pub fn encode_to(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.user_key);
        buf.put_u64(self.packed_trailer());
    }

    /// Decode an internal key from bytes.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let parsed = ParsedInternalKey::parse(data)?;
        Some(Self {
            user_key: Bytes::copy_from_slice(parsed.user_key),
            sequence: parsed.sequence,
            value_type: parsed.value_type,
        })
    }

    /// Get the encoded length.
    pub fn encoded_len(&self) -> usize {
        self.user_key.len() + INTERNAL_KEY_TRAILER_SIZE
    }

    /// Parse the user key from encoded bytes without full decode.
    pub fn parse_user_key(encoded: &[u8]) -> Option<&[u8]> {
        if encoded.len() < INTERNAL_KEY_TRAILER_SIZE {
            return None;
        }
        Some(&encoded[..encoded.len() - INTERNAL_KEY_TRAILER_SIZE])
    }

    /// Parse the packed trailer from encoded bytes.
    pub fn parse_packed_trailer(encoded: &[u8]) -> Option<u64> {
        if encoded.len() < INTERNAL_KEY_TRAILER_SIZE {
            return None;
        }
        let mut trailer = &encoded[encoded.len() - INTERNAL_KEY_TRAILER_SIZE..];
        Some(trailer.get_u64())
    }
}

/// Borrowed view of an encoded internal key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedInternalKey<'a> {
    /// The user key portion.
    pub user_key: &'a [u8],
    /// Sequence number.
    pub sequence: SequenceNumber,
    /// Value type.
    pub value_type: ValueType,
}

impl<'a> ParsedInternalKey<'a> {
    /// Split an encoded internal key into its parts.
    ///
    /// Returns `None` if the key is shorter than the trailer or carries an
    /// unknown value type.
    pub fn parse(encoded: &'a [u8]) -> Option<Self> {
        let user_key = InternalKey::parse_user_key(encoded)?;
        let packed = InternalKey::parse_packed_trailer(encoded)?;
        let value_type = ValueType::from_byte((packed & 0xFF) as u8)?;
        Some(Self {
            user_key,
            sequence: packed >> 8,
            value_type,
        })
    }

}

/// A range deletion: user keys in `[start_key, end_key)` are deleted as of
/// `sequence`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTombstone {
    /// Inclusive start user key.
    pub start_key: Bytes,
    /// Exclusive end user key.
    pub end_key: Bytes,
    /// Sequence number of the deletion.
    pub sequence: SequenceNumber,
}

impl RangeTombstone {
    /// Create a new range tombstone.
    pub fn new(
        start_key: impl Into<Bytes>,
        end_key: impl Into<Bytes>,
        sequence: SequenceNumber,
    ) -> Self {
        Self {
            start_key: start_key.into(),
            end_key: end_key.into(),
            sequence,
        }
    }

    /// The record key and value this tombstone is stored as.
    pub fn serialize(&self) -> (InternalKey, Bytes) {
        (
            InternalKey::for_range_deletion(self.start_key.clone(), self.sequence),
            self.end_key.clone(),
        )
    }

    /// Internal key for the end boundary.
    ///
    /// Uses the maximum sequence number so the key sorts before every real
    /// entry for `end_key`, which the tombstone does not cover.
    pub fn serialize_end_key(&self) -> InternalKey {
        InternalKey::for_range_deletion(self.end_key.clone(), MAX_SEQUENCE_NUMBER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type() {
        assert_eq!(ValueType::from_byte(1), Some(ValueType::Value));
        assert_eq!(ValueType::from_byte(2), Some(ValueType::Deletion));
        assert_eq!(ValueType::from_byte(3), Some(ValueType::RangeDeletion));
        assert_eq!(ValueType::from_byte(0), None);
        assert!(ValueType::RangeDeletion.is_range_deletion());
        assert!(!ValueType::Value.is_range_deletion());
    }

    #[test]
    fn test_internal_key_encode_decode() {
        let key = InternalKey::new(Bytes::from("hello"), 12345, ValueType::RangeDeletion);
        let encoded = key.encode();
        assert_eq!(encoded.len(), key.encoded_len());

        let decoded = InternalKey::decode(&encoded).unwrap();
        assert_eq!(key, decoded);
        assert_eq!(InternalKey::parse_packed_trailer(&encoded), Some((12345 << 8) | 3));
        assert_eq!(InternalKey::parse_user_key(&encoded), Some(&b"hello"[..]));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(ParsedInternalKey::parse(b"short").is_none());

        let mut bad_type = b"key".to_vec();
        bad_type.extend_from_slice(&((7u64 << 8) | 0x7F).to_be_bytes());
        assert!(ParsedInternalKey::parse(&bad_type).is_none());
    }

    #[test]
    fn test_parse_empty_user_key() {
        let key = InternalKey::for_range_deletion(Bytes::new(), 9);
        let encoded = key.encode();
        let parsed = ParsedInternalKey::parse(&encoded).unwrap();
        assert!(parsed.user_key.is_empty());
        assert_eq!(parsed.sequence, 9);
        assert_eq!(InternalKey::decode(&encoded), Some(key));
    }

    #[test]
    fn test_range_tombstone_serialize() {
        let tombstone = RangeTombstone::new(&b"b"[..], &b"e"[..], 5);
        let (start, end) = tombstone.serialize();
        assert_eq!(start.user_key(), b"b");
        assert_eq!(start.sequence(), 5);
        assert_eq!(start.value_type(), ValueType::RangeDeletion);
        assert_eq!(end.as_ref(), b"e");

        let end_key = tombstone.serialize_end_key();
        assert_eq!(end_key.user_key(), b"e");
        assert_eq!(end_key.sequence(), MAX_SEQUENCE_NUMBER);

        let parsed = start.as_parsed();
        assert_eq!(parsed.user_key, b"b");
        assert!(parsed.value_type.is_range_deletion());
    }
}
