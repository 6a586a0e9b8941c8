//! Key encoding and decoding for the profile column family.
//!
//! Key format: `community:{community_id:020}`, fixed-width decimal so
//! keys sort numerically for non-negative ids and parse back without
//! ambiguity. The column family holds exactly one key type.

use crate::error::StorageError;

/// Key for a community's profile record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileKey {
    /// Community id the profile belongs to
    pub community_id: i64,
}

impl ProfileKey {
    /// Create a key for the given community
    pub fn new(community_id: i64) -> Self {
        Self { community_id }
    }

    /// Encode key to bytes for storage
    pub fn to_bytes(&self) -> Vec<u8> {
        format!("community:{:020}", self.community_id).into_bytes()
    }

    /// Decode key from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StorageError> {
        let s = std::str::from_utf8(bytes)
            .map_err(|e| StorageError::Key(format!("Invalid UTF-8: {}", e)))?;

        let id_part = s
            .strip_prefix("community:")
            .ok_or_else(|| StorageError::Key(format!("Invalid profile key format: {}", s)))?;

        let community_id: i64 = id_part
            .parse()
            .map_err(|e| StorageError::Key(format!("Invalid community id: {}", e)))?;

        Ok(Self { community_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let key = ProfileKey::new(42);
        let decoded = ProfileKey::from_bytes(&key.to_bytes()).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn test_fixed_width_encoding() {
        let key = ProfileKey::new(7);
        assert_eq!(
            String::from_utf8(key.to_bytes()).unwrap(),
            "community:00000000000000000007"
        );
    }

    #[test]
    fn test_round_trip_negative_id() {
        let key = ProfileKey::new(-3);
        let decoded = ProfileKey::from_bytes(&key.to_bytes()).unwrap();
        assert_eq!(decoded.community_id, -3);
    }

    #[test]
    fn test_rejects_wrong_prefix() {
        assert!(ProfileKey::from_bytes(b"topic:0001").is_err());
    }

    #[test]
    fn test_rejects_non_numeric_id() {
        assert!(ProfileKey::from_bytes(b"community:abc").is_err());
    }
}
