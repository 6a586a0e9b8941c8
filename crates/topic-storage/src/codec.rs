//! Binary profile record format.
//!
//! Layout (all little-endian):
//!
//! ```text
//! byte 0     record format version
//! bytes 1..5 threshold, f32
//! bytes 5..  centroid, D x f32
//! ```
//!
//! Width and byte order are fixed: the decode path must reproduce the
//! exact floats that were written, or similarity scores after a restart
//! silently diverge from pre-restart scores. The version byte exists so
//! the layout can change if the dimensionality or precision ever does.

use topic_types::TopicProfile;

use crate::error::StorageError;

/// Current record format version
pub const RECORD_VERSION: u8 = 1;

/// Bytes preceding the centroid payload (version + threshold)
const HEADER_LEN: usize = 5;

/// Serialize a profile to its binary record.
pub fn encode_profile(profile: &TopicProfile) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + profile.centroid.len() * 4);
    buf.push(RECORD_VERSION);
    buf.extend_from_slice(&profile.threshold.to_le_bytes());
    for v in &profile.centroid {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf
}

/// Deserialize a profile from its binary record.
pub fn decode_profile(bytes: &[u8]) -> Result<TopicProfile, StorageError> {
    if bytes.len() < HEADER_LEN {
        return Err(StorageError::Record(format!(
            "Record too short: {} bytes",
            bytes.len()
        )));
    }

    let version = bytes[0];
    if version != RECORD_VERSION {
        return Err(StorageError::Record(format!(
            "Unknown record version: {}",
            version
        )));
    }

    let mut threshold_bytes = [0u8; 4];
    threshold_bytes.copy_from_slice(&bytes[1..HEADER_LEN]);
    let threshold = f32::from_le_bytes(threshold_bytes);

    let payload = &bytes[HEADER_LEN..];
    if payload.len() % 4 != 0 {
        return Err(StorageError::Record(format!(
            "Centroid payload not a whole number of f32s: {} bytes",
            payload.len()
        )));
    }

    let centroid: Vec<f32> = payload
        .chunks_exact(4)
        .map(|chunk| {
            let mut le = [0u8; 4];
            le.copy_from_slice(chunk);
            f32::from_le_bytes(le)
        })
        .collect();

    Ok(TopicProfile {
        centroid,
        threshold,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> TopicProfile {
        TopicProfile {
            centroid: vec![0.6, -0.8, 0.0, 1.0e-7],
            threshold: 0.7321,
        }
    }

    #[test]
    fn test_round_trip_bit_exact() {
        let profile = sample_profile();
        let decoded = decode_profile(&encode_profile(&profile)).unwrap();

        assert_eq!(
            decoded.threshold.to_bits(),
            profile.threshold.to_bits()
        );
        let original: Vec<u32> = profile.centroid.iter().map(|v| v.to_bits()).collect();
        let restored: Vec<u32> = decoded.centroid.iter().map(|v| v.to_bits()).collect();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_encoded_length() {
        let profile = sample_profile();
        assert_eq!(encode_profile(&profile).len(), 1 + 4 + 4 * 4);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut bytes = encode_profile(&sample_profile());
        bytes[0] = 99;
        assert!(matches!(
            decode_profile(&bytes),
            Err(StorageError::Record(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_record() {
        assert!(decode_profile(&[RECORD_VERSION, 0, 0]).is_err());
    }

    #[test]
    fn test_rejects_ragged_payload() {
        let mut bytes = encode_profile(&sample_profile());
        bytes.pop();
        assert!(matches!(
            decode_profile(&bytes),
            Err(StorageError::Record(_))
        ));
    }

    #[test]
    fn test_empty_centroid_round_trips() {
        let profile = TopicProfile {
            centroid: vec![],
            threshold: 0.5,
        };
        let decoded = decode_profile(&encode_profile(&profile)).unwrap();
        assert!(decoded.centroid.is_empty());
        assert_eq!(decoded.threshold, 0.5);
    }
}
