//! Durable persistence for community topic profiles.
//!
//! RocksDB-backed store with:
//! - A dedicated `profiles` column family created idempotently at open
//! - Full-scan load for cache initialization
//! - Atomic single-key upserts (one record per community, replace on write)
//! - A versioned fixed-precision binary record format, so similarity
//!   scores are bit-reproducible across restarts

pub mod codec;
pub mod error;
pub mod keys;
pub mod store;

pub use codec::{decode_profile, encode_profile, RECORD_VERSION};
pub use error::StorageError;
pub use keys::ProfileKey;
pub use store::{ProfileStore, CF_PROFILES};
