//! RocksDB-backed profile store.

use rocksdb::{ColumnFamilyDescriptor, IteratorMode, Options, DB};
use std::path::Path;
use tracing::{debug, info, warn};

use topic_types::TopicProfile;

use crate::codec::{decode_profile, encode_profile};
use crate::error::StorageError;
use crate::keys::ProfileKey;

/// Column family holding profile records
pub const CF_PROFILES: &str = "profiles";

/// Durable store for community topic profiles.
///
/// One record per community id; an upsert replaces the whole record
/// atomically, so centroid and threshold can never be observed mismatched.
pub struct ProfileStore {
    db: DB,
}

impl ProfileStore {
    /// Open the store at the given path, creating the database and the
    /// profiles column family if missing. This is the idempotent
    /// ensure-schema step and is safe to run on every startup.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening profile store at {:?}", path);

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(CF_PROFILES, Options::default())];
        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        Ok(Self { db })
    }

    /// Load every stored profile. Used only at initialization to populate
    /// the in-memory cache.
    ///
    /// Rows that fail to decode are skipped with a warning rather than
    /// failing the whole load: one bad record must not take every
    /// community's guard offline. The next rebuild of that community
    /// replaces the record.
    pub fn load_all(&self) -> Result<Vec<(i64, TopicProfile)>, StorageError> {
        let cf = self
            .db
            .cf_handle(CF_PROFILES)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_PROFILES.to_string()))?;

        let mut profiles = Vec::new();
        for result in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (key_bytes, value_bytes) = result?;

            let key = match ProfileKey::from_bytes(&key_bytes) {
                Ok(key) => key,
                Err(e) => {
                    warn!("Skipping profile row with bad key: {}", e);
                    continue;
                }
            };

            match decode_profile(&value_bytes) {
                Ok(profile) => profiles.push((key.community_id, profile)),
                Err(e) => {
                    warn!(
                        community_id = key.community_id,
                        "Skipping undecodable profile record: {}", e
                    );
                }
            }
        }

        debug!(count = profiles.len(), "Loaded profiles");
        Ok(profiles)
    }

    /// Insert or replace the profile for a community.
    ///
    /// A single-key put is atomic in RocksDB: concurrent upserts to the
    /// same community serialize at the store and the last write wins.
    pub fn upsert(&self, community_id: i64, profile: &TopicProfile) -> Result<(), StorageError> {
        let cf = self
            .db
            .cf_handle(CF_PROFILES)
            .ok_or_else(|| StorageError::ColumnFamilyNotFound(CF_PROFILES.to_string()))?;

        let key = ProfileKey::new(community_id);
        self.db
            .put_cf(&cf, key.to_bytes(), encode_profile(profile))?;

        debug!(
            community_id,
            dim = profile.centroid.len(),
            threshold = profile.threshold,
            "Upserted profile"
        );
        Ok(())
    }

    /// Force memtables and WAL to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}
