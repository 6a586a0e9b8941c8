//! In-memory profile cache.
//!
//! The single source of truth for scoring at runtime. Populated from the
//! durable store at initialization and written through on every profile
//! update (store write first, then cache). Unbounded: one small O(D)
//! entry per known community, communities number in the thousands.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use topic_types::TopicProfile;

/// Thread-safe map from community id to its cached profile.
///
/// Reads hand out cheap `Arc` clones; the write lock is held only for the
/// duration of a single insert or full swap, never across embedding work.
#[derive(Debug, Default)]
pub struct ProfileCache {
    entries: RwLock<HashMap<i64, Arc<TopicProfile>>>,
}

impl ProfileCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire cache contents. Called once per initialization.
    pub fn replace_all(&self, profiles: impl IntoIterator<Item = (i64, TopicProfile)>) {
        let fresh: HashMap<i64, Arc<TopicProfile>> = profiles
            .into_iter()
            .map(|(id, profile)| (id, Arc::new(profile)))
            .collect();
        let mut entries = self.entries.write().expect("profile cache lock poisoned");
        *entries = fresh;
    }

    /// Look up a community's profile. `None` means the community has no
    /// profile yet, a valid state distinct from any real profile.
    pub fn get(&self, community_id: i64) -> Option<Arc<TopicProfile>> {
        let entries = self.entries.read().expect("profile cache lock poisoned");
        entries.get(&community_id).cloned()
    }

    /// Insert or overwrite a single entry.
    pub fn put(&self, community_id: i64, profile: TopicProfile) {
        let mut entries = self.entries.write().expect("profile cache lock poisoned");
        entries.insert(community_id, Arc::new(profile));
    }

    /// Number of cached profiles.
    pub fn len(&self) -> usize {
        let entries = self.entries.read().expect("profile cache lock poisoned");
        entries.len()
    }

    /// Whether the cache holds no profiles.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All known community ids, sorted.
    pub fn community_ids(&self) -> Vec<i64> {
        let entries = self.entries.read().expect("profile cache lock poisoned");
        let mut ids: Vec<i64> = entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
