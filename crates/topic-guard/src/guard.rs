//! The topic guard: build, persist and score community topic profiles.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use topic_embeddings::{E5Embedder, EmbeddingModel, ModelCache};
use topic_profile::{build_profile, ProfileCache};
use topic_storage::ProfileStore;
use topic_types::{Settings, TopicCheck, TopicProfile};

use crate::error::GuardError;

/// Round a similarity score to 4 decimal digits for reporting.
fn round_score(score: f32) -> f32 {
    (score * 10_000.0).round() / 10_000.0
}

/// Resources held while the guard is in the Ready state.
struct GuardState {
    store: ProfileStore,
    cache: ProfileCache,
}

/// Facade over the topic-profile engine.
///
/// The embedding model is the expensive resource: it is constructed once,
/// handed to `new`, and survives every `initialize`/`shutdown` cycle.
/// Store and cache live only in the Ready state.
///
/// Lifecycle: Uninitialized --initialize--> Ready --shutdown-->
/// Uninitialized. `update_community` and `check_topic` are valid only in
/// Ready; `initialize` is re-entrant (Ready -> Ready reloads the cache
/// from the store, never the model).
pub struct TopicGuard {
    embedder: Arc<dyn EmbeddingModel>,
    state: RwLock<Option<GuardState>>,
}

impl TopicGuard {
    /// Create an uninitialized guard around an embedding model.
    pub fn new(embedder: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            embedder,
            state: RwLock::new(None),
        }
    }

    /// Load the configured Candle model and initialize against the
    /// configured store path.
    pub fn open(settings: &Settings) -> Result<Self, GuardError> {
        let cache = ModelCache::new(&settings.model.cache_dir, &settings.model.repo_id);
        let embedder = E5Embedder::load(&cache)
            .map_err(|e| GuardError::Initialization(format!("embedding model: {}", e)))?;

        let guard = Self::new(Arc::new(embedder));
        guard.initialize(&settings.expanded_db_path())?;
        Ok(guard)
    }

    /// Open (or create) the durable store at `db_path`, ensure its schema
    /// and load every persisted profile into a fresh cache.
    ///
    /// Re-entrant: calling again drops the previous store handle first,
    /// since RocksDB holds an exclusive file lock and the old handle must
    /// close before the path can reopen. If reopening fails the guard is
    /// left Uninitialized and the error is returned.
    pub fn initialize(&self, db_path: &Path) -> Result<(), GuardError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GuardError::Initialization(format!("store directory: {}", e)))?;
            }
        }

        let mut slot = self
            .state
            .write()
            .map_err(|e| GuardError::Lock(e.to_string()))?;
        *slot = None;

        let store = ProfileStore::open(db_path)
            .map_err(|e| GuardError::Initialization(format!("profile store: {}", e)))?;

        let rows = store.load_all()?;
        let count = rows.len();
        let cache = ProfileCache::new();
        cache.replace_all(rows);

        *slot = Some(GuardState { store, cache });
        info!(profiles = count, path = ?db_path, "Topic guard initialized");
        Ok(())
    }

    /// Rebuild a community's profile from its example texts.
    ///
    /// Empty `texts` is a valid no-op (a freshly created community has
    /// nothing yet): returns `Ok(false)` and touches neither store nor
    /// cache. Otherwise all texts are embedded in one batch, the profile
    /// is derived, written to the store and only then placed in the
    /// cache. A crash between the two leaves the cache stale until the
    /// next `initialize` repairs it from the store.
    ///
    /// # Panics
    /// Panics if called before `initialize` or after `shutdown`.
    pub fn update_community(
        &self,
        community_id: i64,
        texts: &[String],
    ) -> Result<bool, GuardError> {
        let slot = self
            .state
            .read()
            .map_err(|e| GuardError::Lock(e.to_string()))?;
        let state = slot
            .as_ref()
            .expect("TopicGuard::update_community called before initialize()");

        if texts.is_empty() {
            debug!(community_id, "No texts supplied, profile left unchanged");
            return Ok(false);
        }

        let embeddings = self.embedder.embed_texts(texts)?;
        let profile = build_profile(&embeddings)?;

        state.store.upsert(community_id, &profile)?;
        state.cache.put(community_id, profile);

        info!(
            community_id,
            examples = texts.len(),
            "Community profile rebuilt"
        );
        Ok(true)
    }

    /// Score a text against a community's topic.
    ///
    /// A community with no profile accepts everything: `{match: true,
    /// score: 1.0}`, without embedding the text at all. Otherwise the text
    /// is embedded once and compared to the cached centroid by dot
    /// product; the match decision uses the raw score, the reported score
    /// is rounded to 4 decimals.
    ///
    /// Deterministic: identical `(community_id, text)` pairs yield
    /// identical results until the profile is next updated.
    ///
    /// # Panics
    /// Panics if called before `initialize` or after `shutdown`.
    pub fn check_topic(&self, community_id: i64, text: &str) -> Result<TopicCheck, GuardError> {
        let slot = self
            .state
            .read()
            .map_err(|e| GuardError::Lock(e.to_string()))?;
        let state = slot
            .as_ref()
            .expect("TopicGuard::check_topic called before initialize()");

        let Some(profile) = state.cache.get(community_id) else {
            debug!(community_id, "No profile cached, allowing text");
            return Ok(TopicCheck {
                is_match: true,
                score: 1.0,
            });
        };

        let embedding = self.embedder.embed(text)?;
        let score = profile.score(&embedding.values);
        let is_match = score >= profile.threshold;

        debug!(
            community_id,
            score,
            threshold = profile.threshold,
            is_match,
            "Scored text against profile"
        );

        Ok(TopicCheck {
            is_match,
            score: round_score(score),
        })
    }

    /// Release the store connection and drop the cache.
    ///
    /// Idempotent; the embedding model is retained so a later
    /// `initialize` does not reload it. Returns `true`.
    pub fn shutdown(&self) -> bool {
        let mut slot = match self.state.write() {
            Ok(slot) => slot,
            Err(poisoned) => {
                warn!("State lock poisoned during shutdown");
                poisoned.into_inner()
            }
        };

        if let Some(state) = slot.take() {
            if let Err(e) = state.store.flush() {
                warn!("Failed to flush profile store on shutdown: {}", e);
            }
            info!("Topic guard shut down");
        }
        true
    }

    /// Whether the guard is in the Ready state.
    pub fn is_ready(&self) -> bool {
        self.state
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Read a community's cached profile, if any.
    ///
    /// # Panics
    /// Panics if called before `initialize` or after `shutdown`.
    pub fn cached_profile(&self, community_id: i64) -> Option<Arc<TopicProfile>> {
        let slot = self.state.read().expect("state lock poisoned");
        let state = slot
            .as_ref()
            .expect("TopicGuard::cached_profile called before initialize()");
        state.cache.get(community_id)
    }
}
