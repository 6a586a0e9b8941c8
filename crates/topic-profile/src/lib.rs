//! Profile building and in-memory caching for community topics.
//!
//! The builder turns a community's post embeddings into a (centroid,
//! threshold) profile; the cache is the runtime read path for scoring,
//! mirroring whatever the durable store holds.

pub mod builder;
pub mod cache;
pub mod error;

pub use builder::{build_profile, THRESHOLD_FLOOR};
pub use cache::ProfileCache;
pub use error::ProfileError;
