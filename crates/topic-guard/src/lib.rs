//! Topic guard facade.
//!
//! Orchestrates the embedding provider, profile builder, durable store and
//! in-memory cache behind four operations: `initialize`,
//! `update_community`, `check_topic`, `shutdown`.

pub mod error;
pub mod guard;

pub use error::GuardError;
pub use guard::TopicGuard;
pub use topic_types::{TopicCheck, TopicProfile};
