//! Configuration loading for the topic guard.
//!
//! Layered precedence: built-in defaults -> config file
//! (~/.config/topic-guard/config.toml) -> TOPIC_* environment variables ->
//! CLI flags (applied by the caller after load).

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::TopicError;

/// Embedding model settings.
///
/// One model per deployment; the embedding dimension is fixed by the model
/// and must match across every stored profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    /// HuggingFace repository id of the sentence encoder
    #[serde(default = "default_model_repo")]
    pub repo_id: String,

    /// Directory holding downloaded model files
    #[serde(default = "default_model_cache_dir")]
    pub cache_dir: String,
}

fn default_model_repo() -> String {
    "intfloat/e5-base-v2".to_string()
}

fn default_model_cache_dir() -> String {
    ProjectDirs::from("", "", "topic-guard")
        .map(|p| p.cache_dir().join("models"))
        .unwrap_or_else(|| PathBuf::from("./models"))
        .to_string_lossy()
        .to_string()
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            repo_id: default_model_repo(),
            cache_dir: default_model_cache_dir(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the profile store directory
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Embedding model configuration
    #[serde(default)]
    pub model: ModelSettings,
}

fn default_db_path() -> String {
    ProjectDirs::from("", "", "topic-guard")
        .map(|p| p.data_local_dir().join("profiles"))
        .unwrap_or_else(|| PathBuf::from("./profiles"))
        .to_string_lossy()
        .to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            model: ModelSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/topic-guard/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (TOPIC_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, TopicError> {
        let config_dir = ProjectDirs::from("", "", "topic-guard")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("db_path", default_db_path())
            .map_err(|e| TopicError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| TopicError::Config(e.to_string()))?
            .set_default("model.repo_id", default_model_repo())
            .map_err(|e| TopicError::Config(e.to_string()))?
            .set_default("model.cache_dir", default_model_cache_dir())
            .map_err(|e| TopicError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Format: TOPIC_DB_PATH, TOPIC_LOG_LEVEL, TOPIC_MODEL_REPO_ID, etc.
        builder = builder.add_source(
            Environment::with_prefix("TOPIC")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| TopicError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| TopicError::Config(e.to_string()))
    }

    /// Expand ~ in db_path to the actual home directory
    pub fn expanded_db_path(&self) -> PathBuf {
        if self.db_path.starts_with("~/") {
            if let Some(home) = std::env::var("HOME").ok().map(PathBuf::from) {
                return home.join(&self.db_path[2..]);
            }
        }
        PathBuf::from(&self.db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.model.repo_id, "intfloat/e5-base-v2");
        assert!(!settings.db_path.is_empty());
    }

    #[test]
    fn test_load_with_defaults() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.model.repo_id, "intfloat/e5-base-v2");
    }

    #[test]
    fn test_expanded_db_path_plain() {
        let settings = Settings {
            db_path: "/var/lib/topic-guard/profiles".to_string(),
            ..Default::default()
        };
        assert_eq!(
            settings.expanded_db_path(),
            PathBuf::from("/var/lib/topic-guard/profiles")
        );
    }

    #[test]
    fn test_settings_serialization() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let decoded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.model.repo_id, settings.model.repo_id);
    }
}
