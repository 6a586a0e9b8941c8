//! Command implementations for the topic guard CLI.
//!
//! `update` and `check` load the embedding model and go through the
//! facade; `list` is read-only and opens the store directly, so it never
//! pays the model-load cost.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use topic_guard::TopicGuard;
use topic_storage::ProfileStore;
use topic_types::Settings;

use crate::cli::Cli;

/// Load settings and apply CLI overrides (highest precedence).
fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    if let Some(db_path) = &cli.db_path {
        settings.db_path = db_path.clone();
    }
    Ok(settings)
}

/// Initialize logging from settings, honoring RUST_LOG when set.
fn init_tracing(settings: &Settings) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Read example texts from a file (one per line) or stdin.
fn read_texts(file: Option<&Path>) -> Result<Vec<String>> {
    let texts: Vec<String> = match file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            content.lines().map(str::to_string).collect()
        }
        None => {
            let stdin = std::io::stdin();
            stdin
                .lock()
                .lines()
                .collect::<std::io::Result<Vec<String>>>()
                .context("Failed to read stdin")?
        }
    };

    Ok(texts
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

/// Rebuild a community's profile from example texts.
pub fn run_update(cli: &Cli, community_id: i64, file: Option<&Path>) -> Result<()> {
    let settings = load_settings(cli)?;
    init_tracing(&settings)?;

    let texts = read_texts(file)?;
    info!(community_id, texts = texts.len(), "Updating community profile");

    let guard = TopicGuard::open(&settings).context("Failed to start topic guard")?;
    let updated = guard
        .update_community(community_id, &texts)
        .with_context(|| format!("Failed to update community {}", community_id))?;
    guard.shutdown();

    if updated {
        println!(
            "Rebuilt profile for community {} from {} texts",
            community_id,
            texts.len()
        );
    } else {
        println!("No texts supplied; community {} left unchanged", community_id);
    }
    Ok(())
}

/// Check a text against a community's topic; prints the JSON response.
pub fn run_check(cli: &Cli, community_id: i64, text: &str) -> Result<()> {
    let settings = load_settings(cli)?;
    init_tracing(&settings)?;

    let guard = TopicGuard::open(&settings).context("Failed to start topic guard")?;
    let result = guard
        .check_topic(community_id, text)
        .with_context(|| format!("Failed to check topic for community {}", community_id))?;
    guard.shutdown();

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}

/// List stored profiles without loading the embedding model.
pub fn run_list(cli: &Cli) -> Result<()> {
    let settings = load_settings(cli)?;
    init_tracing(&settings)?;

    let store = ProfileStore::open(&settings.expanded_db_path())
        .context("Failed to open profile store")?;
    let mut rows = store.load_all().context("Failed to load profiles")?;
    rows.sort_by_key(|(id, _)| *id);

    if rows.is_empty() {
        println!("No community profiles stored");
        return Ok(());
    }

    println!("{:>12}  {:>9}  {:>5}", "community", "threshold", "dim");
    for (community_id, profile) in rows {
        println!(
            "{:>12}  {:>9.4}  {:>5}",
            community_id,
            profile.threshold,
            profile.dimension()
        );
    }
    Ok(())
}
