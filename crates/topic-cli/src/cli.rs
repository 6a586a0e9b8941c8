//! CLI argument parsing for the topic guard binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Topic Guard
///
/// Decides whether text belongs to a community's topic by comparing it
/// against a learned centroid of the community's prior posts.
#[derive(Parser, Debug)]
#[command(name = "topic-guard")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/topic-guard/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override profile store path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Guard commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Rebuild a community's profile from example texts
    Update {
        /// Community id to rebuild
        community_id: i64,

        /// File with one example text per line (stdin when omitted)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Check whether a text matches a community's topic
    Check {
        /// Community id to check against
        community_id: i64,

        /// Candidate text
        text: String,
    },

    /// List stored community profiles
    List,
}
