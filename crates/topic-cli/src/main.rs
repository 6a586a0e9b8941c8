//! Topic Guard CLI
//!
//! Builds, inspects and queries community topic profiles.
//!
//! # Usage
//!
//! ```bash
//! topic-guard update <COMMUNITY_ID> --file posts.txt
//! topic-guard check <COMMUNITY_ID> "some candidate text"
//! topic-guard list
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/topic-guard/config.toml)
//! 3. Environment variables (TOPIC_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use topic_cli::{run_check, run_list, run_update, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.clone() {
        Commands::Update { community_id, file } => run_update(&cli, community_id, file.as_deref()),
        Commands::Check { community_id, text } => run_check(&cli, community_id, &text),
        Commands::List => run_list(&cli),
    }
}
