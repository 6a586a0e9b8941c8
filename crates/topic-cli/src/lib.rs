//! Command line front end for the topic guard.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{run_check, run_list, run_update};
