//! CLI module
//!
//! Command-line interface for paging through a configured HTTP source.
//!
//! # Commands
//!
//! - `page <N>` - Fetch page N and print items with navigation
//! - `inspect` - Show cached checkpoints and counts
//! - `clear` - Drop cached state for the configured query

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
