//! Command line interface for the newswire console binary.
//!
//! Provides a tiny CLI to pick the update source and drive man page
//! generation.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `newswire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "newswire",
    version,
    about = "Reassemble and decode fragmented news stories from JSON-lines updates"
)]
pub struct Cli {
    /// Read update messages from a file instead of standard input.
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}
