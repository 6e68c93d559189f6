//! Console reader that feeds update messages through the story pipeline.
//!
//! Reads one JSON update message per line, extracts its field map, and
//! prints every fully decoded story to stdout. Transport concerns (opening
//! a session, subscribing to a stream) live outside this binary; pipe the
//! session's update events in as JSON lines.

mod cli;

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
};

use clap::Parser;
use newswire::{StoryPipeline, UpdateMessage};

fn main() -> io::Result<()> {
    // Enable structured logging for the console reader. Applications
    // embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let mut pipeline = StoryPipeline::default();
    match cli.input {
        Some(path) => run(BufReader::new(File::open(path)?), &mut pipeline),
        None => run(io::stdin().lock(), &mut pipeline),
    }
}

fn run(reader: impl BufRead, pipeline: &mut StoryPipeline) -> io::Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let message: UpdateMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(err) => {
                log::warn!("skipping unparsable update message: {err}");
                continue;
            }
        };
        match pipeline.on_update(&message.fields) {
            Ok(Some(story)) => println!("{story:#}"),
            Ok(None) => {}
            Err(err) => log::warn!("{err}"),
        }
    }

    for guid in pipeline.purge_expired() {
        log::warn!("story {guid} never completed");
    }
    Ok(())
}
