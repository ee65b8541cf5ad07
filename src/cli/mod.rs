//! CLI module for ragloom
//!
//! Provides command-line interface parsing for the ragloom binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ragloom - ask questions about your documents
#[derive(Parser, Debug)]
#[command(
    name = "ragloom",
    version,
    about = "Retrieval-augmented question answering over local documents",
    after_help = "EXAMPLES:\n    \
                  ragloom query \"What is tokio?\" --file notes.md\n    \
                  ragloom query \"Summarize\" --text \"...\" --model gpt-4 -k 3\n    \
                  ragloom presets"
)]
pub struct Cli {
    /// Path to the configuration file (optional)
    #[arg(short, long, default_value = "ragloom.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest the given sources and answer a question about them
    Query {
        /// The question to ask
        question: String,

        /// Inline text to ingest (repeatable)
        #[arg(long = "text", value_name = "TEXT")]
        texts: Vec<String>,

        /// UTF-8 file to ingest (repeatable)
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,

        /// Model preset (gpt-3.5-turbo, gpt-4)
        #[arg(short, long)]
        model: Option<String>,

        /// Sampling temperature
        #[arg(short, long)]
        temperature: Option<f32>,

        /// Number of context chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// List the available model presets
    Presets,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
