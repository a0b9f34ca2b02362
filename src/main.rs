//! Codesplit CLI - split source files into their structural components

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "codesplit")]
#[command(version)]
#[command(about = "Grammar-driven source segmentation - split files into imports, types, functions and comments")]
#[command(long_about = r#"
Codesplit parses each file with its language grammar and lists or extracts
its structural components:
  • imports and includes
  • top-level declarations
  • type definitions and their methods
  • free functions
  • standalone comments

Example usage:
  codesplit list src/main.py
  codesplit list src/ --kinds function,method --json
  codesplit split lib/ --out parts/
"#)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to codesplit.toml (defaults to ./codesplit.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Language for every input, instead of inferring from extensions
    #[arg(short, long, global = true)]
    pub language: Option<String>,

    /// Component kinds to keep (comma separated)
    #[arg(short, long, global = true, value_delimiter = ',')]
    pub kinds: Vec<String>,

    /// Do not attach leading comments to components
    #[arg(long, global = true)]
    pub no_comments: bool,

    /// Blank lines allowed between a comment and its component
    #[arg(long, global = true)]
    pub max_blank_lines: Option<usize>,

    /// Worker threads (defaults to available parallelism)
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the components of each input file
    List {
        /// Files, directories or glob patterns
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Print component records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write each component to its own file
    Split {
        /// Files, directories or glob patterns
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        out: PathBuf,

        /// Write `<stem>_NNN-...` files directly under the output directory
        #[arg(long)]
        flat: bool,

        /// Overwrite existing output files
        #[arg(short, long)]
        force: bool,

        /// Leave attached comments out of the written components
        #[arg(long)]
        bare: bool,
    },

    /// Show the supported languages
    Languages,

    /// Write a default codesplit.toml
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let outcome = commands::run(&cli)?;
    if outcome.defects > 0 {
        tracing::error!("{} file(s) hit an internal invariant violation", outcome.defects);
        std::process::exit(2);
    }
    Ok(())
}
