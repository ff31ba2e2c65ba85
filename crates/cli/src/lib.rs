mod complete;
mod shell;
mod stats;

use clap::{Parser, Subcommand};
use modelpeek_core::{config, logging, PeekConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "modelpeek",
    version,
    about = "Interactive query shell with context-aware completion for typed object models",
    long_about = "Modelpeek loads a model file and lets you select elements with a path-based \
                  query language (`Type, Attribute=value ; value.path`). Tab completion reads \
                  the model itself, so it only proposes types, attributes, property sets and \
                  values that actually occur."
)]
pub struct Cli {
    /// Also write log output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to config.json in the state directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive shell over a model
    #[command(
        long_about = "Starts an interactive shell. Enter a query to list matching elements; \
                      press Tab for completions. Lines starting with `/` are shell commands. \
                      When stdin is not a terminal, each input line is run as a query."
    )]
    Shell {
        /// Path to the model file (JSON)
        #[arg(value_name = "MODEL")]
        model: PathBuf,
    },
    /// Print the completion context and candidates for a partial query
    Complete {
        /// Path to the model file (JSON)
        #[arg(value_name = "MODEL")]
        model: PathBuf,
        /// Partial query text
        #[arg(value_name = "TEXT")]
        text: String,
        /// Cursor position in characters (defaults to the end of TEXT)
        #[arg(long)]
        cursor: Option<usize>,
    },
    /// Show completion index statistics for a model
    Stats {
        /// Path to the model file (JSON)
        #[arg(value_name = "MODEL")]
        model: PathBuf,
    },
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let component = match &cli.command {
        Commands::Shell { .. } => "shell",
        _ => "cli",
    };
    let log_guard = logging::init_logging(&config::log_dir(), component, cli.verbose);

    let config = match &cli.config {
        Some(path) => PeekConfig::load(path)?,
        None => PeekConfig::load_default()?,
    };

    match cli.command {
        Commands::Shell { model } => shell::run(model, &config, log_guard.control()),
        Commands::Complete {
            model,
            text,
            cursor,
        } => complete::run(model, &text, cursor, &config),
        Commands::Stats { model } => stats::run(model, &config),
    }
}
