//! WordWeb CLI - Command-line interface for WordWeb
//!
//! Loads a word, walks its neighbourhood and prints the resulting graph,
//! runs an interactive explorer, manages persisted settings and serves a
//! session to a UI over WebSocket.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod repl;

#[derive(Parser)]
#[command(name = "wordweb")]
#[command(author = "WordWeb Contributors")]
#[command(version)]
#[command(about = "Explore how words relate, one center at a time", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Dictionary export to read words from instead of the built-in table
    #[arg(long, global = true, value_name = "FILE")]
    dictionary: Option<PathBuf>,

    /// Directory holding persisted settings
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a word, optionally expand through more, and print the graph
    Show {
        /// Word to center on
        word: String,

        /// Words to expand to after loading, in order
        #[arg(short, long)]
        expand: Vec<String>,

        /// Output the session as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive explorer
    Explore {
        /// Word to start from (defaults to the reset word)
        word: Option<String>,
    },

    /// Show or change persisted settings
    Settings {
        /// Node ceiling (50-500)
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Related words per expansion (5-50)
        #[arg(long)]
        max_related: Option<usize>,

        /// Renderer physics: on or off
        #[arg(long, value_parser = parse_switch)]
        physics: Option<bool>,

        /// Forget stored settings and go back to defaults
        #[arg(long)]
        reset: bool,
    },

    /// Start the WordWeb server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "7540")]
        port: u16,

        /// Headless mode: bind to 0.0.0.0 for remote access
        #[arg(long)]
        headless: bool,

        /// Word to load before accepting connections
        #[arg(long)]
        word: Option<String>,
    },
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(format!("expected on or off, got {:?}", other)),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let ctx = commands::Context::new(cli.dictionary, cli.data_dir);

    let result = match cli.command {
        Commands::Show { word, expand, json } => commands::show(&ctx, &word, &expand, json).await,
        Commands::Explore { word } => repl::explore(&ctx, word.as_deref()).await,
        Commands::Settings {
            max_nodes,
            max_related,
            physics,
            reset,
        } => commands::settings(&ctx, max_nodes, max_related, physics, reset),
        Commands::Serve {
            port,
            headless,
            word,
        } => commands::serve(&ctx, port, headless, word.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
