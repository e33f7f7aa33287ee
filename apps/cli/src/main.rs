//! Partials CLI - site tools for the fragment layout.
//!
//! Migrates static pages to the shared template, adds the mobile navigation
//! stylesheet, and assembles pages offline from their fragments.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{components, migrate, render, stylesheet};

/// Partials CLI - fragment layout tools for static sites
#[derive(Parser, Debug)]
#[command(name = "partials-cli", author, version, about = "Fragment layout tools for static sites")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Configuration file (replaces ~/.partials/config.toml and ./partials.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite the listed pages to use the page template
    ///
    /// Extracts the content between header and footer of each page, strips
    /// chrome now provided by fragments, merges it into the template and
    /// keeps a `.backup` copy of the original.
    Migrate,

    /// Add the mobile navigation stylesheet to every page
    AddMobileCss,

    /// Assemble a page from its fragments
    Render {
        /// Page file to assemble
        page: PathBuf,

        /// Location path used for navigation highlighting (defaults to /<page file name>)
        #[arg(long)]
        location: Option<String>,

        /// Write the result to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the component registry
    Components {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = config::load_config(args.config.as_deref())?;

    match args.command {
        Command::Migrate => migrate::execute(&config).await,
        Command::AddMobileCss => stylesheet::execute(&config).await,
        Command::Render { page, location, output } => {
            render::execute(&config, &page, location, output.as_deref()).await
        }
        Command::Components { json } => components::execute(&config, json),
    }
}
