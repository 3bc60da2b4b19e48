//! Bindery CLI - build EPUB files from JSON book descriptions

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Parse and validate the EPUB version argument (2 or 3)
fn parse_version(s: &str) -> Result<u8, String> {
    match s.parse::<u8>() {
        Ok(n @ (2 | 3)) => Ok(n),
        Ok(_) => Err("version must be 2 or 3".to_string()),
        Err(_) => Err(format!("'{}' is not a valid number", s)),
    }
}

#[derive(Parser)]
#[command(name = "bindery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output (a description's `"verbose": true` also enables it)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an EPUB from a book description
    Build {
        /// Book description (JSON with `options` and `chapters`)
        input: String,

        /// Output file path
        #[arg(short, long)]
        output: String,

        /// EPUB version (2 or 3), overrides the description
        #[arg(long, value_parser = parse_version)]
        epub_version: Option<u8>,

        /// Keep going when an asset cannot be fetched
        #[arg(long)]
        ignore_failed_downloads: bool,
    },

    /// Check a book description without fetching anything
    Check {
        /// Book description (JSON with `options` and `chapters`)
        input: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "bindery_cli=debug,bindery_core=debug"
    } else {
        "bindery_cli=info,bindery_core=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Build {
            input,
            output,
            epub_version,
            ignore_failed_downloads,
        } => {
            let overrides = commands::Overrides {
                version: epub_version,
                ignore_failed_downloads,
            };
            commands::build(&input, &output, overrides, cli.verbose).await
        }

        Commands::Check { input } => commands::check(&input),
    }
}
