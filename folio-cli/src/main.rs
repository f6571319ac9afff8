//! Folio CLI - inspect and edit the renditions of an unpacked EPUB

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file (defaults to $FOLIO_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of the unpacked book
    book_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the renditions declared by the container
    Renditions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the spine and stylesheet files of a rendition
    Paths {
        /// Rendition index (clamped to the available range)
        #[arg(short, long, default_value = "0")]
        rendition: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy a font file into the book and add it to the manifest
    AddFont {
        /// Font file path
        file: PathBuf,

        #[arg(short, long, default_value = "0")]
        rendition: usize,
    },

    /// Remove a font from the manifest, deleting it if no rendition uses it
    RemoveFont {
        /// Font file path (only the file name is used)
        file: PathBuf,

        #[arg(short, long, default_value = "0")]
        rendition: usize,
    },

    /// Stamp the modification time of a rendition and rewrite it
    Touch {
        #[arg(short, long, default_value = "0")]
        rendition: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "folio_cli=debug,folio_core=debug"
    } else {
        "folio_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let book = cli.book_dir.as_path();

    match cli.command {
        Commands::Renditions { json } => commands::renditions(book, config, json),

        Commands::Paths { rendition, json } => commands::paths(book, config, rendition, json),

        Commands::AddFont { file, rendition } => commands::add_font(book, config, rendition, &file),

        Commands::RemoveFont { file, rendition } => {
            commands::remove_font(book, config, rendition, &file)
        }

        Commands::Touch { rendition } => commands::touch(book, config, rendition),
    }
}
