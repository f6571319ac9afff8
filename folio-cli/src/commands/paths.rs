//! Paths command implementation

use anyhow::{Context, Result};
use folio_core::FolioConfig;
use std::path::Path;

/// Print the spine documents and stylesheets of a rendition as full paths
pub fn paths(book: &Path, config: FolioConfig, rendition: usize, json: bool) -> Result<()> {
    let manager = super::open(book, config, rendition)?;
    let paths = manager
        .rendition_paths()
        .context("Failed to resolve rendition paths")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        println!("Spine:");
        for path in &paths.spine {
            println!("  {}", path.display());
        }
        println!("Stylesheets:");
        for path in &paths.stylesheets {
            println!("  {}", path.display());
        }
    }

    Ok(())
}
