//! Font commands implementation

use anyhow::{Context, Result};
use folio_core::{FolioConfig, FontEmbedder};
use std::path::Path;

/// Embed `file` into a rendition and save it
pub fn add_font(book: &Path, config: FolioConfig, rendition: usize, file: &Path) -> Result<()> {
    let mut manager = super::open(book, config, rendition)?;
    let embedded = FontEmbedder::new(&mut manager)
        .add_font(file)
        .with_context(|| format!("Failed to embed {}", file.display()))?;
    manager.save().context("Failed to save rendition")?;

    match embedded.item {
        Some(item) => println!("Added {} as '{}' ({})", item.href, item.id, embedded.path.display()),
        None => println!("Already in manifest: {}", embedded.path.display()),
    }
    Ok(())
}

/// Remove an embedded font from a rendition and save it
pub fn remove_font(book: &Path, config: FolioConfig, rendition: usize, file: &Path) -> Result<()> {
    let mut manager = super::open(book, config, rendition)?;
    let outcome = FontEmbedder::new(&mut manager)
        .remove_font(file)
        .with_context(|| format!("Failed to remove {}", file.display()))?;
    if !outcome.removed {
        anyhow::bail!("No single manifest item matches {}", file.display());
    }
    manager.save().context("Failed to save rendition")?;

    if outcome.file_deletable {
        println!("Removed and deleted {}", file.display());
    } else {
        println!("Removed {} (file kept: used by another rendition)", file.display());
    }
    Ok(())
}
