//! Touch command implementation

use anyhow::{Context, Result};
use folio_core::FolioConfig;
use std::path::Path;

/// Rewrite a rendition's package document, stamping its modification time
pub fn touch(book: &Path, config: FolioConfig, rendition: usize) -> Result<()> {
    let mut manager = super::open(book, config, rendition)?;
    manager.save().context("Failed to save rendition")?;

    let package = manager.loaded()?.package().to_fs(manager.book_root());
    println!("Saved {}", package.display());
    Ok(())
}
