//! CLI command implementations

mod fonts;
mod paths;
mod renditions;
mod touch;

pub use fonts::{add_font, remove_font};
pub use paths::paths;
pub use renditions::renditions;
pub use touch::touch;

use anyhow::{Context, Result};
use folio_core::{FolioConfig, RenditionManager};
use std::path::Path;

/// Config from `--config`, else from `$FOLIO_CONFIG`, else the defaults
pub fn load_config(path: Option<&Path>) -> Result<FolioConfig> {
    match path {
        Some(path) => FolioConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => FolioConfig::from_env().context("Failed to load config from FOLIO_CONFIG"),
    }
}

/// Manager over `book` with rendition `index` loaded
fn open(book: &Path, config: FolioConfig, index: usize) -> Result<RenditionManager> {
    let mut manager = RenditionManager::with_config(book, config);
    manager
        .find_renditions()
        .with_context(|| format!("Failed to read container of {}", book.display()))?;
    manager
        .load_rendition(index)
        .with_context(|| format!("Failed to load rendition {}", index))?;
    Ok(manager)
}
