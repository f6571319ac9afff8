//! Renditions command implementation

use anyhow::{Context, Result};
use folio_core::{FolioConfig, RenditionManager};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct RenditionInfo {
    index: usize,
    package: String,
}

/// List the package documents declared by the container
pub fn renditions(book: &Path, config: FolioConfig, json: bool) -> Result<()> {
    let mut manager = RenditionManager::with_config(book, config);
    let opf_files = manager
        .find_renditions()
        .with_context(|| format!("Failed to read container of {}", book.display()))?;

    let list: Vec<RenditionInfo> = opf_files
        .iter()
        .enumerate()
        .map(|(index, package)| RenditionInfo {
            index,
            package: package.to_string(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        for info in &list {
            println!("{:>3}  {}", info.index, info.package);
        }
    }

    Ok(())
}
