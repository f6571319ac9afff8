//! Copying font files into a rendition and registering them in its manifest

use crate::error::{FontError, PathError, Result};
use crate::paths::BookPath;
use crate::rendition::{AddedItem, ItemAttributes, RemoveOutcome, RenditionManager};
use std::path::{Path, PathBuf};

/// A font file placed inside the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFont {
    /// Location of the copy on disk
    pub path: PathBuf,

    /// The new manifest entry, or `None` if the manifest already listed the file
    pub item: Option<AddedItem>,
}

/// Font embedding workflow on the loaded rendition of a manager
pub struct FontEmbedder<'a> {
    manager: &'a mut RenditionManager,
}

impl<'a> FontEmbedder<'a> {
    pub fn new(manager: &'a mut RenditionManager) -> Self {
        Self { manager }
    }

    /// Copy `font_file` into the font folder and add it to the manifest
    ///
    /// The manifest id is `font_<file stem>`, made unique if needed.
    pub fn add_font(&mut self, font_file: &Path) -> Result<EmbeddedFont> {
        if !font_file.is_file() {
            return Err(FontError::NotAFile(font_file.to_path_buf()).into());
        }
        let (target, stem) = self.target_for(font_file)?;
        let dest = target.to_fs(self.manager.book_root());

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !is_same_file(font_file, &dest) {
            std::fs::copy(font_file, &dest)?;
            tracing::debug!("Copied {} to {}", font_file.display(), dest.display());
        }

        let attrs = ItemAttributes::new(
            format!("font_{stem}"),
            dest.clone(),
            self.manager.config().font_media_type.clone(),
        );
        let item = self.manager.add_item(&attrs)?;
        Ok(EmbeddedFont { path: dest, item })
    }

    /// Drop the manifest entry for `font_file` from the font folder
    ///
    /// The copy on disk is deleted only when no other rendition references it.
    pub fn remove_font(&mut self, font_file: &Path) -> Result<RemoveOutcome> {
        let (target, _) = self.target_for(font_file)?;
        let dest = target.to_fs(self.manager.book_root());

        let outcome = self.manager.remove_item(None, Some(&dest))?;
        if outcome.removed && outcome.file_deletable && dest.exists() {
            std::fs::remove_file(&dest)?;
            tracing::info!("Deleted {}", dest.display());
        } else if outcome.removed && !outcome.file_deletable {
            tracing::info!("Kept {}: still used by another rendition", dest.display());
        }
        Ok(outcome)
    }

    /// Book path of the font's copy, and the file stem used for its id
    fn target_for(&self, font_file: &Path) -> Result<(BookPath, String)> {
        let not_utf8 = || PathError::NotUtf8(font_file.to_path_buf());
        let file_name = font_file
            .file_name()
            .ok_or_else(|| FontError::NotAFile(font_file.to_path_buf()))?
            .to_str()
            .ok_or_else(not_utf8)?;
        let stem = font_file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(not_utf8)?;

        let target = self.manager.font_folder_path()?.join(file_name);
        Ok((target, stem.to_string()))
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
