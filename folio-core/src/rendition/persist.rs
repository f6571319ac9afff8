//! Writing the live package tree back to disk

use super::RenditionManager;
use crate::error::{PackageError, Result};
use crate::manifest::is_opf;
use crate::xml::{Document, Element};
use chrono::{DateTime, Utc};

/// `<meta property>` value carrying the last-modified timestamp
pub const MODIFIED_PROPERTY: &str = "dcterms:modified";

/// Set the package's `dcterms:modified` meta to `now`, creating it if needed
pub fn stamp_modified(package: &mut Document, now: DateTime<Utc>) -> std::result::Result<(), PackageError> {
    let stamp = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let metadata = package
        .root_mut()
        .child_mut(|el| is_opf(el, "metadata"))
        .ok_or(PackageError::MissingElement("metadata"))?;

    let is_modified = |el: &Element| is_opf(el, "meta") && el.attr("property") == Some(MODIFIED_PROPERTY);
    if let Some(meta) = metadata.elements_mut().find(|el| is_modified(el)) {
        meta.set_text(&stamp);
        return Ok(());
    }

    let name = match metadata.prefix() {
        Some(prefix) => format!("{prefix}:meta"),
        None => "meta".to_string(),
    };
    let namespace = metadata.namespace().map(str::to_string);
    let mut meta = Element::new(name, namespace.as_deref()).with_attr("property", MODIFIED_PROPERTY);
    meta.set_text(&stamp);
    metadata.append_element(meta);
    Ok(())
}

impl RenditionManager {
    /// Write the loaded rendition's package document back to its file
    ///
    /// Does nothing when no rendition is loaded.
    pub fn save(&mut self) -> Result<()> {
        let Ok(rendition) = self.state.rendition_mut() else {
            return Ok(());
        };

        if self.config.stamp_modified {
            stamp_modified(&mut rendition.document, Utc::now())?;
        }

        let path = rendition.package.to_fs(&self.book_root);
        let bytes = rendition.document.to_bytes()?;

        // Same directory so the rename stays on one filesystem
        let temp_path = path.with_extension("opf.tmp");
        std::fs::write(&temp_path, &bytes)?;
        std::fs::rename(&temp_path, &path)?;

        tracing::info!("Saved {} ({} bytes)", rendition.package, bytes.len());
        Ok(())
    }
}
