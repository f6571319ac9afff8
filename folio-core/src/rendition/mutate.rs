//! Manifest mutation on the live package tree
//!
//! Edits stay in memory until [`RenditionManager::save`] writes them out.

use super::RenditionManager;
use crate::error::Result;
use crate::manifest::{is_opf, manifest_element, manifest_element_mut};
use crate::paths::{BookPath, Href};
use crate::xml::{Document, Element};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A manifest must keep at least this many items; removal below it is refused
const MIN_MANIFEST_ITEMS: usize = 2;

/// Requested manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAttributes {
    /// Preferred id; made unique on insertion
    pub id: String,
    /// Location of the file on disk, inside the book root
    pub path: PathBuf,
    pub media_type: String,
}

impl ItemAttributes {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            media_type: media_type.into(),
        }
    }
}

/// Entry written by [`RenditionManager::add_item`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedItem {
    /// Id actually used, after collision avoidance
    pub id: String,
    /// Href relative to the rendition folder
    pub href: Href,
    pub path: BookPath,
}

/// Result of [`RenditionManager::remove_item`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: bool,
    /// No other rendition references the removed file, so it may be deleted
    pub file_deletable: bool,
    /// The file the removed item pointed at
    pub file: Option<BookPath>,
}

impl RemoveOutcome {
    fn nothing() -> Self {
        Self::default()
    }
}

impl RenditionManager {
    /// Add a manifest item for the file at `attrs.path`
    ///
    /// Returns `None` when an item for that file already exists.
    pub fn add_item(&mut self, attrs: &ItemAttributes) -> Result<Option<AddedItem>> {
        let target = BookPath::from_fs(&self.book_root, &attrs.path)?;
        let rendition = self.state.rendition_mut()?;
        let folder = rendition.package.folder();
        let href = target.relative_to(&folder);

        let manifest = manifest_element(&rendition.document)?;
        let items: Vec<&Element> = manifest.elements().filter(|el| is_opf(el, "item")).collect();

        let duplicate = items.iter().any(|item| {
            item.attr("href")
                .is_some_and(|existing| Href::new(existing).resolve(&folder).is_ok_and(|path| path == target))
        });
        if duplicate {
            tracing::warn!("Manifest of {} already lists {}", rendition.package, target);
            return Ok(None);
        }

        let item_name = items
            .first()
            .map(|item| item.name().to_string())
            .unwrap_or_else(|| match manifest.prefix() {
                Some(prefix) => format!("{prefix}:item"),
                None => "item".to_string(),
            });
        let namespace = manifest.namespace().map(str::to_string);

        // XML ids are document-wide, not just manifest-wide
        let is_id = |_: &Element| true;
        let taken: HashSet<String> = rendition
            .document
            .root()
            .descendants(&is_id)
            .iter()
            .filter_map(|el| el.attr("id"))
            .map(str::to_string)
            .collect();
        let id = self.ids.unique(&attrs.id, |candidate| taken.contains(candidate));

        let item = Element::new(item_name, namespace.as_deref())
            .with_attr("id", id.as_str())
            .with_attr("href", href.as_str())
            .with_attr("media-type", attrs.media_type.as_str());
        manifest_element_mut(&mut rendition.document)?.append_element(item);
        rendition.refresh_manifest()?;

        tracing::info!("Added manifest item '{}' -> {} to {}", id, href, rendition.package);
        Ok(Some(AddedItem {
            id,
            href,
            path: target,
        }))
    }

    /// Remove the single manifest item matching `id` and/or the file at `path`
    ///
    /// With both criteria an item must satisfy both. Nothing is removed when no
    /// criterion is given, when the match is not unique, when the spine still
    /// references the match, or when the manifest has no more than two items.
    pub fn remove_item(&mut self, id: Option<&str>, path: Option<&Path>) -> Result<RemoveOutcome> {
        if id.is_none() && path.is_none() {
            return Ok(RemoveOutcome::nothing());
        }
        let target = path
            .map(|path| BookPath::from_fs(&self.book_root, path))
            .transpose()?;

        let rendition = self.state.rendition_mut()?;
        let folder = rendition.package.folder();
        let items: Vec<&Element> = manifest_element(&rendition.document)?
            .elements()
            .filter(|el| is_opf(el, "item"))
            .collect();

        if items.len() <= MIN_MANIFEST_ITEMS {
            tracing::warn!(
                "Refusing to shrink the {}-item manifest of {}",
                items.len(),
                rendition.package
            );
            return Ok(RemoveOutcome::nothing());
        }

        let matching = |predicate: &dyn Fn(&Element) -> bool| -> HashSet<usize> {
            items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| predicate(*item).then_some(index))
                .collect()
        };
        let by_id = id.map(|id| matching(&|item: &Element| item.attr("id") == Some(id)));
        let by_path = target.as_ref().map(|target| {
            matching(&|item: &Element| {
                item.attr("href")
                    .is_some_and(|href| Href::new(href).resolve(&folder).is_ok_and(|path| path == *target))
            })
        });

        let matched: Vec<usize> = match (by_id, by_path) {
            (Some(by_id), Some(by_path)) => by_id.intersection(&by_path).copied().collect(),
            (Some(only), None) | (None, Some(only)) => only.into_iter().collect(),
            (None, None) => Vec::new(),
        };
        let &[index] = matched.as_slice() else {
            tracing::warn!(
                "{} manifest items match id={:?} path={:?}; nothing removed",
                matched.len(),
                id,
                target.as_ref().map(BookPath::as_str)
            );
            return Ok(RemoveOutcome::nothing());
        };

        // Dropping a spine item would leave the package unloadable
        let spine_ids = spine_idrefs(&rendition.document);
        if let Some(id) = items[index].attr("id").filter(|id| spine_ids.contains(id)) {
            tracing::warn!("Refusing to remove '{}': the spine of {} uses it", id, rendition.package);
            return Ok(RemoveOutcome::nothing());
        }

        let removed = items[index].clone();
        // An href outside the book never makes a file deletable
        let file = removed
            .attr("href")
            .and_then(|href| Href::new(href).resolve(&folder).ok());

        manifest_element_mut(&mut rendition.document)?.remove_element(|el| *el == removed);
        rendition.refresh_manifest()?;
        tracing::info!(
            "Removed manifest item '{}' from {}",
            removed.attr("id").unwrap_or_default(),
            rendition.package
        );

        let file_deletable = match &file {
            Some(file) => match self.referenced_elsewhere(file) {
                Ok(referenced) => !referenced,
                Err(err) => {
                    tracing::warn!("Cannot check other renditions for {}: {}", file, err);
                    false
                }
            },
            None => false,
        };

        Ok(RemoveOutcome {
            removed: true,
            file_deletable,
            file,
        })
    }
}

/// Idrefs of the spine's itemrefs
fn spine_idrefs(package: &Document) -> HashSet<&str> {
    package
        .root()
        .child(|el| is_opf(el, "spine"))
        .map(|spine| {
            spine
                .elements()
                .filter(|el| is_opf(el, "itemref"))
                .filter_map(|el| el.attr("idref"))
                .collect()
        })
        .unwrap_or_default()
}
