//! Manifest loader: package document → id/href map and stylesheet list

use crate::error::PackageError;
use crate::paths::Href;
use crate::xml::{Document, Element};
use serde::Serialize;
use std::collections::HashMap;

/// Namespace of EPUB package documents
pub const OPF_NS: &str = "http://www.idpf.org/2007/opf";

/// Media type of stylesheets
pub const CSS_MEDIA_TYPE: &str = "text/css";

/// Whether `el` is the package element `local`
///
/// Some EPUB 2 tools omit the OPF namespace entirely; such un-namespaced
/// elements are accepted too.
pub(crate) fn is_opf(el: &Element, local: &str) -> bool {
    el.local_name() == local && matches!(el.namespace(), Some(OPF_NS) | None)
}

/// One `<item>` of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestItem {
    pub id: String,
    pub href: Href,
    pub media_type: String,
}

/// Read-only snapshot of a rendition's manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    #[serde(skip)]
    by_id: HashMap<String, usize>,
    stylesheets: Vec<Href>,
}

type MediaTypeHandler = fn(&mut Manifest, &ManifestItem);

/// Media types this subsystem distinguishes; everything else is just an item
const MEDIA_TYPE_HANDLERS: &[(&str, MediaTypeHandler)] = &[(CSS_MEDIA_TYPE, register_stylesheet)];

fn register_stylesheet(manifest: &mut Manifest, item: &ManifestItem) {
    manifest.stylesheets.push(item.href.clone());
}

impl Manifest {
    /// Href of the item with `id`
    pub fn href(&self, id: &str) -> Option<&Href> {
        self.by_id.get(id).map(|&index| &self.items[index].href)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Stylesheet hrefs in manifest order
    pub fn stylesheets(&self) -> &[Href] {
        &self.stylesheets
    }

    pub fn items(&self) -> &[ManifestItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// id → href as plain strings
    pub fn to_map(&self) -> HashMap<String, String> {
        self.items
            .iter()
            .map(|item| (item.id.clone(), item.href.as_str().to_string()))
            .collect()
    }

    fn push(&mut self, item: ManifestItem) {
        for (media_type, handler) in MEDIA_TYPE_HANDLERS {
            if item.media_type == *media_type {
                handler(self, &item);
            }
        }
        self.by_id.insert(item.id.clone(), self.items.len());
        self.items.push(item);
    }
}

/// The `<manifest>` element of a package document
pub(crate) fn manifest_element(package: &Document) -> Result<&Element, PackageError> {
    package
        .root()
        .child(|el| is_opf(el, "manifest"))
        .ok_or(PackageError::MissingElement("manifest"))
}

pub(crate) fn manifest_element_mut(package: &mut Document) -> Result<&mut Element, PackageError> {
    package
        .root_mut()
        .child_mut(|el| is_opf(el, "manifest"))
        .ok_or(PackageError::MissingElement("manifest"))
}

/// Build the manifest snapshot from the direct `<item>` children of `<manifest>`
pub fn load_manifest(package: &Document) -> Result<Manifest, PackageError> {
    let mut manifest = Manifest::default();

    for el in manifest_element(package)?.elements() {
        if !is_opf(el, "item") {
            continue;
        }
        let (Some(id), Some(href)) = (el.attr("id"), el.attr("href")) else {
            tracing::warn!("Skipping manifest item without id or href");
            continue;
        };
        manifest.push(ManifestItem {
            id: id.to_string(),
            href: Href::new(href),
            media_type: el.attr("media-type").unwrap_or_default().to_string(),
        });
    }

    tracing::debug!(
        "Manifest has {} items, {} stylesheet(s)",
        manifest.len(),
        manifest.stylesheets.len()
    );
    Ok(manifest)
}
