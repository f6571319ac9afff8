//! Container resolver: `META-INF/container.xml` → rendition package paths

use crate::error::{ContainerError, Result};
use crate::paths::{BookPath, PackagePath};
use crate::xml::{self, Document, Element};
use std::io;
use std::path::Path;

/// Fixed location of the container descriptor
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Namespace of the container descriptor
pub const CONTAINER_NS: &str = "urn:oasis:names:tc:opendocument:xmlns:container";

/// Media type a rootfile must declare to count as a rendition
pub const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Read and parse the container descriptor of the book at `book_root`
pub fn find_renditions(book_root: &Path) -> Result<Vec<PackagePath>> {
    let bytes = match xml::read(book_root, &BookPath::new(CONTAINER_PATH)) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ContainerError::Missing(book_root.join(CONTAINER_PATH)).into());
        }
        Err(e) => return Err(e.into()),
    };

    let container = Document::parse(&bytes)?;
    Ok(parse_container(&container)?)
}

/// Rendition package paths declared by a parsed container, in document order
pub fn parse_container(container: &Document) -> std::result::Result<Vec<PackagePath>, ContainerError> {
    let is_rootfile = |el: &Element| el.is(CONTAINER_NS, "rootfile") && el.attr("full-path").is_some();
    let rootfiles = container.root().descendants(&is_rootfile);

    if rootfiles.is_empty() {
        return Err(ContainerError::NoRootfiles);
    }

    let renditions: Vec<PackagePath> = rootfiles
        .iter()
        .filter(|rootfile| rootfile.attr("media-type") == Some(PACKAGE_MEDIA_TYPE))
        .filter_map(|rootfile| rootfile.attr("full-path"))
        .map(PackagePath::new)
        .filter(|package| {
            let escapes = package.as_book_path().escapes_root();
            if escapes {
                tracing::warn!("Skipping rootfile outside the book: {}", package);
            }
            !escapes
        })
        .collect();

    if renditions.is_empty() {
        return Err(ContainerError::NoCompliantRootfile);
    }

    tracing::debug!(
        "Container declares {} rendition(s): {:?}",
        renditions.len(),
        renditions.iter().map(PackagePath::as_str).collect::<Vec<_>>()
    );
    Ok(renditions)
}
