//! Folio Core Library
//!
//! This crate locates the renditions of an unpacked EPUB, resolves their
//! manifests and reading order into concrete file paths, and edits the
//! manifest of the loaded rendition (font embedding) while keeping the
//! package document byte-faithful outside the edited parts.

pub mod config;
pub mod container;
pub mod error;
pub mod fonts;
pub mod manifest;
pub mod paths;
pub mod rendition;
pub mod spine;
pub mod xml;

pub use config::{FolioConfig, IdStrategy};
pub use error::{
    ConfigError, ContainerError, FolioError, FontError, PackageError, PathError, Result,
    StateError, XmlError,
};
pub use fonts::{EmbeddedFont, Font, FontEmbedder, FontRegistry, FontSource};
pub use manifest::{Manifest, ManifestItem};
pub use paths::{BookPath, Href, PackagePath};
pub use rendition::{
    AddedItem, ItemAttributes, LoadedRendition, RemoveOutcome, RenditionManager, RenditionPaths,
};
