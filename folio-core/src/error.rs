//! Error types for Folio Core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using FolioError
pub type Result<T> = std::result::Result<T, FolioError>;

/// Top-level error type for all Folio operations
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Package error: {0}")]
    Package(#[from] PackageError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("XML error: {0}")]
    Xml(#[from] XmlError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while resolving `META-INF/container.xml`
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The book directory is not an unpacked EPUB at all
    #[error("{0} not found: the container descriptor is required by the standard")]
    Missing(PathBuf),

    /// The container has no `rootfile` declarations
    #[error("Missing value: container declares no rootfile elements")]
    NoRootfiles,

    /// Rootfiles exist, but none points at a package document
    #[error(
        "Missing value: no rootfile uses the media type application/oebps-package+xml"
    )]
    NoCompliantRootfile,
}

impl ContainerError {
    /// Whether this error reports a missing declaration rather than a missing file
    pub fn is_missing_value(&self) -> bool {
        matches!(self, Self::NoRootfiles | Self::NoCompliantRootfile)
    }
}

/// Errors in a rendition's package document
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Package document not found: {0}")]
    NotFound(PathBuf),

    #[error("Package document has no <{0}> element")]
    MissingElement(&'static str),

    #[error("Spine references id '{0}' which is not in the manifest")]
    UnknownSpineItem(String),
}

/// Sequencing errors: the caller asked for something the manager cannot do yet
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("No renditions resolved: call find_renditions first")]
    NotResolved,

    #[error("No rendition loaded")]
    NotLoaded,
}

/// Errors from the XML accessor
#[derive(Debug, Error)]
pub enum XmlError {
    #[error("Malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("Malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("Cannot decode document as {0}")]
    Encoding(&'static str),

    #[error("Unbalanced document: {0}")]
    Unbalanced(&'static str),

    #[error("Write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Errors mixing up the two path bases of a book
#[derive(Debug, Error)]
pub enum PathError {
    #[error("{path} is outside the book directory {root}")]
    OutsideBook { path: PathBuf, root: PathBuf },

    #[error("Path is not valid UTF-8: {0}")]
    NotUtf8(PathBuf),

    #[error("Href '{0}' points outside the book directory")]
    EscapesBook(String),
}

/// Errors in the font embedding workflow
#[derive(Debug, Error)]
pub enum FontError {
    #[error("Not a font file: {0}")]
    NotAFile(PathBuf),

    #[error("Invalid font registry {path}: {source}")]
    Registry {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Errors loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config file {path}: {source}")]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}
