//! XML document accessor
//!
//! Reads files of an unpacked book and parses them into a mutable,
//! namespace-aware tree built on quick-xml events.

mod parse;
mod tree;
mod write;

pub use parse::XmlInput;
pub use tree::{Document, Element, Node, XML_NS};

use crate::paths::BookPath;
use std::io;
use std::path::Path;

/// Read a file of the book, given relative to the book root
///
/// A missing file surfaces as [`io::ErrorKind::NotFound`] so callers can tell
/// it apart from other I/O failures.
pub fn read(book_root: &Path, name: &BookPath) -> io::Result<Vec<u8>> {
    let path = name.to_fs(book_root);
    tracing::debug!("Reading {}", path.display());
    std::fs::read(path)
}
