//! Path types for the two bases a book uses
//!
//! Manifest and spine hrefs are relative to the folder of their package
//! document, while container entries and files on disk are relative to the
//! book root. Keeping them as distinct types means an href cannot be joined
//! onto the wrong base by accident.

use crate::error::PathError;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Characters escaped when writing a path segment into an href
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Collapse `.`, `..` and empty segments of a `/`-separated path
///
/// Leading `..` segments that climb above the start are kept.
fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Lexically normalize a filesystem path without touching the disk
fn normalize_fs(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// `path` made absolute against the working directory, without touching the disk
pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// A normalized path relative to the book root, `/`-separated
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BookPath(String);

impl BookPath {
    pub fn new(path: &str) -> Self {
        Self(normalize(path))
    }

    /// Convert a filesystem path inside `root` into a book path
    ///
    /// Relative paths, for `root` as well as `path`, are taken from the working
    /// directory.
    pub fn from_fs(root: &Path, path: &Path) -> Result<Self, PathError> {
        let root = normalize_fs(&absolute(root));
        let full = normalize_fs(&absolute(path));

        let relative = full
            .strip_prefix(&root)
            .map_err(|_| PathError::OutsideBook {
                path: path.to_path_buf(),
                root: root.clone(),
            })?;

        let mut segments = Vec::new();
        for component in relative.components() {
            let segment = component
                .as_os_str()
                .to_str()
                .ok_or_else(|| PathError::NotUtf8(path.to_path_buf()))?;
            segments.push(segment);
        }
        Ok(Self::new(&segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the path climbs above the book root
    pub fn escapes_root(&self) -> bool {
        self.0 == ".." || self.0.starts_with("../")
    }

    /// True for the book root itself
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a `/`-separated relative path
    pub fn join(&self, relative: &str) -> Self {
        if self.is_root() {
            Self::new(relative)
        } else {
            Self::new(&format!("{}/{}", self.0, relative))
        }
    }

    /// Containing folder; the root's parent is the root
    pub fn parent(&self) -> Self {
        match self.0.rsplit_once('/') {
            Some((parent, _)) => Self(parent.to_string()),
            None => Self::default(),
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.0.rsplit('/').next().filter(|name| !name.is_empty())
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Location on disk under `root`
    pub fn to_fs(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.segments() {
            path.push(segment);
        }
        path
    }

    /// Href that reaches this path from `folder`
    pub fn relative_to(&self, folder: &BookPath) -> Href {
        let target: Vec<&str> = self.segments().collect();
        let base: Vec<&str> = folder.segments().collect();
        let common = target
            .iter()
            .zip(base.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<String> = Vec::new();
        parts.extend(std::iter::repeat("..".to_string()).take(base.len() - common));
        parts.extend(
            target[common..]
                .iter()
                .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string()),
        );
        Href(parts.join("/"))
    }
}

impl fmt::Display for BookPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for BookPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Location of a package document, relative to the book root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackagePath(BookPath);

impl PackagePath {
    pub fn new(path: &str) -> Self {
        Self(BookPath::new(path))
    }

    pub fn as_book_path(&self) -> &BookPath {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The rendition folder every href of this package is relative to
    pub fn folder(&self) -> BookPath {
        self.0.parent()
    }

    pub fn to_fs(&self, root: &Path) -> PathBuf {
        self.0.to_fs(root)
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for PackagePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// A manifest href: a URL path relative to a rendition folder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Href(String);

impl Href {
    pub fn new(href: impl Into<String>) -> Self {
        Self(href.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Book path this href points at when read from `folder`
    ///
    /// Percent-escapes are decoded and any fragment is dropped. An href that
    /// climbs out of the book root is an error.
    pub fn resolve(&self, folder: &BookPath) -> Result<BookPath, PathError> {
        let without_fragment = self.0.split('#').next().unwrap_or_default();
        let decoded = percent_decode_str(without_fragment).decode_utf8_lossy();
        let resolved = folder.join(&decoded);
        if resolved.escapes_root() {
            return Err(PathError::EscapesBook(self.0.clone()));
        }
        Ok(resolved)
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Href {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
