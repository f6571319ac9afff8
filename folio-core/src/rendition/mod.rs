//! Rendition manager
//!
//! Discovers the renditions of an unpacked book, keeps one of them loaded
//! (its manifest, spine and live package tree), and resolves the paths other
//! components work with.
//!
//! The manager moves through three states:
//!
//! - *Unresolved*: nothing discovered yet; every query fails.
//! - *Resolved*: the container has been read, no rendition is loaded.
//! - *Loaded*: one rendition is held live and can be queried and mutated.
//!
//! Path results are snapshots: they stay valid only until the next
//! [`RenditionManager::find_renditions`] or [`RenditionManager::load_rendition`].

mod ids;
mod mutate;
mod persist;

pub use ids::IdGenerator;
pub use mutate::{AddedItem, ItemAttributes, RemoveOutcome};
pub use persist::{stamp_modified, MODIFIED_PROPERTY};

use crate::config::FolioConfig;
use crate::container;
use crate::error::{PackageError, PathError, Result, StateError};
use crate::manifest::{load_manifest, Manifest};
use crate::paths::{self, BookPath, Href, PackagePath};
use crate::spine::load_spine;
use crate::xml::{self, Document};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// The rendition currently held live
#[derive(Debug, Clone)]
pub struct LoadedRendition {
    index: usize,
    package: PackagePath,
    manifest: Manifest,
    spine: Vec<Href>,
    document: Document,
}

impl LoadedRendition {
    /// Position of this rendition in the container
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn package(&self) -> &PackagePath {
        &self.package
    }

    /// Snapshot of the manifest; refreshed after every mutation
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Spine hrefs in reading order
    pub fn spine(&self) -> &[Href] {
        &self.spine
    }

    pub fn stylesheets(&self) -> &[Href] {
        self.manifest.stylesheets()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn refresh_manifest(&mut self) -> std::result::Result<(), PackageError> {
        self.manifest = load_manifest(&self.document)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Unresolved,
    Resolved {
        opf_files: Vec<PackagePath>,
    },
    Loaded {
        opf_files: Vec<PackagePath>,
        rendition: Box<LoadedRendition>,
    },
}

impl State {
    fn opf_files(&self) -> std::result::Result<&[PackagePath], StateError> {
        match self {
            State::Unresolved => Err(StateError::NotResolved),
            State::Resolved { opf_files } | State::Loaded { opf_files, .. } => Ok(opf_files.as_slice()),
        }
    }

    fn rendition(&self) -> std::result::Result<&LoadedRendition, StateError> {
        match self {
            State::Loaded { rendition, .. } => Ok(rendition.as_ref()),
            _ => Err(StateError::NotLoaded),
        }
    }

    fn rendition_mut(&mut self) -> std::result::Result<&mut LoadedRendition, StateError> {
        match self {
            State::Loaded { rendition, .. } => Ok(rendition.as_mut()),
            _ => Err(StateError::NotLoaded),
        }
    }
}

/// Full filesystem paths of a loaded rendition's content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenditionPaths {
    /// Spine documents in reading order
    pub spine: Vec<PathBuf>,
    pub stylesheets: Vec<PathBuf>,
}

/// Owner of a book's renditions and of the live tree of the loaded one
#[derive(Debug)]
pub struct RenditionManager {
    book_root: PathBuf,
    config: FolioConfig,
    ids: IdGenerator,
    state: State,
}

impl RenditionManager {
    pub fn new(book_root: impl Into<PathBuf>) -> Self {
        Self::with_config(book_root, FolioConfig::default())
    }

    /// A relative `book_root` is made absolute against the working directory
    pub fn with_config(book_root: impl Into<PathBuf>, config: FolioConfig) -> Self {
        Self {
            book_root: paths::absolute(&book_root.into()),
            ids: IdGenerator::new(config.id_strategy),
            config,
            state: State::Unresolved,
        }
    }

    pub fn book_root(&self) -> &Path {
        &self.book_root
    }

    pub fn config(&self) -> &FolioConfig {
        &self.config
    }

    /// Point the manager at another book, persisting and closing the current one
    pub fn set_book_root(&mut self, book_root: impl Into<PathBuf>) -> Result<()> {
        self.reset()?;
        self.book_root = paths::absolute(&book_root.into());
        Ok(())
    }

    /// Persist any loaded rendition and return to the unresolved state
    pub fn reset(&mut self) -> Result<()> {
        self.save()?;
        self.state = State::Unresolved;
        Ok(())
    }

    /// Read the container and enumerate renditions
    ///
    /// A loaded rendition is saved first so in-memory edits survive a re-scan.
    /// On failure the manager is left unresolved.
    pub fn find_renditions(&mut self) -> Result<&[PackagePath]> {
        self.save()?;
        self.state = State::Unresolved;

        let opf_files = container::find_renditions(&self.book_root)?;
        tracing::debug!("Found {} rendition(s) in {}", opf_files.len(), self.book_root.display());
        self.state = State::Resolved { opf_files };
        Ok(self.state.opf_files()?)
    }

    /// Load rendition `index`, clamped to the available range
    ///
    /// The previously loaded rendition is saved first. If the target cannot be
    /// loaded the manager is left resolved, never partially loaded.
    pub fn load_rendition(&mut self, index: usize) -> Result<&LoadedRendition> {
        let count = self.state.opf_files()?.len();
        let index = index.min(count.saturating_sub(1));

        self.save()?;
        let opf_files = match std::mem::take(&mut self.state) {
            State::Resolved { opf_files } | State::Loaded { opf_files, .. } => opf_files,
            State::Unresolved => unreachable!("opf_files() succeeded"),
        };

        let package = opf_files[index].clone();
        match read_rendition(&self.book_root, index, package) {
            Ok(rendition) => {
                tracing::debug!(
                    "Loaded rendition {} ({}): {} spine entries, {} stylesheet(s)",
                    index,
                    rendition.package,
                    rendition.spine.len(),
                    rendition.stylesheets().len()
                );
                self.state = State::Loaded {
                    opf_files,
                    rendition: Box::new(rendition),
                };
                Ok(self.state.rendition()?)
            }
            Err(err) => {
                self.state = State::Resolved { opf_files };
                Err(err)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded { .. })
    }

    /// Package paths of every rendition, in container order
    pub fn opf_files(&self) -> Result<&[PackagePath]> {
        Ok(self.state.opf_files()?)
    }

    pub fn rendition_count(&self) -> usize {
        self.state.opf_files().map(<[_]>::len).unwrap_or(0)
    }

    pub fn loaded(&self) -> Result<&LoadedRendition> {
        Ok(self.state.rendition()?)
    }

    /// Spine and stylesheet locations joined onto the book root and rendition folder
    ///
    /// Fails if any of them points outside the book.
    pub fn rendition_paths(&self) -> Result<RenditionPaths> {
        let rendition = self.state.rendition()?;
        let folder = rendition.package.folder();
        let to_fs = |href: &Href| -> std::result::Result<PathBuf, PathError> {
            Ok(href.resolve(&folder)?.to_fs(&self.book_root))
        };

        Ok(RenditionPaths {
            spine: rendition.spine.iter().map(to_fs).collect::<std::result::Result<_, _>>()?,
            stylesheets: rendition
                .stylesheets()
                .iter()
                .map(to_fs)
                .collect::<std::result::Result<_, _>>()?,
        })
    }

    /// Folder of the loaded package document, relative to the book root
    pub fn opf_folder_path(&self) -> Result<BookPath> {
        Ok(self.state.rendition()?.package.folder())
    }

    /// Folder embedded fonts are copied to, relative to the book root
    pub fn font_folder_path(&self) -> Result<BookPath> {
        Ok(self.opf_folder_path()?.join(&self.config.font_folder))
    }

    /// Whether the manifest of any other rendition points at `target`
    fn referenced_elsewhere(&self, target: &BookPath) -> Result<bool> {
        let rendition = self.state.rendition()?;
        for (index, package) in self.state.opf_files()?.iter().enumerate() {
            if index == rendition.index || *package == rendition.package {
                continue;
            }
            let document = read_package(&self.book_root, package)?;
            let manifest = load_manifest(&document)?;
            let folder = package.folder();
            if manifest
                .items()
                .iter()
                .any(|item| item.href.resolve(&folder).is_ok_and(|path| path == *target))
            {
                tracing::debug!("{} is still referenced by rendition {}", target, index);
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn read_package(book_root: &Path, package: &PackagePath) -> Result<Document> {
    let bytes = xml::read(book_root, package.as_book_path()).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => PackageError::NotFound(package.to_fs(book_root)).into(),
        _ => crate::FolioError::from(e),
    })?;
    Ok(Document::parse(&bytes)?)
}

fn read_rendition(book_root: &Path, index: usize, package: PackagePath) -> Result<LoadedRendition> {
    let document = read_package(book_root, &package)?;
    let manifest = load_manifest(&document)?;
    let spine = load_spine(&document, &manifest)?;
    Ok(LoadedRendition {
        index,
        package,
        manifest,
        spine,
        document,
    })
}
