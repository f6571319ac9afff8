//! Font embedding tests for folio-core

use folio_core::{FolioConfig, FolioError, FontEmbedder, FontError, IdStrategy, RenditionManager};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PACKAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata/>
  <manifest>
    <item id="ch1" href="Text/ch1.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="Text/ch2.xhtml" media-type="application/xhtml+xml"/>
    <item id="css" href="Styles/style.css" media-type="text/css"/>
  </manifest>
  <spine>
    <itemref idref="ch1"/>
    <itemref idref="ch2"/>
  </spine>
</package>
"#;

fn write(root: &Path, name: &str, content: &[u8]) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Book with renditions at `OEBPS/a.opf` and `OEBPS/b.opf`
fn book() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "META-INF/container.xml",
        br#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/a.opf" media-type="application/oebps-package+xml"/>
    <rootfile full-path="OEBPS/b.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#,
    );
    write(dir.path(), "OEBPS/a.opf", PACKAGE.as_bytes());
    write(dir.path(), "OEBPS/b.opf", PACKAGE.as_bytes());
    dir
}

fn font_file(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("Literata.ttf");
    fs::write(&path, b"\0\x01\0\0fake ttf").unwrap();
    path
}

fn manager(book: &TempDir, index: usize) -> RenditionManager {
    let config = FolioConfig {
        id_strategy: IdStrategy::Counter,
        ..FolioConfig::default()
    };
    let mut manager = RenditionManager::with_config(book.path(), config);
    manager.find_renditions().unwrap();
    manager.load_rendition(index).unwrap();
    manager
}

#[test]
fn test_add_font_copies_and_registers() {
    let book = book();
    let source = TempDir::new().unwrap();
    let font = font_file(&source);
    let mut manager = manager(&book, 0);

    let embedded = FontEmbedder::new(&mut manager).add_font(&font).unwrap();
    assert_eq!(embedded.path, book.path().join("OEBPS/Fonts/Literata.ttf"));
    assert_eq!(fs::read(&embedded.path).unwrap(), fs::read(&font).unwrap());

    let item = embedded.item.expect("manifest entry");
    assert_eq!(item.id, "font_Literata");
    assert_eq!(item.href.as_str(), "Fonts/Literata.ttf");

    let manifest = manager.loaded().unwrap().manifest();
    let entry = manifest
        .items()
        .iter()
        .find(|i| i.id == "font_Literata")
        .unwrap();
    assert_eq!(entry.media_type, "application/x-font-ttf");
}

#[test]
fn test_add_font_twice_keeps_one_entry() {
    let book = book();
    let source = TempDir::new().unwrap();
    let font = font_file(&source);
    let mut manager = manager(&book, 0);

    let mut embedder = FontEmbedder::new(&mut manager);
    assert!(embedder.add_font(&font).unwrap().item.is_some());
    assert!(embedder.add_font(&font).unwrap().item.is_none());

    // Re-adding the embedded copy itself must not clobber it
    let copy = book.path().join("OEBPS/Fonts/Literata.ttf");
    assert!(embedder.add_font(&copy).unwrap().item.is_none());
    assert_eq!(fs::read(&copy).unwrap(), fs::read(&font).unwrap());

    assert_eq!(manager.loaded().unwrap().manifest().len(), 4);
}

#[test]
fn test_add_missing_font_is_an_error() {
    let book = book();
    let mut manager = manager(&book, 0);
    let err = FontEmbedder::new(&mut manager)
        .add_font(&book.path().join("nope.ttf"))
        .unwrap_err();
    assert!(matches!(err, FolioError::Font(FontError::NotAFile(_))));
}

#[test]
fn test_remove_font_deletes_unshared_file() {
    let book = book();
    let source = TempDir::new().unwrap();
    let font = font_file(&source);
    let mut manager = manager(&book, 0);

    let mut embedder = FontEmbedder::new(&mut manager);
    let embedded = embedder.add_font(&font).unwrap();
    let outcome = embedder.remove_font(&font).unwrap();

    assert!(outcome.removed);
    assert!(outcome.file_deletable);
    assert!(!embedded.path.exists());
    assert!(font.exists());
}

#[test]
fn test_remove_font_keeps_file_used_by_sibling() {
    let book = book();
    let source = TempDir::new().unwrap();
    let font = font_file(&source);

    // Embed into both renditions
    let mut manager = manager(&book, 0);
    FontEmbedder::new(&mut manager).add_font(&font).unwrap();
    manager.load_rendition(1).unwrap();
    FontEmbedder::new(&mut manager).add_font(&font).unwrap();
    manager.save().unwrap();

    let outcome = FontEmbedder::new(&mut manager).remove_font(&font).unwrap();
    assert!(outcome.removed);
    assert!(!outcome.file_deletable);
    assert!(book.path().join("OEBPS/Fonts/Literata.ttf").exists());
}
