//! Known fonts, persisted as JSON

use super::{Font, FontSource};
use crate::error::{FontError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Families every reading system can be expected to render
const WEB_SAFE: &[(&str, &str)] = &[
    ("Arial", "sans-serif"),
    ("Verdana", "sans-serif"),
    ("Helvetica", "sans-serif"),
    ("Tahoma", "sans-serif"),
    ("Trebuchet MS", "sans-serif"),
    ("Times New Roman", "serif"),
    ("Georgia", "serif"),
    ("Garamond", "serif"),
    ("Courier New", "monospace"),
    ("Brush Script MT", "cursive"),
];

/// Ordered set of fonts, unique by name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FontRegistry {
    fonts: Vec<Font>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_web_safe_defaults() -> Self {
        let mut registry = Self::new();
        for &(name, fallback) in WEB_SAFE {
            registry.add(Font::new(name, FontSource::NoFile, Some(fallback)));
        }
        registry
    }

    /// Insert `font`, replacing any font of the same name in place
    pub fn add(&mut self, font: Font) {
        match self.fonts.iter_mut().find(|f| f.name == font.name) {
            Some(existing) => *existing = font,
            None => self.fonts.push(font),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Font> {
        let index = self.fonts.iter().position(|f| f.name == name)?;
        Some(self.fonts.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Font> {
        self.fonts.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Font> {
        self.fonts.iter()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Load from a JSON file; a missing file yields an empty registry
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).map_err(|source| {
                FontError::Registry {
                    path: path.to_path_buf(),
                    source,
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Save to a JSON file, writing a temp file first and renaming it over `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| FontError::Registry {
            path: path.to_path_buf(),
            source,
        })?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, path)?;

        tracing::debug!("Saved {} font(s) to {}", self.fonts.len(), path.display());
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FontRegistry {
    type Item = &'a Font;
    type IntoIter = std::slice::Iter<'a, Font>;

    fn into_iter(self) -> Self::IntoIter {
        self.fonts.iter()
    }
}
