//! Font descriptors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a font comes from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FontSource {
    /// A family the reading system is expected to provide
    #[default]
    NoFile,

    /// A `.ttf` file on the local disk
    LocalFile,

    /// Already embedded in the book
    FromEpub,

    /// Seen in a stylesheet; provenance unknown
    Unknown,
}

/// A font family, optionally backed by a file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Font {
    pub name: String,

    /// Generic CSS family used when `name` is unavailable
    pub fallback: String,

    pub file_path: Option<PathBuf>,

    pub source: FontSource,
}

impl Font {
    /// Describe a font by family name or by file path
    ///
    /// A `name` containing a `.` is taken as a path: the family becomes the file
    /// name up to its first `.`, and the file is kept only for `.ttf` files
    /// with a source other than [`FontSource::NoFile`].
    pub fn new(name: &str, source: FontSource, fallback: Option<&str>) -> Self {
        let fallback = fallback
            .map(str::to_string)
            .unwrap_or_else(|| Self::guess_family(name).to_string());

        if !name.contains('.') {
            let source = match source {
                FontSource::LocalFile => FontSource::NoFile,
                other => other,
            };
            return Self {
                name: name.to_string(),
                fallback,
                file_path: None,
                source,
            };
        }

        let path = Path::new(name);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let family = file_name.split('.').next().unwrap_or_default().to_string();
        let is_ttf = file_name
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("ttf"));

        if source != FontSource::NoFile && is_ttf {
            Self {
                name: family,
                fallback,
                file_path: Some(path.to_path_buf()),
                source,
            }
        } else {
            Self {
                name: family,
                fallback,
                file_path: None,
                source: FontSource::NoFile,
            }
        }
    }

    /// Generic family suggested by words in the font name
    pub fn guess_family(name: &str) -> &'static str {
        if name.contains("monospace") {
            "monospace"
        } else if name.contains("cursive") {
            "cursive"
        } else if name.contains("serif") && !name.contains("sans") {
            "serif"
        } else {
            "sans-serif"
        }
    }

    /// Parse a CSS `font-family` value such as `"Open Sans", Arial, sans-serif`
    pub fn from_css(value: &str) -> Self {
        let (first, rest) = value.split_once(',').unwrap_or((value, ""));
        let name = first.trim().trim_matches(|c| c == '"' || c == '\'');
        let rest = rest.trim();
        let fallback = if rest.is_empty() {
            Self::guess_family(value)
        } else {
            rest
        };
        Self::new(name, FontSource::Unknown, Some(fallback))
    }

    pub fn is_embeddable(&self) -> bool {
        self.file_path.is_some()
    }
}

/// CSS `font-family` form
impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.contains(char::is_whitespace) {
            write!(f, "\"{}\", {}", self.name, self.fallback)
        } else {
            write!(f, "{}, {}", self.name, self.fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_name_without_file() {
        let font = Font::new("Georgia", FontSource::LocalFile, Some("serif"));
        assert_eq!(font.name, "Georgia");
        assert_eq!(font.source, FontSource::NoFile);
        assert!(font.file_path.is_none());
    }

    #[test]
    fn test_ttf_path_keeps_file() {
        let font = Font::new("/home/me/fonts/Literata.Regular.TTF", FontSource::LocalFile, None);
        assert_eq!(font.name, "Literata");
        assert_eq!(font.source, FontSource::LocalFile);
        assert_eq!(
            font.file_path.as_deref(),
            Some(Path::new("/home/me/fonts/Literata.Regular.TTF"))
        );
        assert!(font.is_embeddable());
    }

    #[test]
    fn test_non_ttf_path_drops_file() {
        let font = Font::new("/fonts/Inter.woff2", FontSource::LocalFile, None);
        assert_eq!(font.name, "Inter");
        assert_eq!(font.source, FontSource::NoFile);
        assert!(font.file_path.is_none());
    }

    #[test]
    fn test_guess_family() {
        assert_eq!(Font::guess_family("DejaVu monospace"), "monospace");
        assert_eq!(Font::guess_family("fancy cursive"), "cursive");
        assert_eq!(Font::guess_family("Noto serif"), "serif");
        assert_eq!(Font::guess_family("Noto sans serif"), "sans-serif");
        assert_eq!(Font::guess_family("Arial"), "sans-serif");
    }

    #[test]
    fn test_from_css() {
        let font = Font::from_css("\"Open Sans\", Arial, sans-serif");
        assert_eq!(font.name, "Open Sans");
        assert_eq!(font.fallback, "Arial, sans-serif");
        assert_eq!(font.source, FontSource::Unknown);

        let font = Font::from_css("Old serif");
        assert_eq!(font.name, "Old serif");
        assert_eq!(font.fallback, "serif");
    }

    #[test]
    fn test_display_is_css() {
        assert_eq!(Font::from_css("'Open Sans', sans-serif").to_string(), "\"Open Sans\", sans-serif");
        assert_eq!(Font::new("Arial", FontSource::NoFile, None).to_string(), "Arial, sans-serif");
    }
}
