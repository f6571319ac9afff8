//! Editor configuration

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How a colliding manifest id is made unique
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Append random digits until the id is free
    #[default]
    RandomDigits,

    /// Append `-1`, `-2`, ... until the id is free
    Counter,

    /// Append a UUID
    Uuid,
}

/// Tunables shared by the rendition manager and font embedding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FolioConfig {
    /// Folder, relative to the rendition folder, that receives embedded fonts
    pub font_folder: String,

    /// Media type written for embedded font items
    pub font_media_type: String,

    pub id_strategy: IdStrategy,

    /// Stamp `dcterms:modified` when saving a rendition
    pub stamp_modified: bool,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            font_folder: "Fonts".to_string(),
            font_media_type: "application/x-font-ttf".to_string(),
            id_strategy: IdStrategy::default(),
            stamp_modified: true,
        }
    }
}

impl FolioConfig {
    /// Environment variable naming a config file
    pub const ENV_VAR: &'static str = "FOLIO_CONFIG";

    /// Load from a JSON file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).map_err(|source| {
                ConfigError::Invalid {
                    path: path.to_path_buf(),
                    source,
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load from the file named by `FOLIO_CONFIG`, or the defaults when unset
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(Self::ENV_VAR) {
            Some(path) => Self::load(&PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.json");
        std::fs::write(&path, r#"{ "font_folder": "fonts", "id_strategy": "counter" }"#).unwrap();

        let config = FolioConfig::load(&path).unwrap();
        assert_eq!(config.font_folder, "fonts");
        assert_eq!(config.id_strategy, IdStrategy::Counter);
        assert_eq!(config.font_media_type, "application/x-font-ttf");
        assert!(config.stamp_modified);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FolioConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, FolioConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FolioConfig::load(&path),
            Err(crate::FolioError::Config(ConfigError::Invalid { .. }))
        ));
    }
}
