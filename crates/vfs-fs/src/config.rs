//! Format-agnostic configuration loading and saving

use serde::{Serialize, de::DeserializeOwned};
use std::path::Path;

use crate::{Error, Result, io};

/// Format-agnostic document store.
///
/// Detects the format from the file extension and handles
/// serialization/deserialization transparently:
/// - `.toml` -> TOML
/// - `.json` -> JSON
/// - `.yaml`, `.yml` -> YAML
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigStore;

impl ConfigStore {
    pub fn new() -> Self {
        Self
    }

    /// Load a document from a file.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = io::read_text(path)?;
        self.parse(path, &content)
    }

    /// Parse already-read content, using `path` only for format detection
    /// and error reporting.
    pub fn parse<T: DeserializeOwned>(&self, path: &Path, content: &str) -> Result<T> {
        let extension = extension_of(path);
        let parse_err = |format: &str, message: String| Error::ConfigParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        match extension.as_str() {
            "toml" => toml::from_str(content).map_err(|e| parse_err("TOML", e.to_string())),
            "json" => serde_json::from_str(content).map_err(|e| parse_err("JSON", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(content).map_err(|e| parse_err("YAML", e.to_string()))
            }
            _ => Err(Error::UnsupportedFormat {
                extension: extension.clone(),
            }),
        }
    }

    /// Render a document in the format implied by `path`.
    pub fn render<T: Serialize>(&self, path: &Path, value: &T) -> Result<String> {
        let extension = extension_of(path);
        let ser_err = |format: &str, message: String| Error::ConfigSerialize {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        };

        match extension.as_str() {
            "toml" => toml::to_string_pretty(value).map_err(|e| ser_err("TOML", e.to_string())),
            "json" => {
                serde_json::to_string_pretty(value).map_err(|e| ser_err("JSON", e.to_string()))
            }
            "yaml" | "yml" => {
                serde_yaml::to_string(value).map_err(|e| ser_err("YAML", e.to_string()))
            }
            _ => Err(Error::UnsupportedFormat {
                extension: extension.clone(),
            }),
        }
    }

    /// Save a document to a file atomically.
    pub fn save<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let content = self.render(path, value)?;
        io::write_atomic(path, content.as_bytes())
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        root: String,
        timeout_secs: u64,
    }

    #[test]
    fn round_trips_each_format() {
        let dir = tempdir().unwrap();
        let store = ConfigStore::new();
        let sample = Sample {
            root: "/srv".into(),
            timeout_secs: 30,
        };
        for name in ["a.toml", "a.json", "a.yaml"] {
            let path = dir.path().join(name);
            store.save(&path, &sample).unwrap();
            let loaded: Sample = store.load(&path).unwrap();
            assert_eq!(loaded, sample, "format {name}");
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let store = ConfigStore::new();
        let err = store
            .parse::<Sample>(Path::new("config.ini"), "root = 1")
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { extension } if extension == "ini"));
    }
}
