//! Container settings
//!
//! Controls the fixed strings written into the property parts and how
//! entries are serialized and compressed. Settings are plain JSON so a
//! conversion pipeline can keep them next to its own configuration.

use crate::error::PackageResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Compression applied to archive entries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryCompression {
    Stored,
    Deflated,
}

impl From<EntryCompression> for zip::CompressionMethod {
    fn from(value: EntryCompression) -> Self {
        match value {
            EntryCompression::Stored => zip::CompressionMethod::Stored,
            EntryCompression::Deflated => zip::CompressionMethod::Deflated,
        }
    }
}

/// Settings used by the package assembler
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContainerSettings {
    /// Written to `Application` in app.xml
    pub application_name: String,
    /// Semantic version, written to `AppVersion` as `MM.mmmm`
    pub application_version: String,
    /// Written to `cp:lastModifiedBy` in core.xml
    pub last_modified_by: String,
    /// Indent generated XML parts
    pub pretty_print: bool,
    /// Compression for XML parts
    pub xml_compression: EntryCompression,
    /// Compression for embedded images and fonts
    pub media_compression: EntryCompression,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            application_name: env!("CARGO_PKG_NAME").to_string(),
            application_version: env!("CARGO_PKG_VERSION").to_string(),
            last_modified_by: env!("CARGO_PKG_NAME").to_string(),
            pretty_print: false,
            xml_compression: EntryCompression::Deflated,
            // Already-compressed media gains nothing from deflate
            media_compression: EntryCompression::Stored,
        }
    }
}

impl ContainerSettings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_sync(path: impl AsRef<Path>) -> PackageResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str::<ContainerSettings>(&content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse container settings {}, using defaults: {}",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save settings to disk
    pub fn save_sync(&self, path: impl AsRef<Path>) -> PackageResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
