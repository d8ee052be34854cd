//! Error types for package assembly and inspection

use thiserror::Error;

/// Errors that can occur while assembling or inspecting a package
#[derive(Debug, Error)]
pub enum PackageError {
    /// IO error (file creation, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A lazily evaluated embedded resource failed to produce its bytes
    #[error("Failed to read resource {name}: {source}")]
    ResourceRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing the bytes of an archive entry failed
    #[error("Failed to write entry {entry}: {source}")]
    EntryWrite {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    /// XML serialization or parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Invalid package structure
    #[error("Invalid package structure: {0}")]
    InvalidStructure(String),

    /// Settings could not be serialized or parsed
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    /// UTF-8 encoding error
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl From<quick_xml::Error> for PackageError {
    fn from(err: quick_xml::Error) -> Self {
        PackageError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for PackageError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        PackageError::Xml(format!("Attribute error: {}", err))
    }
}

/// Result type for package operations
pub type PackageResult<T> = std::result::Result<T, PackageError>;
