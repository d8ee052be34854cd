//! [Content_Types].xml aggregation and parsing
//!
//! The manifest declares one Override per fixed part and one Default per
//! distinct file extension found among the built-in defaults and the
//! embedded resources.

use crate::content_type_values;
use crate::error::{PackageError, PackageResult};
use crate::namespaces;
use crate::reader::XmlParser;
use crate::xml::XmlElement;
use quick_xml::events::Event;
use std::collections::{HashMap, HashSet};

/// Extensions always declared, with MIME types resolved through the lookup
pub const GUESSED_DEFAULT_EXTENSIONS: &[&str] = &["png", "gif", "jpeg", "jpg", "svg", "xml"];

/// Extensions always declared with a fixed MIME type
pub const FIXED_DEFAULTS: &[(&str, &str)] = &[
    ("rels", content_type_values::RELATIONSHIPS),
    ("odttf", content_type_values::OBFUSCATED_FONT),
];

/// Resolves a file extension to a MIME type
pub trait MimeLookup {
    /// Return the MIME type for an extension (without the dot), if known
    fn mime_type(&self, extension: &str) -> Option<String>;
}

/// Built-in extension table, optionally extended with custom entries
#[derive(Debug, Clone, Default)]
pub struct StandardMimeTypes {
    custom: HashMap<String, String>,
}

impl StandardMimeTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a mapping; custom entries win over the built-in table
    pub fn with_type(mut self, extension: &str, mime: &str) -> Self {
        self.custom.insert(extension.to_ascii_lowercase(), mime.to_string());
        self
    }

    fn builtin(extension: &str) -> Option<&'static str> {
        let mime = match extension {
            "png" => "image/png",
            "gif" => "image/gif",
            "jpg" | "jpeg" | "jpe" => "image/jpeg",
            "svg" => "image/svg+xml",
            "bmp" => "image/bmp",
            "tif" | "tiff" => "image/tiff",
            "webp" => "image/webp",
            "ico" => "image/vnd.microsoft.icon",
            "emf" => "image/x-emf",
            "wmf" => "image/x-wmf",
            "xml" => "application/xml",
            "rels" => content_type_values::RELATIONSHIPS,
            "odttf" => content_type_values::OBFUSCATED_FONT,
            "ttf" => "font/ttf",
            "otf" => "font/otf",
            "woff" => "font/woff",
            "woff2" => "font/woff2",
            "txt" => "text/plain",
            "css" => "text/css",
            "htm" | "html" => "text/html",
            _ => return None,
        };
        Some(mime)
    }
}

impl MimeLookup for StandardMimeTypes {
    fn mime_type(&self, extension: &str) -> Option<String> {
        let ext = extension.to_ascii_lowercase();
        self.custom
            .get(&ext)
            .cloned()
            .or_else(|| Self::builtin(&ext).map(str::to_string))
    }
}

/// Split off the extension after the last dot.
///
/// A name without a dot yields the whole name, which then simply fails the
/// MIME lookup.
pub fn extension_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or(name)
}

/// One declaration in the content-type manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeEntry {
    /// Package-wide mapping by file extension
    Default { extension: String, content_type: String },
    /// Mapping for one exact part name
    Override { part_name: String, content_type: String },
}

/// Accumulates Default and Override declarations without duplicates
#[derive(Debug, Clone, Default)]
pub struct ContentTypeAggregator {
    defaults: Vec<ContentTypeEntry>,
    overrides: Vec<ContentTypeEntry>,
    /// Lowercased extensions already considered
    seen_extensions: HashSet<String>,
}

impl ContentTypeAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the manifest for a package.
    ///
    /// `parts` are the part paths written by the assembler with their MIME
    /// types; `resource_names` are the embedded image and font paths.
    pub fn for_package<'a>(
        parts: impl IntoIterator<Item = (&'a str, &'a str)>,
        resource_names: impl IntoIterator<Item = &'a str>,
        mime: &dyn MimeLookup,
    ) -> Self {
        let mut ct = Self::new();
        for (part_name, content_type) in parts {
            ct.add_override(part_name, content_type);
        }
        for ext in GUESSED_DEFAULT_EXTENSIONS {
            ct.add_extension(ext, mime);
        }
        for (ext, content_type) in FIXED_DEFAULTS {
            ct.add_default(ext, content_type);
        }
        for name in resource_names {
            ct.add_resource_name(name, mime);
        }
        ct
    }

    /// Add an override for a specific part, replacing any previous one
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        let normalized = if part_name.starts_with('/') {
            part_name.to_string()
        } else {
            format!("/{}", part_name)
        };

        let entry = ContentTypeEntry::Override {
            part_name: normalized.clone(),
            content_type: content_type.to_string(),
        };
        let existing = self.overrides.iter().position(|e| {
            matches!(e, ContentTypeEntry::Override { part_name, .. } if *part_name == normalized)
        });
        match existing {
            Some(idx) => self.overrides[idx] = entry,
            None => self.overrides.push(entry),
        }
    }

    /// Declare a Default unless the extension was already considered.
    /// Returns whether a new entry was added.
    pub fn add_default(&mut self, extension: &str, content_type: &str) -> bool {
        if !self.seen_extensions.insert(extension.to_ascii_lowercase()) {
            return false;
        }
        self.defaults.push(ContentTypeEntry::Default {
            extension: extension.to_string(),
            content_type: content_type.to_string(),
        });
        true
    }

    /// Declare a Default with a MIME type from the lookup.
    /// Unknown extensions are skipped.
    pub fn add_extension(&mut self, extension: &str, mime: &dyn MimeLookup) -> bool {
        if self.seen_extensions.contains(&extension.to_ascii_lowercase()) {
            return false;
        }
        match mime.mime_type(extension) {
            Some(content_type) => self.add_default(extension, &content_type),
            None => {
                tracing::warn!(extension, "no content type known for extension, skipping");
                self.seen_extensions.insert(extension.to_ascii_lowercase());
                false
            }
        }
    }

    /// Declare a Default for the extension of an embedded resource name
    pub fn add_resource_name(&mut self, name: &str, mime: &dyn MimeLookup) -> bool {
        self.add_extension(extension_of(name), mime)
    }

    /// All declarations, defaults first
    pub fn entries(&self) -> impl Iterator<Item = &ContentTypeEntry> {
        self.defaults.iter().chain(self.overrides.iter())
    }

    /// Build the `Types` element
    pub fn to_element(&self) -> XmlElement {
        let mut types = XmlElement::new("Types").with_attr("xmlns", namespaces::CT);
        for entry in self.entries() {
            let el = match entry {
                ContentTypeEntry::Default {
                    extension,
                    content_type,
                } => XmlElement::new("Default")
                    .with_attr("Extension", extension.as_str())
                    .with_attr("ContentType", content_type.as_str()),
                ContentTypeEntry::Override {
                    part_name,
                    content_type,
                } => XmlElement::new("Override")
                    .with_attr("PartName", part_name.as_str())
                    .with_attr("ContentType", content_type.as_str()),
            };
            types.push_child(el);
        }
        types
    }

    /// Generate XML content for [Content_Types].xml
    pub fn to_xml(&self, pretty: bool) -> PackageResult<String> {
        self.to_element().to_xml(pretty)
    }
}

/// Content types read back from an existing [Content_Types].xml
#[derive(Debug, Clone, Default)]
pub struct ContentTypesManifest {
    /// Default content types by lowercased extension
    pub defaults: HashMap<String, String>,
    /// Override content types by part name (with leading slash)
    pub overrides: HashMap<String, String>,
    /// Extensions declared more than once
    pub duplicate_extensions: Vec<String>,
}

impl ContentTypesManifest {
    /// Parse [Content_Types].xml from its content
    pub fn parse(content: &str) -> PackageResult<Self> {
        let mut result = Self::default();
        let mut reader = XmlParser::from_string(content);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    if XmlParser::matches_element(name.as_ref(), "Default") {
                        if let (Some(ext), Some(ct)) = (
                            XmlParser::get_attribute(e, b"Extension"),
                            XmlParser::get_attribute(e, b"ContentType"),
                        ) {
                            let key = ext.to_ascii_lowercase();
                            if result.defaults.insert(key, ct).is_some() {
                                result.duplicate_extensions.push(ext);
                            }
                        }
                    } else if XmlParser::matches_element(name.as_ref(), "Override") {
                        if let (Some(part), Some(ct)) = (
                            XmlParser::get_attribute(e, b"PartName"),
                            XmlParser::get_attribute(e, b"ContentType"),
                        ) {
                            result.overrides.insert(part, ct);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PackageError::from(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(result)
    }

    /// Resolve the content type of a part; overrides win over defaults
    pub fn content_type_for(&self, path: &str) -> Option<&str> {
        let normalized_path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        if let Some(ct) = self.overrides.get(&normalized_path) {
            return Some(ct.as_str());
        }

        let ext = path.rsplit_once('.').map(|(_, ext)| ext)?;
        self.defaults.get(&ext.to_ascii_lowercase()).map(String::as_str)
    }
}
