//! ZIP archive reading and XML parsing utilities
//!
//! Used to read a written package back for integrity checks.

use crate::content_types::ContentTypesManifest;
use crate::error::{PackageError, PackageResult};
use crate::relationships::{parse_relationships, Relationship};
use quick_xml::events::BytesStart;
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// A wrapper around a ZIP archive for reading a written package
pub struct PackageReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> PackageReader<R> {
    /// Open a package from a source that implements Read + Seek
    pub fn new(reader: R) -> PackageResult<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self { archive })
    }

    /// Read an entry as a string
    pub fn read_part_string(&mut self, path: &str) -> PackageResult<String> {
        let bytes = self.read_part_bytes(path)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Read an entry as bytes
    pub fn read_part_bytes(&mut self, path: &str) -> PackageResult<Vec<u8>> {
        let mut file = self.archive.by_name(path).map_err(|e| {
            if matches!(e, zip::result::ZipError::FileNotFound) {
                PackageError::MissingPart(path.to_string())
            } else {
                PackageError::from(e)
            }
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Check if an entry exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.archive.file_names().any(|name| name == path)
    }

    /// Entry names in archive order
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Parse the relationships stored at `rels_path`
    pub fn relationships(&mut self, rels_path: &str) -> PackageResult<Vec<Relationship>> {
        let xml = self.read_part_string(rels_path)?;
        parse_relationships(&xml)
    }

    /// Parse `[Content_Types].xml`
    pub fn content_types(&mut self) -> PackageResult<ContentTypesManifest> {
        let xml = self.read_part_string(crate::part_names::CONTENT_TYPES)?;
        ContentTypesManifest::parse(&xml)
    }
}

/// XML reader helpers
pub struct XmlParser;

impl XmlParser {
    /// Create a new XML reader from a string
    pub fn from_string(content: &str) -> Reader<&[u8]> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);
        reader
    }

    /// Get an attribute value from an element
    pub fn get_attribute(event: &BytesStart, name: &[u8]) -> Option<String> {
        event
            .attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == name)
            .map(|a| String::from_utf8_lossy(&a.value).to_string())
    }

    /// Check if an element name matches with optional namespace prefix
    pub fn matches_element(name: &[u8], expected: &str) -> bool {
        let name_str = std::str::from_utf8(name).unwrap_or("");
        name_str == expected || name_str.ends_with(&format!(":{}", expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_element() {
        assert!(XmlParser::matches_element(b"Override", "Override"));
        assert!(XmlParser::matches_element(b"ct:Override", "Override"));
        assert!(!XmlParser::matches_element(b"Default", "Override"));
    }

    #[test]
    fn test_get_attribute() {
        let xml = r#"<Default Extension="png" ContentType="image/png"/>"#;
        let mut reader = XmlParser::from_string(xml);
        let mut buf = Vec::new();
        match reader.read_event_into(&mut buf).unwrap() {
            quick_xml::events::Event::Empty(e) => {
                assert_eq!(XmlParser::get_attribute(&e, b"Extension").as_deref(), Some("png"));
                assert!(XmlParser::get_attribute(&e, b"PartName").is_none());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let garbage = std::io::Cursor::new(b"not a zip".to_vec());
        assert!(PackageReader::new(garbage).is_err());
    }
}
