//! DOCX container assembly
//!
//! Writes the packaging layer of a word-processing (OOXML) document: the
//! content-type manifest, relationship parts, core and extended properties,
//! the fixed web settings part and embedded images and fonts. The body, the
//! style sheet and the font table are produced elsewhere and handed in as
//! finished XML.
//!
//! # Example
//!
//! ```no_run
//! use docx_container::{write_docx, MetadataRecord, PackageAssembler};
//!
//! let mut assembler = PackageAssembler::new();
//! assembler.set_metadata(MetadataRecord::new("Sample").with_author("Ann"));
//! write_docx(assembler, "sample.docx").unwrap();
//! ```

pub mod api;
pub mod content_types;
pub mod error;
pub mod integrity;
pub mod language;
pub mod metadata;
pub mod reader;
pub mod relationships;
pub mod resources;
pub mod settings;
pub mod writer;
pub mod xml;

pub use api::{write_docx, write_docx_bytes};
pub use content_types::{
    extension_of, ContentTypeAggregator, ContentTypeEntry, ContentTypesManifest, MimeLookup,
    StandardMimeTypes,
};
pub use error::{PackageError, PackageResult};
pub use integrity::{check_integrity, IntegrityIssue};
pub use language::{IsoLanguageTable, LanguageCanonicalizer};
pub use metadata::{
    AmpersandAuthors, AuthorFormatter, MetadataRecord, MetadataTranslator, PropertiesDocument,
    SerialAuthors,
};
pub use reader::PackageReader;
pub use relationships::{
    parse_relationships, Relationship, RelationshipKey, RelationshipRegistry, TargetMode,
};
pub use resources::{FileSource, InMemory, ResourceSource};
pub use settings::{ContainerSettings, EntryCompression};
pub use writer::{OptionalPart, PackageAssembler};

/// XML namespaces
pub mod namespaces {
    pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    pub const R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    pub const PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    pub const CT: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
    pub const CP: &str =
        "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
    pub const EP: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";
}

/// Relationship types
pub mod relationship_types {
    pub const DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    pub const EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const WEB_SETTINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/webSettings";
    pub const FONT_TABLE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/fontTable";
    pub const IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    pub const FONT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/font";
    pub const HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    pub const NUMBERING: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
    pub const SETTINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const FOOTNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footnotes";
    pub const ENDNOTES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/endnotes";
    pub const THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
}

/// Content types
pub mod content_type_values {
    pub const DOCUMENT: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
    pub const STYLES: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
    pub const FONT_TABLE: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.fontTable+xml";
    pub const WEB_SETTINGS: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.webSettings+xml";
    pub const CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";
    pub const EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const OBFUSCATED_FONT: &str =
        "application/vnd.openxmlformats-officedocument.obfuscatedFont";
    pub const NUMBERING: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml";
    pub const SETTINGS: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
    pub const FOOTNOTES: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.footnotes+xml";
    pub const ENDNOTES: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.endnotes+xml";
    pub const THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
}

/// Fixed part names inside the package
pub mod part_names {
    pub const CONTENT_TYPES: &str = "[Content_Types].xml";
    pub const PACKAGE_RELS: &str = "_rels/.rels";
    pub const CORE_PROPERTIES: &str = "docProps/core.xml";
    pub const APP_PROPERTIES: &str = "docProps/app.xml";
    pub const WORD_DIR: &str = "word/";
    pub const DOCUMENT: &str = "word/document.xml";
    pub const STYLES: &str = "word/styles.xml";
    pub const FONT_TABLE: &str = "word/fontTable.xml";
    pub const WEB_SETTINGS: &str = "word/webSettings.xml";
    pub const DOCUMENT_RELS: &str = "word/_rels/document.xml.rels";
    pub const FONT_TABLE_RELS: &str = "word/_rels/fontTable.xml.rels";
}
