//! Package assembler
//!
//! Holds every part of a word-processing package until it is written:
//! collaborator-supplied XML, the per-part relationship registries, the
//! metadata record and the embedded resources. Each generated part is a pure
//! function of this state; [`PackageAssembler::write`] consumes the assembler
//! and writes all entries into a ZIP archive in a fixed order.

use crate::content_types::{ContentTypeAggregator, MimeLookup, StandardMimeTypes};
use crate::error::{PackageError, PackageResult};
use crate::metadata::{MetadataRecord, MetadataTranslator};
use crate::relationships::{RelationshipRegistry, TargetMode};
use crate::resources::{FontStore, ImageStore, ResourceSource};
use crate::settings::{ContainerSettings, EntryCompression};
use crate::xml::{ensure_declaration, XmlElement};
use crate::{content_type_values, namespaces, part_names, relationship_types};
use chrono::Utc;
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Parts that are only written when a collaborator supplies them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionalPart {
    Numbering,
    Settings,
    Footnotes,
    Endnotes,
    Theme,
}

impl OptionalPart {
    /// Path inside the package
    pub fn path(&self) -> &'static str {
        match self {
            OptionalPart::Numbering => "word/numbering.xml",
            OptionalPart::Settings => "word/settings.xml",
            OptionalPart::Footnotes => "word/footnotes.xml",
            OptionalPart::Endnotes => "word/endnotes.xml",
            OptionalPart::Theme => "word/theme/theme1.xml",
        }
    }

    /// Relationship target relative to `word/document.xml`
    pub fn target(&self) -> &'static str {
        self.path().trim_start_matches(part_names::WORD_DIR)
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OptionalPart::Numbering => content_type_values::NUMBERING,
            OptionalPart::Settings => content_type_values::SETTINGS,
            OptionalPart::Footnotes => content_type_values::FOOTNOTES,
            OptionalPart::Endnotes => content_type_values::ENDNOTES,
            OptionalPart::Theme => content_type_values::THEME,
        }
    }

    pub fn relationship_type(&self) -> &'static str {
        match self {
            OptionalPart::Numbering => relationship_types::NUMBERING,
            OptionalPart::Settings => relationship_types::SETTINGS,
            OptionalPart::Footnotes => relationship_types::FOOTNOTES,
            OptionalPart::Endnotes => relationship_types::ENDNOTES,
            OptionalPart::Theme => relationship_types::THEME,
        }
    }
}

/// Part paths that are always written, with their content types
const FIXED_PARTS: &[(&str, &str)] = &[
    (part_names::DOCUMENT, content_type_values::DOCUMENT),
    (part_names::STYLES, content_type_values::STYLES),
    (part_names::FONT_TABLE, content_type_values::FONT_TABLE),
    (part_names::WEB_SETTINGS, content_type_values::WEB_SETTINGS),
    (part_names::CORE_PROPERTIES, content_type_values::CORE_PROPERTIES),
    (part_names::APP_PROPERTIES, content_type_values::EXTENDED_PROPERTIES),
];

/// Entry names that embedded resources may never take
const RESERVED_ENTRIES: &[&str] = &[
    part_names::CONTENT_TYPES,
    part_names::PACKAGE_RELS,
    part_names::CORE_PROPERTIES,
    part_names::APP_PROPERTIES,
    part_names::WEB_SETTINGS,
    part_names::DOCUMENT,
    part_names::STYLES,
    part_names::FONT_TABLE,
    part_names::DOCUMENT_RELS,
    part_names::FONT_TABLE_RELS,
];

/// Assembles a word-processing package from pre-built parts
pub struct PackageAssembler {
    settings: ContainerSettings,
    translator: MetadataTranslator,
    mime: Box<dyn MimeLookup>,
    metadata: MetadataRecord,
    document_xml: Option<String>,
    styles_xml: Option<String>,
    font_table_xml: Option<String>,
    optional_parts: Vec<(OptionalPart, String)>,
    document_rels: RelationshipRegistry,
    font_table_rels: RelationshipRegistry,
    images: ImageStore,
    fonts: FontStore,
}

impl Default for PackageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageAssembler {
    /// Create an assembler with default settings
    pub fn new() -> Self {
        Self::with_settings(ContainerSettings::default())
    }

    /// Create an assembler with the given settings
    pub fn with_settings(settings: ContainerSettings) -> Self {
        Self {
            translator: MetadataTranslator::new(&settings),
            settings,
            mime: Box::new(StandardMimeTypes::new()),
            metadata: MetadataRecord::default(),
            document_xml: None,
            styles_xml: None,
            font_table_xml: None,
            optional_parts: Vec::new(),
            document_rels: RelationshipRegistry::document(),
            font_table_rels: RelationshipRegistry::new(),
            images: ImageStore::new(),
            fonts: FontStore::new(),
        }
    }

    /// Replace the extension-to-MIME lookup used for the content-type manifest
    pub fn with_mime_lookup(mut self, mime: impl MimeLookup + 'static) -> Self {
        self.mime = Box::new(mime);
        self
    }

    /// Replace the metadata translator
    pub fn with_translator(mut self, translator: MetadataTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    /// Set the main document body (`word/document.xml`)
    pub fn set_document(&mut self, xml: impl Into<String>) {
        self.document_xml = Some(xml.into());
    }

    /// Set the style sheet (`word/styles.xml`)
    pub fn set_styles(&mut self, xml: impl Into<String>) {
        self.styles_xml = Some(xml.into());
    }

    /// Set the font table (`word/fontTable.xml`)
    pub fn set_font_table(&mut self, xml: impl Into<String>) {
        self.font_table_xml = Some(xml.into());
    }

    pub fn set_metadata(&mut self, metadata: MetadataRecord) {
        self.metadata = metadata;
    }

    pub fn metadata(&self) -> &MetadataRecord {
        &self.metadata
    }

    /// Supply an optional part and register its relationship from the
    /// document. Returns the relationship id.
    pub fn set_optional_part(&mut self, kind: OptionalPart, xml: impl Into<String>) -> String {
        let xml = xml.into();
        match self.optional_parts.iter_mut().find(|(k, _)| *k == kind) {
            Some(slot) => slot.1 = xml,
            None => self.optional_parts.push((kind, xml)),
        }
        self.document_rels
            .add_or_get(kind.target(), kind.relationship_type(), TargetMode::Internal)
    }

    /// Register an image stored at `word/<target>` and referenced from the
    /// document. The source is read once, when the package is written.
    ///
    /// A leading `/` is ignored, so `"/media/a.png"` and `"media/a.png"` name
    /// the same image and share one relationship id.
    pub fn add_image(
        &mut self,
        target: &str,
        source: impl ResourceSource + 'static,
    ) -> PackageResult<String> {
        let (target, path) = Self::resource_path(target)?;
        if self.fonts.contains(&path) {
            return Err(PackageError::InvalidStructure(format!(
                "image target {} is already registered as a font",
                target
            )));
        }

        tracing::debug!(path = %path, "registered image");
        self.images.insert(path, Box::new(source));
        Ok(self.document_rels.add_image(&target))
    }

    /// Register a font stored at `word/<target>` and referenced from the
    /// font table.
    pub fn add_font(&mut self, target: &str, data: Vec<u8>) -> PackageResult<String> {
        let (target, path) = Self::resource_path(target)?;
        if self.images.contains(&path) {
            return Err(PackageError::InvalidStructure(format!(
                "font target {} is already registered as an image",
                target
            )));
        }

        tracing::debug!(path = %path, bytes = data.len(), "registered font");
        self.fonts.insert(path, data);
        Ok(self.font_table_rels.add_font(&target))
    }

    /// Normalize a resource target and map it to its entry name.
    ///
    /// Returns `(target, path)` where `target` is relative to `word/`.
    fn resource_path(target: &str) -> PackageResult<(String, String)> {
        let trimmed = target.trim_start_matches('/');
        let malformed = trimmed.is_empty()
            || trimmed
                .split('/')
                .any(|segment| matches!(segment, "" | "." | ".."));
        if malformed {
            return Err(PackageError::InvalidStructure(format!(
                "invalid resource target: {:?}",
                target
            )));
        }

        let path = format!("{}{}", part_names::WORD_DIR, trimmed);
        let optional = [
            OptionalPart::Numbering,
            OptionalPart::Settings,
            OptionalPart::Footnotes,
            OptionalPart::Endnotes,
            OptionalPart::Theme,
        ];
        if RESERVED_ENTRIES.contains(&path.as_str()) || optional.iter().any(|p| p.path() == path) {
            return Err(PackageError::InvalidStructure(format!(
                "resource target {} collides with a package part",
                target
            )));
        }
        Ok((trimmed.to_string(), path))
    }

    /// Relationships of `word/document.xml`
    pub fn document_relationships(&self) -> &RelationshipRegistry {
        &self.document_rels
    }

    pub fn document_relationships_mut(&mut self) -> &mut RelationshipRegistry {
        &mut self.document_rels
    }

    /// Relationships of `word/fontTable.xml`
    pub fn font_table_relationships(&self) -> &RelationshipRegistry {
        &self.font_table_rels
    }

    pub fn font_table_relationships_mut(&mut self) -> &mut RelationshipRegistry {
        &mut self.font_table_rels
    }

    /// Package paths of registered images, in registration order
    pub fn image_paths(&self) -> impl Iterator<Item = &str> {
        self.images.paths()
    }

    /// Package paths of registered fonts, in registration order
    pub fn font_paths(&self) -> impl Iterator<Item = &str> {
        self.fonts.paths()
    }

    fn overrides(&self) -> Vec<(&'static str, &'static str)> {
        FIXED_PARTS
            .iter()
            .copied()
            .chain(
                self.optional_parts
                    .iter()
                    .map(|(kind, _)| (kind.path(), kind.content_type())),
            )
            .collect()
    }

    /// `[Content_Types].xml`
    pub fn content_types_xml(&self) -> PackageResult<String> {
        let ct = ContentTypeAggregator::for_package(
            self.overrides(),
            self.images.paths().chain(self.fonts.paths()),
            self.mime.as_ref(),
        );
        ct.to_xml(self.settings.pretty_print)
    }

    /// `_rels/.rels`
    pub fn container_relationships_xml(&self) -> PackageResult<String> {
        RelationshipRegistry::package().to_xml(self.settings.pretty_print)
    }

    /// `docProps/core.xml`, stamped with the current time
    pub fn core_properties_xml(&self) -> PackageResult<String> {
        self.translator
            .core_properties(&self.metadata, Utc::now())
            .to_xml(self.settings.pretty_print)
    }

    /// `docProps/app.xml`
    pub fn app_properties_xml(&self) -> PackageResult<String> {
        self.translator
            .app_properties(&self.metadata)
            .to_xml(self.settings.pretty_print)
    }

    /// `word/webSettings.xml`
    pub fn web_settings_xml(&self) -> PackageResult<String> {
        XmlElement::new("w:webSettings")
            .with_attr("xmlns:w", namespaces::W)
            .with_child(XmlElement::new("w:optimizeForBrowser"))
            .with_child(XmlElement::new("w:allowPNG"))
            .with_child(XmlElement::new("w:doNotSaveAsSingleFile"))
            .to_xml(self.settings.pretty_print)
    }

    fn supplied_or_default(
        &self,
        supplied: &Option<String>,
        default: impl FnOnce() -> XmlElement,
    ) -> PackageResult<String> {
        match supplied {
            Some(xml) => Ok(ensure_declaration(xml)),
            None => default().to_xml(self.settings.pretty_print),
        }
    }

    /// `word/document.xml`
    pub fn document_xml(&self) -> PackageResult<String> {
        self.supplied_or_default(&self.document_xml, || {
            XmlElement::new("w:document")
                .with_attr("xmlns:w", namespaces::W)
                .with_attr("xmlns:r", namespaces::R)
                .with_child(XmlElement::new("w:body"))
        })
    }

    /// `word/styles.xml`
    pub fn styles_xml(&self) -> PackageResult<String> {
        self.supplied_or_default(&self.styles_xml, || {
            XmlElement::new("w:styles").with_attr("xmlns:w", namespaces::W)
        })
    }

    /// `word/fontTable.xml`
    pub fn font_table_xml(&self) -> PackageResult<String> {
        self.supplied_or_default(&self.font_table_xml, || {
            XmlElement::new("w:fonts")
                .with_attr("xmlns:w", namespaces::W)
                .with_attr("xmlns:r", namespaces::R)
        })
    }

    /// Write the complete package and return the underlying writer.
    ///
    /// Any failure, including an image source failing to read, aborts the
    /// write; the target may then hold a partial archive.
    pub fn write<W: Write + Seek>(self, target: W) -> PackageResult<W> {
        let pretty = self.settings.pretty_print;
        let (core_xml, app_xml) = self.translator.translate_at(&self.metadata, Utc::now())?;

        let mut parts: Vec<(&'static str, String)> = vec![
            (part_names::CONTENT_TYPES, self.content_types_xml()?),
            (part_names::PACKAGE_RELS, self.container_relationships_xml()?),
            (part_names::CORE_PROPERTIES, core_xml),
            (part_names::APP_PROPERTIES, app_xml),
            (part_names::WEB_SETTINGS, self.web_settings_xml()?),
            (part_names::DOCUMENT, self.document_xml()?),
            (part_names::STYLES, self.styles_xml()?),
            (part_names::FONT_TABLE, self.font_table_xml()?),
            (part_names::DOCUMENT_RELS, self.document_rels.to_xml(pretty)?),
            (part_names::FONT_TABLE_RELS, self.font_table_rels.to_xml(pretty)?),
        ];
        for (kind, xml) in &self.optional_parts {
            parts.push((kind.path(), ensure_declaration(xml)));
        }

        let Self {
            settings,
            images,
            fonts,
            ..
        } = self;

        let mut zip = ZipWriter::new(target);
        for (path, xml) in &parts {
            write_entry(&mut zip, path, xml.as_bytes(), settings.xml_compression)?;
        }

        let image_count = images.len();
        for (path, source) in images {
            let data = source.read_bytes().map_err(|source| PackageError::ResourceRead {
                name: path.clone(),
                source,
            })?;
            write_entry(&mut zip, &path, &data, settings.media_compression)?;
        }

        let font_count = fonts.len();
        for (path, data) in fonts {
            write_entry(&mut zip, &path, &data, settings.media_compression)?;
        }

        let inner = zip.finish()?;
        tracing::info!(
            parts = parts.len(),
            images = image_count,
            fonts = font_count,
            "wrote docx package"
        );
        Ok(inner)
    }
}

/// Write one entry into the archive
fn write_entry<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    path: &str,
    data: &[u8],
    compression: EntryCompression,
) -> PackageResult<()> {
    let options = SimpleFileOptions::default().compression_method(compression.into());

    zip.start_file(path, options)?;
    zip.write_all(data).map_err(|source| PackageError::EntryWrite {
        entry: path.to_string(),
        source,
    })?;

    tracing::debug!(entry = path, bytes = data.len(), "wrote package entry");
    Ok(())
}
