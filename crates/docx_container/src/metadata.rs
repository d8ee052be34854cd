//! Core and extended document properties
//!
//! Translates an ebook [`MetadataRecord`] into `docProps/core.xml` and
//! `docProps/app.xml`. Setting a property always replaces any earlier element
//! with the same qualified name, so a properties document never holds two
//! titles, two creators and so on.

use crate::error::PackageResult;
use crate::language::{IsoLanguageTable, LanguageCanonicalizer};
use crate::namespaces;
use crate::settings::ContainerSettings;
use crate::xml::XmlElement;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Metadata handed over by the ebook metadata collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataRecord {
    pub title: String,
    /// Authors in display order
    pub authors: Vec<String>,
    pub tags: BTreeSet<String>,
    pub comments: Option<String>,
    /// Language tags, most relevant first
    pub languages: Vec<String>,
    pub publisher: Option<String>,
}

impl MetadataRecord {
    /// Create a record with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = Some(comments.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }
}

/// Joins an author list into the single `dc:creator` string
pub trait AuthorFormatter {
    fn format_authors(&self, authors: &[String]) -> String;
}

/// "A", "A & B", "A, B & C"
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialAuthors;

impl AuthorFormatter for SerialAuthors {
    fn format_authors(&self, authors: &[String]) -> String {
        let names: Vec<&str> = authors
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .collect();

        match names.split_last() {
            None => String::new(),
            Some((last, [])) => last.to_string(),
            Some((last, rest)) => format!("{} & {}", rest.join(", "), last),
        }
    }
}

/// Joins every author with " & ", doubling literal ampersands so the list can
/// be split apart again unambiguously.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmpersandAuthors;

impl AuthorFormatter for AmpersandAuthors {
    fn format_authors(&self, authors: &[String]) -> String {
        authors
            .iter()
            .filter(|a| !a.is_empty())
            .map(|a| a.replace('&', "&&"))
            .collect::<Vec<_>>()
            .join(" & ")
    }
}

/// A properties part whose direct children are unique by qualified name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertiesDocument {
    root: XmlElement,
}

impl PropertiesDocument {
    /// Empty `cp:coreProperties` document with the core namespaces declared
    pub fn core() -> Self {
        Self {
            root: XmlElement::new("cp:coreProperties")
                .with_attr("xmlns:cp", namespaces::CP)
                .with_attr("xmlns:dc", namespaces::DC)
                .with_attr("xmlns:dcterms", namespaces::DCTERMS)
                .with_attr("xmlns:xsi", namespaces::XSI),
        }
    }

    /// Empty extended `Properties` document
    pub fn extended() -> Self {
        Self {
            root: XmlElement::new("Properties").with_attr("xmlns", namespaces::EP),
        }
    }

    /// Set a text property, replacing any element with the same name
    pub fn set(&mut self, name: &str, text: &str) {
        self.set_element(XmlElement::new(name).with_text(text));
    }

    /// Insert an element, first removing every element with the same name
    pub fn set_element(&mut self, element: XmlElement) {
        self.root.remove_children_named(element.name());
        self.root.push_child(element);
    }

    /// First element with the given qualified name
    pub fn get(&self, name: &str) -> Option<&XmlElement> {
        self.root.children().iter().find(|c| c.name() == name)
    }

    /// Number of elements with the given qualified name
    pub fn count(&self, name: &str) -> usize {
        self.root.children().iter().filter(|c| c.name() == name).count()
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn to_xml(&self, pretty: bool) -> PackageResult<String> {
        self.root.to_xml(pretty)
    }
}

/// Format a timestamp as W3CDTF with second precision and a `Z` suffix
pub fn w3cdtf(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Format a semantic version as `MM.mmmm` for `AppVersion`
pub fn app_version(version: &str) -> String {
    let mut parts = version
        .split('.')
        .map(|p| p.trim().parse::<u32>().unwrap_or(0));
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    format!("{:02}.{:04}", major, minor)
}

/// Converts a [`MetadataRecord`] into the two property parts
pub struct MetadataTranslator {
    application_name: String,
    application_version: String,
    last_modified_by: String,
    pretty_print: bool,
    authors: Box<dyn AuthorFormatter>,
    languages: Box<dyn LanguageCanonicalizer>,
}

impl MetadataTranslator {
    /// Translator using [`SerialAuthors`] ("A, B & C") and [`IsoLanguageTable`].
    ///
    /// Pipelines that split `dc:creator` back on " & " should install
    /// [`AmpersandAuthors`] with [`with_author_formatter`](Self::with_author_formatter).
    pub fn new(settings: &ContainerSettings) -> Self {
        Self {
            application_name: settings.application_name.clone(),
            application_version: settings.application_version.clone(),
            last_modified_by: settings.last_modified_by.clone(),
            pretty_print: settings.pretty_print,
            authors: Box::new(SerialAuthors),
            languages: Box::new(IsoLanguageTable),
        }
    }

    /// Replace the author join used for `dc:creator`
    pub fn with_author_formatter(mut self, formatter: impl AuthorFormatter + 'static) -> Self {
        self.authors = Box::new(formatter);
        self
    }

    /// Replace the language canonicalizer used for `dc:language`
    pub fn with_language_canonicalizer(
        mut self,
        canonicalizer: impl LanguageCanonicalizer + 'static,
    ) -> Self {
        self.languages = Box::new(canonicalizer);
        self
    }

    /// Produce `(core.xml, app.xml)` stamped with the current time
    pub fn translate(&self, record: &MetadataRecord) -> PackageResult<(String, String)> {
        self.translate_at(record, Utc::now())
    }

    /// Produce `(core.xml, app.xml)` stamped with `now`
    pub fn translate_at(
        &self,
        record: &MetadataRecord,
        now: DateTime<Utc>,
    ) -> PackageResult<(String, String)> {
        let core = self.core_properties(record, now).to_xml(self.pretty_print)?;
        let app = self.app_properties(record).to_xml(self.pretty_print)?;
        Ok((core, app))
    }

    /// Build the core properties document
    pub fn core_properties(
        &self,
        record: &MetadataRecord,
        now: DateTime<Utc>,
    ) -> PropertiesDocument {
        let mut doc = PropertiesDocument::core();
        doc.set("cp:revision", "1");
        doc.set("cp:lastModifiedBy", &self.last_modified_by);

        let timestamp = w3cdtf(now);
        for name in ["dcterms:created", "dcterms:modified"] {
            doc.set_element(
                XmlElement::new(name)
                    .with_attr("xsi:type", "dcterms:W3CDTF")
                    .with_text(timestamp.as_str()),
            );
        }

        self.update_core_properties(&mut doc, record);
        doc
    }

    /// Apply the record's fields to an existing core properties document
    pub fn update_core_properties(&self, doc: &mut PropertiesDocument, record: &MetadataRecord) {
        doc.set("dc:title", &record.title);
        doc.set("dc:creator", &self.authors.format_authors(&record.authors));

        if !record.tags.is_empty() {
            let keywords = record
                .tags
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            doc.set("cp:keywords", &keywords);
        }

        if let Some(comments) = record.comments.as_deref().filter(|c| !c.is_empty()) {
            doc.set("dc:description", comments);
        }

        if let Some(language) = record.languages.first() {
            doc.set("dc:language", &self.languages.language_value(language));
        }
    }

    /// Build the extended (application) properties document
    pub fn app_properties(&self, record: &MetadataRecord) -> PropertiesDocument {
        let mut doc = PropertiesDocument::extended();
        doc.set("Application", &self.application_name);
        doc.set("AppVersion", &app_version(&self.application_version));
        doc.set("DocSecurity", "0");
        doc.set("HyperlinksChanged", "false");
        doc.set("LinksUpToDate", "true");
        doc.set("ScaleCrop", "false");
        doc.set("SharedDoc", "false");
        if let Some(publisher) = record.publisher.as_deref().filter(|p| !p.is_empty()) {
            doc.set("Company", publisher);
        }
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn translator() -> MetadataTranslator {
        MetadataTranslator::new(&ContainerSettings::default())
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_serial_authors() {
        let f = SerialAuthors;
        assert_eq!(f.format_authors(&names(&[])), "");
        assert_eq!(f.format_authors(&names(&["A"])), "A");
        assert_eq!(f.format_authors(&names(&["A", "B"])), "A & B");
        assert_eq!(f.format_authors(&names(&["A", "B", "C"])), "A, B & C");
        assert_eq!(f.format_authors(&names(&["A", " "])), "A");
    }

    #[test]
    fn test_ampersand_authors() {
        let f = AmpersandAuthors;
        assert_eq!(f.format_authors(&names(&["A", "B", "C"])), "A & B & C");
        assert_eq!(f.format_authors(&names(&["Smith & Sons"])), "Smith && Sons");
    }

    #[test]
    fn test_w3cdtf_has_no_fraction() {
        let ts = w3cdtf(Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap());
        assert_eq!(ts, "2024-03-09T14:05:07Z");
        assert!(!w3cdtf(Utc::now()).contains('.'));
    }

    #[test]
    fn test_app_version_format() {
        assert_eq!(app_version("0.1.0"), "00.0001");
        assert_eq!(app_version("7.12.3"), "07.0012");
        assert_eq!(app_version("garbage"), "00.0000");
    }

    #[test]
    fn test_sample_scenario() {
        let record = MetadataRecord::new("Sample")
            .with_author("A. Author")
            .with_language("en");
        let doc = translator().core_properties(&record, fixed_now());
        let xml = doc.to_xml(false).unwrap();

        assert!(!xml.contains("cp:keywords"));
        assert!(!xml.contains("dc:description"));
        assert!(xml.contains("<dc:creator>A. Author</dc:creator>"));
        assert!(xml.contains("<dc:language>en</dc:language>"));
        assert!(xml.contains(
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">2024-03-09T14:05:07Z</dcterms:created>"#
        ));
        assert!(xml.contains(
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">2024-03-09T14:05:07Z</dcterms:modified>"#
        ));
        assert!(xml.contains("<cp:revision>1</cp:revision>"));
    }

    #[test]
    fn test_update_replaces_instead_of_appending() {
        let t = translator();
        let mut doc = t.core_properties(&MetadataRecord::new("First"), fixed_now());
        t.update_core_properties(&mut doc, &MetadataRecord::new("Second").with_tag("x"));
        t.update_core_properties(&mut doc, &MetadataRecord::new("Second").with_tag("x"));

        assert_eq!(doc.count("dc:title"), 1);
        assert_eq!(doc.get("dc:title").and_then(|e| e.text()), Some("Second"));
        assert_eq!(doc.count("dc:creator"), 1);
        assert_eq!(doc.count("cp:keywords"), 1);
    }

    #[test]
    fn test_lookup_outlives_name_argument() {
        let doc = translator().core_properties(&MetadataRecord::new("Kept"), fixed_now());
        let title = {
            let name = String::from("dc:title");
            doc.get(&name)
        };
        assert_eq!(title.and_then(|e| e.text()), Some("Kept"));
    }

    #[test]
    fn test_default_formatter_is_serial() {
        let record = MetadataRecord::new("T").with_author("A").with_author("B").with_author("C");
        let doc = translator().core_properties(&record, fixed_now());
        assert_eq!(doc.get("dc:creator").and_then(|e| e.text()), Some("A, B & C"));
    }

    #[test]
    fn test_keywords_and_description() {
        let record = MetadataRecord::new("T")
            .with_tag("fantasy")
            .with_tag("adventure")
            .with_comments("A long story");
        let doc = translator().core_properties(&record, fixed_now());

        assert_eq!(
            doc.get("cp:keywords").and_then(|e| e.text()),
            Some("adventure, fantasy")
        );
        assert_eq!(doc.get("dc:description").and_then(|e| e.text()), Some("A long story"));
    }

    #[test]
    fn test_empty_comments_are_omitted() {
        let record = MetadataRecord::new("T").with_comments("");
        let doc = translator().core_properties(&record, fixed_now());
        assert_eq!(doc.count("dc:description"), 0);
    }

    #[test]
    fn test_unknown_language_kept_verbatim() {
        let record = MetadataRecord::new("T").with_language("tlh-Latn");
        let doc = translator().core_properties(&record, fixed_now());
        assert_eq!(doc.get("dc:language").and_then(|e| e.text()), Some("tlh-Latn"));
    }

    #[test]
    fn test_custom_author_formatter() {
        let t = translator().with_author_formatter(AmpersandAuthors);
        let record = MetadataRecord::new("T").with_author("A").with_author("B").with_author("C");
        let doc = t.core_properties(&record, fixed_now());
        assert_eq!(doc.get("dc:creator").and_then(|e| e.text()), Some("A & B & C"));
    }

    #[test]
    fn test_app_properties() {
        let t = translator();
        let plain = t.app_properties(&MetadataRecord::new("T"));
        assert_eq!(plain.count("Company"), 0);
        assert_eq!(plain.get("DocSecurity").and_then(|e| e.text()), Some("0"));
        assert_eq!(plain.get("LinksUpToDate").and_then(|e| e.text()), Some("true"));

        let with_company = t.app_properties(&MetadataRecord::new("T").with_publisher("ACME"));
        assert_eq!(with_company.get("Company").and_then(|e| e.text()), Some("ACME"));

        let xml = with_company.to_xml(false).unwrap();
        assert!(xml.contains(namespaces::EP));
    }

    #[test]
    fn test_translate_returns_both_parts() {
        let (core, app) = translator()
            .translate(&MetadataRecord::new("Only title"))
            .unwrap();
        assert!(core.contains("<dc:title>Only title</dc:title>"));
        assert!(app.contains("<Application>"));
    }

    #[test]
    fn test_record_from_json() {
        let record: MetadataRecord =
            serde_json::from_str(r#"{"title":"T","authors":["A"],"languages":["de"]}"#).unwrap();
        assert_eq!(record.authors, vec!["A".to_string()]);
        assert!(record.tags.is_empty());
        assert!(record.publisher.is_none());
    }
}
