//! XML element tree and serialization helpers
//!
//! Parts are assembled as small in-memory trees and written through
//! quick-xml, so text and attribute values are always escaped and every
//! serialized part carries the same UTF-8 declaration.

use crate::error::PackageResult;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// XML declaration written at the top of every generated part
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// An XML element with a qualified name, attributes, optional text and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element with the given qualified name (e.g. "dc:title")
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Add an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Set the text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Append a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Set an attribute, replacing any previous value for the same key
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Append a child element
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Remove every direct child with the given qualified name.
    /// Returns the number of removed children.
    pub fn remove_children_named(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|c| c.name != name);
        before - self.children.len()
    }

    /// Iterate over direct children with the given qualified name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Serialize this element as a complete XML document.
    ///
    /// The output always starts with [`XML_DECLARATION`]. When `pretty` is
    /// false the body is written compactly with no whitespace between tags.
    pub fn to_xml(&self, pretty: bool) -> PackageResult<String> {
        let body = if pretty {
            let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
            write_element(&mut writer, self)?;
            writer.into_inner()
        } else {
            let mut writer = Writer::new(Vec::new());
            write_element(&mut writer, self)?;
            writer.into_inner()
        };

        let mut xml = String::with_capacity(XML_DECLARATION.len() + body.len() + 1);
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        xml.push_str(&String::from_utf8(body)?);
        Ok(xml)
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> PackageResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

/// Prepend the standard declaration to externally built XML that lacks one
pub fn ensure_declaration(xml: &str) -> String {
    if xml.trim_start().starts_with("<?xml") {
        xml.to_string()
    } else {
        format!("{}\n{}", XML_DECLARATION, xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlElement {
        XmlElement::new("w:webSettings")
            .with_attr("xmlns:w", "http://schemas.openxmlformats.org/wordprocessingml/2006/main")
            .with_child(XmlElement::new("w:optimizeForBrowser"))
            .with_child(XmlElement::new("w:allowPNG"))
    }

    #[test]
    fn test_compact_output() {
        let xml = sample().to_xml(false).unwrap();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<w:optimizeForBrowser/><w:allowPNG/>"));
        assert_eq!(xml.lines().count(), 2);
    }

    #[test]
    fn test_pretty_output() {
        let xml = sample().to_xml(true).unwrap();
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.lines().count() > 2);
        assert!(xml.contains("  <w:allowPNG/>"));
    }

    #[test]
    fn test_text_and_attribute_escaping() {
        let xml = XmlElement::new("dc:title")
            .with_attr("note", "a \"quoted\" <value>")
            .with_text("Tom & Jerry <3")
            .to_xml(false)
            .unwrap();
        assert!(xml.contains("Tom &amp; Jerry &lt;3"));
        assert!(xml.contains("&quot;quoted&quot;"));
    }

    #[test]
    fn test_remove_children_named() {
        let mut root = XmlElement::new("root")
            .with_child(XmlElement::new("a").with_text("1"))
            .with_child(XmlElement::new("b"))
            .with_child(XmlElement::new("a").with_text("2"));
        assert_eq!(root.remove_children_named("a"), 2);
        assert_eq!(root.children().len(), 1);
        assert_eq!(root.children_named("b").count(), 1);
    }

    #[test]
    fn test_set_attr_replaces() {
        let mut el = XmlElement::new("x").with_attr("k", "1");
        el.set_attr("k", "2");
        assert_eq!(el.attribute("k"), Some("2"));
    }

    #[test]
    fn test_ensure_declaration() {
        let bare = "<w:document/>";
        assert!(ensure_declaration(bare).starts_with(XML_DECLARATION));
        let declared = format!("{}\n<w:document/>", XML_DECLARATION);
        assert_eq!(ensure_declaration(&declared), declared);
    }
}
