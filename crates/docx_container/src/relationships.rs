//! Relationships (.rels) registry and generation
//!
//! Every relationship-bearing part owns one [`RelationshipRegistry`]. A
//! relationship is identified by its `(target, type, target mode)` key; the
//! registry hands out `rId<N>` identifiers in insertion order and always
//! returns the same identifier for a key it has already seen.

use crate::error::{PackageError, PackageResult};
use crate::namespaces;
use crate::reader::XmlParser;
use crate::relationship_types;
use crate::xml::XmlElement;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;

/// Target mode for relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetMode {
    /// Internal target within the package
    #[default]
    Internal,
    /// External target (URL)
    External,
}

impl TargetMode {
    /// Value of the `TargetMode` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMode::Internal => "Internal",
            TargetMode::External => "External",
        }
    }
}

/// Composite key identifying a relationship within one registry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipKey {
    /// Target path (relative to the source part) or URL
    pub target: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target mode (Internal or External)
    pub target_mode: TargetMode,
}

impl RelationshipKey {
    pub fn new(target: &str, rel_type: &str, target_mode: TargetMode) -> Self {
        Self {
            target: target.to_string(),
            rel_type: rel_type.to_string(),
            target_mode,
        }
    }
}

/// A single relationship as it appears in a .rels file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Unique ID within the rels file (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path (relative to the source part)
    pub target: String,
    /// Target mode (Internal or External)
    pub target_mode: TargetMode,
}

/// Key-to-identifier mapping for the relationships of one part
#[derive(Debug, Clone)]
pub struct RelationshipRegistry {
    ids: HashMap<RelationshipKey, String>,
    /// Keys in allocation order
    order: Vec<RelationshipKey>,
    /// Counter for generating new IDs
    next_id: u32,
}

impl Default for RelationshipRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            order: Vec::new(),
            next_id: 1,
        }
    }

    /// Create the registry for `word/document.xml`.
    ///
    /// Styles, web settings and the font table are registered first, so they
    /// always hold `rId1`, `rId2` and `rId3`.
    pub fn document() -> Self {
        let mut rels = Self::new();
        rels.add_or_get("styles.xml", relationship_types::STYLES, TargetMode::Internal);
        rels.add_or_get("webSettings.xml", relationship_types::WEB_SETTINGS, TargetMode::Internal);
        rels.add_or_get("fontTable.xml", relationship_types::FONT_TABLE, TargetMode::Internal);
        rels
    }

    /// Create the top-level `_rels/.rels` registry
    pub fn package() -> Self {
        let mut rels = Self::new();
        rels.add_or_get("word/document.xml", relationship_types::DOCUMENT, TargetMode::Internal);
        rels.add_or_get(
            "docProps/core.xml",
            relationship_types::CORE_PROPERTIES,
            TargetMode::Internal,
        );
        rels.add_or_get(
            "docProps/app.xml",
            relationship_types::EXTENDED_PROPERTIES,
            TargetMode::Internal,
        );
        rels
    }

    /// Look up the identifier of an existing relationship
    pub fn get(&self, target: &str, rel_type: &str, target_mode: TargetMode) -> Option<&str> {
        self.ids
            .get(&RelationshipKey::new(target, rel_type, target_mode))
            .map(String::as_str)
    }

    /// Return the identifier for the key, allocating the next one if it is new
    pub fn add_or_get(&mut self, target: &str, rel_type: &str, target_mode: TargetMode) -> String {
        let key = RelationshipKey::new(target, rel_type, target_mode);
        if let Some(id) = self.ids.get(&key) {
            return id.clone();
        }

        let id = format!("rId{}", self.next_id);
        self.next_id += 1;
        tracing::debug!(id = %id, target, rel_type, "allocated relationship");

        self.ids.insert(key.clone(), id.clone());
        self.order.push(key);
        id
    }

    /// Register an embedded image
    pub fn add_image(&mut self, target: &str) -> String {
        self.add_or_get(target, relationship_types::IMAGE, TargetMode::Internal)
    }

    /// Register an embedded font (used by the font table's registry)
    pub fn add_font(&mut self, target: &str) -> String {
        self.add_or_get(target, relationship_types::FONT, TargetMode::Internal)
    }

    /// Iterate over `(id, key)` pairs in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationshipKey)> {
        self.order
            .iter()
            .filter_map(move |key| self.ids.get(key).map(|id| (id.as_str(), key)))
    }

    /// Snapshot of all relationships in allocation order
    pub fn relationships(&self) -> Vec<Relationship> {
        self.iter()
            .map(|(id, key)| Relationship {
                id: id.to_string(),
                rel_type: key.rel_type.clone(),
                target: key.target.clone(),
                target_mode: key.target_mode,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Build the `Relationships` element
    pub fn to_element(&self) -> XmlElement {
        let mut root = XmlElement::new("Relationships").with_attr("xmlns", namespaces::PKG_REL);
        for (id, key) in self.iter() {
            let mut rel = XmlElement::new("Relationship")
                .with_attr("Id", id)
                .with_attr("Type", key.rel_type.as_str())
                .with_attr("Target", key.target.as_str());
            if key.target_mode == TargetMode::External {
                rel.set_attr("TargetMode", key.target_mode.as_str());
            }
            root.push_child(rel);
        }
        root
    }

    /// Generate XML content for the .rels file
    pub fn to_xml(&self, pretty: bool) -> PackageResult<String> {
        self.to_element().to_xml(pretty)
    }

    /// Generate compact XML content for the .rels file
    pub fn serialize(&self) -> PackageResult<String> {
        self.to_xml(false)
    }
}

fn required_attribute(event: &BytesStart, name: &[u8]) -> PackageResult<String> {
    XmlParser::get_attribute(event, name).ok_or_else(|| {
        PackageError::InvalidStructure(format!(
            "Relationship missing {}",
            String::from_utf8_lossy(name)
        ))
    })
}

/// Parse the relationships listed in a .rels file
pub fn parse_relationships(content: &str) -> PackageResult<Vec<Relationship>> {
    let mut result = Vec::new();
    let mut reader = XmlParser::from_string(content);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                let name = e.name();
                if XmlParser::matches_element(name.as_ref(), "Relationship") {
                    let id = required_attribute(e, b"Id")?;
                    let rel_type = required_attribute(e, b"Type")?;
                    let target = required_attribute(e, b"Target")?;
                    let target_mode = XmlParser::get_attribute(e, b"TargetMode")
                        .map(|m| {
                            if m == "External" {
                                TargetMode::External
                            } else {
                                TargetMode::Internal
                            }
                        })
                        .unwrap_or_default();

                    result.push(Relationship {
                        id,
                        rel_type,
                        target,
                        target_mode,
                    });
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
