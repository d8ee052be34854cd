//! Referential integrity checks for written packages
//!
//! Reads a package back and reports cross references that do not resolve:
//! relationship targets, content-type overrides and entries that no
//! declaration covers.

use crate::error::PackageResult;
use crate::part_names;
use crate::reader::PackageReader;
use crate::relationships::TargetMode;
use std::collections::HashSet;
use std::io::{Read, Seek};
use thiserror::Error;

/// A broken cross reference found in a package
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityIssue {
    /// An internal relationship points at an entry that does not exist
    #[error("{rels_part}: relationship {id} targets missing entry {target}")]
    DanglingRelationship {
        rels_part: String,
        id: String,
        target: String,
    },

    /// Two relationships in one rels part share an id
    #[error("{rels_part}: duplicate relationship id {id}")]
    DuplicateRelationshipId { rels_part: String, id: String },

    /// An override names a part that is not in the archive
    #[error("override for missing part {part_name}")]
    OverrideWithoutPart { part_name: String },

    /// An entry has neither an override nor a default for its extension
    #[error("no content type for {entry}")]
    MissingContentType { entry: String },

    /// A default is declared more than once
    #[error("duplicate default for extension {extension}")]
    DuplicateDefaultExtension { extension: String },
}

/// Map a rels part to the directory its targets are resolved against.
///
/// `word/_rels/document.xml.rels` resolves against `word/`, `_rels/.rels`
/// against the package root.
fn base_dir(rels_part: &str) -> String {
    match rels_part.rsplit_once("_rels/") {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}

/// Resolve a relationship target to an entry name
fn resolve_target(base: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("{}{}", base, target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Check every cross reference in the package
pub fn check_integrity<R: Read + Seek>(
    reader: &mut PackageReader<R>,
) -> PackageResult<Vec<IntegrityIssue>> {
    let entries = reader.entry_names();
    let present: HashSet<&str> = entries.iter().map(String::as_str).collect();
    let mut issues = Vec::new();

    for rels_part in entries.iter().filter(|name| name.ends_with(".rels")) {
        let base = base_dir(rels_part);
        let mut seen_ids = HashSet::new();

        for rel in reader.relationships(rels_part)? {
            if !seen_ids.insert(rel.id.clone()) {
                issues.push(IntegrityIssue::DuplicateRelationshipId {
                    rels_part: rels_part.clone(),
                    id: rel.id.clone(),
                });
            }
            if rel.target_mode == TargetMode::External {
                continue;
            }

            let resolved = resolve_target(&base, &rel.target);
            if !present.contains(resolved.as_str()) {
                issues.push(IntegrityIssue::DanglingRelationship {
                    rels_part: rels_part.clone(),
                    id: rel.id,
                    target: resolved,
                });
            }
        }
    }

    let manifest = reader.content_types()?;
    for extension in &manifest.duplicate_extensions {
        issues.push(IntegrityIssue::DuplicateDefaultExtension {
            extension: extension.clone(),
        });
    }

    let mut overridden: Vec<&String> = manifest.overrides.keys().collect();
    overridden.sort();
    for part_name in overridden {
        if !present.contains(part_name.trim_start_matches('/')) {
            issues.push(IntegrityIssue::OverrideWithoutPart {
                part_name: part_name.clone(),
            });
        }
    }

    for entry in &entries {
        if entry == part_names::CONTENT_TYPES || entry.ends_with('/') {
            continue;
        }
        if manifest.content_type_for(entry).is_none() {
            issues.push(IntegrityIssue::MissingContentType {
                entry: entry.clone(),
            });
        }
    }

    if issues.is_empty() {
        tracing::debug!(entries = entries.len(), "package integrity check passed");
    } else {
        tracing::debug!(issues = issues.len(), "package integrity check found issues");
    }
    Ok(issues)
}

impl<R: Read + Seek> PackageReader<R> {
    /// Check every cross reference in the package
    pub fn check_integrity(&mut self) -> PackageResult<Vec<IntegrityIssue>> {
        check_integrity(self)
    }
}
