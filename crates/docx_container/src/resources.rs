//! Embedded resources
//!
//! Images are registered as lazy sources and only read when the package is
//! written; fonts arrive as finished byte blobs.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Produces the bytes of an embedded resource on demand.
///
/// The source is consumed by the read, so it runs at most once.
pub trait ResourceSource {
    fn read_bytes(self: Box<Self>) -> io::Result<Vec<u8>>;
}

impl<F> ResourceSource for F
where
    F: FnOnce() -> io::Result<Vec<u8>>,
{
    fn read_bytes(self: Box<Self>) -> io::Result<Vec<u8>> {
        (*self)()
    }
}

/// Bytes already held in memory
#[derive(Debug, Clone)]
pub struct InMemory(pub Vec<u8>);

impl ResourceSource for InMemory {
    fn read_bytes(self: Box<Self>) -> io::Result<Vec<u8>> {
        Ok(self.0)
    }
}

/// A file read from disk at write time
#[derive(Debug, Clone)]
pub struct FileSource(pub PathBuf);

impl ResourceSource for FileSource {
    fn read_bytes(self: Box<Self>) -> io::Result<Vec<u8>> {
        std::fs::read(&self.0)
    }
}

/// Resources keyed by package path, kept in registration order.
///
/// Registering the same path twice replaces the payload but keeps the
/// original position.
pub struct ResourceStore<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for ResourceStore<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> ResourceStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the resource at `path`
    pub fn insert(&mut self, path: impl Into<String>, value: T) {
        let path = path.into();
        match self.index.get(&path) {
            Some(&idx) => self.entries[idx].1 = value,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, value));
            }
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Package paths in registration order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(path, _)| path.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> IntoIterator for ResourceStore<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<T> fmt::Debug for ResourceStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.paths()).finish()
    }
}

/// Lazily read images
pub type ImageStore = ResourceStore<Box<dyn ResourceSource>>;

/// Embedded font blobs
pub type FontStore = ResourceStore<Vec<u8>>;
