//! The path catalog: the authoritative, ordered set of output columns.

use crate::record::Record;
use std::collections::HashMap;

/// Distinct path values in first-seen order.
///
/// The enumeration order is the output column order for the whole run. A catalog is
/// built once before any row and is read-only afterwards, so pivot workers share it
/// behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct PathCatalog {
    paths: Vec<String>,
    index: HashMap<String, usize>,
}

impl PathCatalog {
    /// An empty catalog (zero path columns).
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the distinct paths of `records`, in the order they first appear.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut catalog = Self::new();
        for r in records {
            catalog.insert(&r.path);
        }
        catalog
    }

    /// Build a catalog from an explicit path list. Repeats collapse to the first one.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut catalog = Self::new();
        for p in paths {
            catalog.insert(p.as_ref());
        }
        catalog
    }

    fn insert(&mut self, path: &str) {
        if !self.index.contains_key(path) {
            self.index.insert(path.to_string(), self.paths.len());
            self.paths.push(path.to_string());
        }
    }

    /// Column position of `path`, if the catalog knows it.
    pub fn position(&self, path: &str) -> Option<usize> {
        self.index.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }
}

// Equality is defined by the ordered path list; the index is derived from it.
impl PartialEq for PathCatalog {
    fn eq(&self, other: &Self) -> bool {
        self.paths == other.paths
    }
}

impl Eq for PathCatalog {}
