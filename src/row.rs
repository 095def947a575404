//! Wide-format output rows.

use crate::catalog::PathCatalog;
use std::sync::Arc;

/// One user's complete row: a value for every path of the catalog it was built against.
///
/// Values are dense: position `i` holds the length for `catalog.paths()[i]`. A row
/// cannot be constructed with a different width than its catalog, so missing or extra
/// columns are ruled out by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    user_id: String,
    catalog: Arc<PathCatalog>,
    values: Box<[i64]>,
}

impl UserRow {
    /// Only the pivot transformer builds rows; it guarantees `values.len() == catalog.len()`.
    pub(crate) fn new(user_id: String, catalog: Arc<PathCatalog>, values: Vec<i64>) -> Self {
        debug_assert_eq!(values.len(), catalog.len());
        Self {
            user_id,
            catalog,
            values: values.into_boxed_slice(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The catalog that defines this row's columns.
    pub fn catalog(&self) -> &Arc<PathCatalog> {
        &self.catalog
    }

    /// Lengths in catalog order.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Length for `path`, or `None` if the path is not a column of this row.
    pub fn get(&self, path: &str) -> Option<i64> {
        self.catalog.position(path).map(|i| self.values[i])
    }

    /// `(path, length)` pairs in column order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, i64)> {
        self.catalog.iter().zip(self.values.iter().copied())
    }

    /// Whether this row has exactly the columns of `catalog`, in the same order.
    pub fn has_schema(&self, catalog: &PathCatalog) -> bool {
        std::ptr::eq(self.catalog.as_ref(), catalog) || self.catalog.as_ref() == catalog
    }
}
