//! Table assembly: collecting per-user rows into one [`OutputTable`].
//!
//! The assembler appends rows in the order it receives them. It never re-sorts,
//! re-groups or deduplicates; the row order of the table is the first-seen user order
//! established by the pivot transformer.

use crate::catalog::PathCatalog;
use crate::error::{PivotError, Result};
use crate::record::USER_ID;
use crate::row::UserRow;
use std::sync::Arc;

/// Accumulates [`UserRow`]s under a single schema.
///
/// The schema is either fixed up front ([`with_catalog`](Self::with_catalog)) or taken
/// from the first row pushed.
#[derive(Debug, Default)]
pub struct TableAssembler {
    catalog: Option<Arc<PathCatalog>>,
    rows: Vec<UserRow>,
}

impl TableAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the schema so an assembler that never receives a row still knows its header.
    pub fn with_catalog(catalog: Arc<PathCatalog>) -> Self {
        Self {
            catalog: Some(catalog),
            rows: Vec::new(),
        }
    }

    /// Append one row.
    ///
    /// # Errors
    /// [`PivotError::SchemaMismatch`] if the row's columns differ from the established
    /// schema.
    pub fn push(&mut self, row: UserRow) -> Result<()> {
        let catalog = self
            .catalog
            .get_or_insert_with(|| Arc::clone(row.catalog()));
        if !row.has_schema(catalog) {
            return Err(PivotError::SchemaMismatch {
                user_id: row.user_id().to_string(),
                detail: format!(
                    "row columns {:?} differ from table columns {:?}",
                    row.catalog().paths(),
                    catalog.paths()
                ),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn extend<I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = UserRow>,
    {
        rows.into_iter().try_for_each(|row| self.push(row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn finish(self) -> OutputTable {
        OutputTable {
            catalog: self.catalog.unwrap_or_default(),
            rows: self.rows,
        }
    }
}

/// Assemble `rows` into a table whose schema is the first row's.
///
/// # Errors
/// See [`TableAssembler::push`].
pub fn assemble<I>(rows: I) -> Result<OutputTable>
where
    I: IntoIterator<Item = UserRow>,
{
    let mut assembler = TableAssembler::new();
    assembler.extend(rows)?;
    Ok(assembler.finish())
}

/// The finished wide table: `user_id` followed by one column per catalog path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputTable {
    catalog: Arc<PathCatalog>,
    rows: Vec<UserRow>,
}

impl OutputTable {
    /// Header in output order: `user_id`, then every catalog path.
    pub fn columns(&self) -> Vec<&str> {
        std::iter::once(USER_ID).chain(self.catalog.iter()).collect()
    }

    pub fn catalog(&self) -> &Arc<PathCatalog> {
        &self.catalog
    }

    pub fn rows(&self) -> &[UserRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<UserRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for `user_id`. Linear scan; tables are keyed by position, not by user.
    pub fn row(&self, user_id: &str) -> Option<&UserRow> {
        self.rows.iter().find(|r| r.user_id() == user_id)
    }

    /// Cell at (`user_id`, `path`).
    pub fn get(&self, user_id: &str, path: &str) -> Option<i64> {
        self.row(user_id)?.get(path)
    }

    /// Rows as header-aligned string fields, ready for a tabular writer.
    pub fn records(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows.iter().map(|row| {
            let mut fields = Vec::with_capacity(row.values().len() + 1);
            fields.push(row.user_id().to_string());
            fields.extend(row.values().iter().map(i64::to_string));
            fields
        })
    }
}
