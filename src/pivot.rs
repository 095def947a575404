//! The pivot transformer: long `(user_id, path, length)` records to wide per-user rows.
//!
//! Records are grouped by `user_id` in first-seen order. Each group becomes a fresh
//! [`UserRow`] holding one cell per catalog path, zero where the user has no record.
//!
//! # Example
//!
//! ```
//! use pathpivot::{pivot, Record};
//!
//! # fn main() -> anyhow::Result<()> {
//! let records = vec![
//!     Record::new("u1", "/a", 5),
//!     Record::new("u1", "/b", 3),
//!     Record::new("u2", "/a", 7),
//! ];
//! let table = pivot(&records)?;
//! assert_eq!(table.columns(), vec!["user_id", "/a", "/b"]);
//! assert_eq!(table.get("u2", "/b"), Some(0));
//! # Ok(())
//! # }
//! ```

use crate::catalog::PathCatalog;
use crate::error::{PivotError, Result};
use crate::record::Record;
use crate::row::UserRow;
use crate::table::{OutputTable, TableAssembler};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// What to do when a user has more than one record for the same path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later record's length replaces the earlier one.
    #[default]
    LastWriteWins,
    /// Fail with [`PivotError::DuplicatePath`].
    Reject,
}

/// Knobs for a pivot run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotOptions {
    pub duplicates: DuplicatePolicy,
    /// Build rows on the rayon pool instead of the calling thread.
    pub parallel: bool,
}

/// Builds [`UserRow`]s against a fixed catalog.
#[derive(Debug, Clone)]
pub struct PivotTransformer {
    catalog: Arc<PathCatalog>,
    options: PivotOptions,
}

impl PivotTransformer {
    pub fn new(catalog: impl Into<Arc<PathCatalog>>) -> Self {
        Self {
            catalog: catalog.into(),
            options: PivotOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PivotOptions) -> Self {
        self.options = options;
        self
    }

    pub fn catalog(&self) -> &Arc<PathCatalog> {
        &self.catalog
    }

    pub fn options(&self) -> PivotOptions {
        self.options
    }

    /// Transform with the execution mode selected in the options.
    pub fn run(&self, records: &[Record]) -> Result<Vec<UserRow>> {
        if self.options.parallel {
            self.transform_par(records)
        } else {
            self.transform(records)
        }
    }

    /// Group `records` by user and build one complete row per user, in first-seen
    /// user order.
    ///
    /// # Errors
    /// [`PivotError::SchemaMismatch`] if a record's path is not in the catalog;
    /// [`PivotError::DuplicatePath`] on a repeated path under [`DuplicatePolicy::Reject`].
    pub fn transform(&self, records: &[Record]) -> Result<Vec<UserRow>> {
        group_by_user(records)
            .into_iter()
            .map(|(user_id, group)| self.build_row(user_id, &group))
            .collect()
    }

    /// Same contract as [`transform`](Self::transform), with rows built in parallel.
    ///
    /// Groups are formed sequentially so the first-seen user order is fixed before
    /// any worker starts; rayon's ordered collect restores it afterwards. When several
    /// groups fail, which error is reported is unspecified.
    pub fn transform_par(&self, records: &[Record]) -> Result<Vec<UserRow>> {
        group_by_user(records)
            .into_par_iter()
            .map(|(user_id, group)| self.build_row(user_id, &group))
            .collect()
    }

    fn build_row(&self, user_id: &str, group: &[&Record]) -> Result<UserRow> {
        let mut values = vec![0i64; self.catalog.len()];
        let mut written = vec![false; self.catalog.len()];
        for r in group {
            let i = self
                .catalog
                .position(&r.path)
                .ok_or_else(|| PivotError::unknown_path(user_id, &r.path))?;
            if written[i] {
                match self.options.duplicates {
                    DuplicatePolicy::Reject => {
                        return Err(PivotError::DuplicatePath {
                            user_id: user_id.to_string(),
                            path: r.path.clone(),
                            first: values[i],
                            second: r.length,
                        });
                    }
                    DuplicatePolicy::LastWriteWins => {
                        debug!(user_id, path = %r.path, old = values[i], new = r.length, "overwriting duplicate path");
                    }
                }
            }
            values[i] = r.length;
            written[i] = true;
        }
        Ok(UserRow::new(user_id.to_string(), Arc::clone(&self.catalog), values))
    }
}

/// Partition records by `user_id`, keeping the order in which users first appear
/// and the record order within each user.
fn group_by_user(records: &[Record]) -> Vec<(&str, Vec<&Record>)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&Record>)> = Vec::new();
    for r in records {
        let slot = *slots.entry(r.user_id.as_str()).or_insert_with(|| {
            groups.push((r.user_id.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(r);
    }
    groups
}

/// Pivot `records` against `catalog` with default options.
///
/// # Errors
/// See [`PivotTransformer::transform`].
pub fn transform(records: &[Record], catalog: &PathCatalog) -> Result<Vec<UserRow>> {
    PivotTransformer::new(catalog.clone()).transform(records)
}

/// Derive the catalog from `records`, pivot, and assemble the output table.
///
/// Empty input yields an empty table whose only column is `user_id`.
pub fn pivot(records: &[Record]) -> Result<OutputTable> {
    pivot_with(records, PivotOptions::default())
}

/// [`pivot`] with explicit options.
pub fn pivot_with(records: &[Record], options: PivotOptions) -> Result<OutputTable> {
    let catalog = Arc::new(PathCatalog::from_records(records));
    if records.is_empty() {
        debug!("no input records; producing an empty table");
    }
    let transformer = PivotTransformer::new(Arc::clone(&catalog)).with_options(options);
    let rows = transformer.run(records)?;
    debug!(users = rows.len(), paths = catalog.len(), "pivoted records");
    let mut assembler = TableAssembler::with_catalog(catalog);
    assembler.extend(rows)?;
    Ok(assembler.finish())
}
