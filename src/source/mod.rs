//! Record sources: everything that happens before the pivot.
//!
//! A [`RecordSource`] delivers cleaned [`Record`]s. Sources handle retrieval, CSV
//! parsing and column pruning; the pivot core never sees raw files. The catalog is
//! derived afterwards from exactly the records a source returned, which is what keeps
//! the core's "every path is in the catalog" precondition true.

mod file;
#[cfg(feature = "http-source")]
mod http;

pub use file::FileSource;
#[cfg(feature = "http-source")]
pub use http::HttpSource;

use crate::config::SourceConfig;
use crate::record::{Record, USER_ID};
use anyhow::{Result, bail};
use std::cmp::Ordering;

/// A provider of cleaned records.
pub trait RecordSource: Send + Sync {
    /// Human-readable description for logs.
    fn name(&self) -> String;

    /// Read every record, in source order.
    fn read_records(&self) -> Result<Vec<Record>>;
}

/// Records already in memory.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    records: Vec<Record>,
}

impl VecSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordSource for VecSource {
    fn name(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }

    fn read_records(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}

/// Build the source described by `cfg`: a local glob when `local_glob` is set,
/// otherwise HTTP retrieval of `files` under `base_url`.
pub fn from_config(cfg: &SourceConfig) -> Result<Box<dyn RecordSource>> {
    if let Some(pattern) = &cfg.local_glob {
        return Ok(Box::new(FileSource::from_glob(pattern, cfg)?));
    }
    remote_source(cfg)
}

#[cfg(feature = "http-source")]
fn remote_source(cfg: &SourceConfig) -> Result<Box<dyn RecordSource>> {
    Ok(Box::new(HttpSource::new(cfg)))
}

#[cfg(not(feature = "http-source"))]
fn remote_source(_cfg: &SourceConfig) -> Result<Box<dyn RecordSource>> {
    bail!("no local_glob configured and HTTP sources are disabled (feature `http-source`)")
}

/// Fail if any record's path is `user_id`, which would collide with the key column
/// of the wide table.
pub fn check_reserved_paths(records: &[Record]) -> Result<()> {
    if let Some((i, r)) = records.iter().enumerate().find(|(_, r)| r.path == USER_ID) {
        bail!(
            "record #{} (user '{}') uses the reserved path '{USER_ID}'",
            i + 1,
            r.user_id
        );
    }
    Ok(())
}

/// Order two user ids numerically when both are integers, lexicographically otherwise.
pub fn compare_user_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Stable sort by user id. Records of one user keep their relative order, so
/// last-write-wins still resolves to the record read last.
pub fn sort_by_user(records: &mut [Record]) {
    records.sort_by(|a, b| compare_user_ids(&a.user_id, &b.user_id));
}
