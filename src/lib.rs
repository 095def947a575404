//! # pathpivot
//!
//! Reshapes long-format `(user_id, path, length)` event records into a dense wide
//! table: one row per user, one column per distinct path, zero where a user never hit
//! a path.
//!
//! ## Quick start
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
//!
//! assert_eq!(table.columns(), vec!["user_id", "/a", "/b"]);
//! assert_eq!(table.get("u1", "/b"), Some(3));
//! assert_eq!(table.get("u2", "/b"), Some(0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core
//!
//! - [`PathCatalog`] - the distinct paths in first-seen order; it fixes the columns
//! - [`PivotTransformer`] - groups records by user and builds one complete [`UserRow`]
//!   per user, sequentially or on the rayon pool
//! - [`TableAssembler`] - appends rows into an [`OutputTable`] under a single schema
//!
//! The core is pure and synchronous. It fails only with [`PivotError`]: a record whose
//! path is not in the catalog, a row built against a different catalog, or a repeated
//! `(user, path)` pair under [`DuplicatePolicy::Reject`].
//!
//! ## Collaborators
//!
//! - [`source`] - CSV records from local files (glob) or HTTP, with column pruning
//! - [`sink`] - CSV, JSON Lines and Parquet output
//! - [`pipeline`] - wires a source, the core and a sink together
//! - [`config`] - serde-backed run configuration
//!
//! ## Feature flags
//!
//! - `io-parquet` - Parquet sink (Arrow)
//! - `http-source` - HTTP record source (`ureq`)
//! - `compression-gzip`, `compression-zstd`, `compression-bzip2`, `compression-xz` -
//!   transparent compression for inputs and outputs

pub mod catalog;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod pivot;
pub mod record;
pub mod row;
pub mod sink;
pub mod source;
pub mod table;
pub mod testing;

pub use catalog::PathCatalog;
pub use config::{OutputFormat, PipelineConfig, SinkConfig, SourceConfig};
pub use error::PivotError;
pub use pipeline::{RunSummary, run, run_with};
pub use pivot::{DuplicatePolicy, PivotOptions, PivotTransformer, pivot, pivot_with, transform};
pub use record::Record;
pub use row::UserRow;
pub use sink::TableSink;
pub use source::RecordSource;
pub use table::{OutputTable, TableAssembler, assemble};
