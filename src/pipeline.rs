//! End-to-end run: source → catalog → pivot → assembly → sink.

use crate::catalog::PathCatalog;
use crate::config::{PipelineConfig, SourceConfig};
use crate::pivot::{PivotOptions, PivotTransformer};
use crate::sink::{TableSink, sink_for};
use crate::source::{self, RecordSource};
use crate::table::{OutputTable, TableAssembler};
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, info_span, warn};

/// Counters describing one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub records: usize,
    pub users: usize,
    pub paths: usize,
    pub rows_written: usize,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Run the pipeline described by `cfg`.
pub fn run(cfg: &PipelineConfig) -> Result<RunSummary> {
    let source = source::from_config(&cfg.source)?;
    let sink = sink_for(&cfg.sink)?;
    run_with(source.as_ref(), &Preparation::from(&cfg.source), cfg.pivot, sink.as_ref())
}

/// Source-side record preparation applied before the catalog is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preparation {
    pub sort_by_user: bool,
}

impl From<&SourceConfig> for Preparation {
    fn from(cfg: &SourceConfig) -> Self {
        Self {
            sort_by_user: cfg.sort_by_user,
        }
    }
}

/// Read and prepare records, then pivot them into a table.
pub fn build_table(
    source: &dyn RecordSource,
    prep: &Preparation,
    options: PivotOptions,
) -> Result<(usize, OutputTable)> {
    let mut records = source
        .read_records()
        .with_context(|| format!("read records from {}", source.name()))?;
    source::check_reserved_paths(&records)
        .with_context(|| format!("validate records from {}", source.name()))?;
    if prep.sort_by_user {
        source::sort_by_user(&mut records);
    }
    if records.is_empty() {
        warn!(source = %source.name(), "source produced no records; output will only have a user_id column");
    }

    let catalog = Arc::new(PathCatalog::from_records(&records));
    info!(records = records.len(), paths = catalog.len(), "built path catalog");

    let rows = PivotTransformer::new(Arc::clone(&catalog))
        .with_options(options)
        .run(&records)?;
    let mut assembler = TableAssembler::with_catalog(catalog);
    assembler.extend(rows)?;
    Ok((records.len(), assembler.finish()))
}

/// Run with injected collaborators.
pub fn run_with(
    source: &dyn RecordSource,
    prep: &Preparation,
    options: PivotOptions,
    sink: &dyn TableSink,
) -> Result<RunSummary> {
    let span = info_span!("pivot_run", source = %source.name());
    let _guard = span.enter();
    let started = Instant::now();

    let (records, table) = build_table(source, prep, options)?;
    let rows_written = sink.write_table(&table).context("write output table")?;

    let summary = RunSummary {
        records,
        users: table.len(),
        paths: table.catalog().len(),
        rows_written,
        elapsed: started.elapsed(),
    };
    info!(
        records = summary.records,
        users = summary.users,
        paths = summary.paths,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "run complete"
    );
    Ok(summary)
}
