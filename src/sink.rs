//! Table sinks: persistence of the finished [`OutputTable`].

use crate::config::{OutputFormat, SinkConfig};
use crate::io;
use crate::table::OutputTable;
use anyhow::Result;
#[cfg(not(feature = "io-parquet"))]
use anyhow::bail;
use std::path::PathBuf;
use tracing::info;

/// Destination for a finished table.
pub trait TableSink {
    /// Persist `table`, returning the number of data rows written.
    fn write_table(&self, table: &OutputTable) -> Result<usize>;
}

/// Comma-separated output with a `user_id,<paths…>` header.
#[derive(Debug, Clone)]
pub struct CsvSink {
    pub path: PathBuf,
}

impl TableSink for CsvSink {
    fn write_table(&self, table: &OutputTable) -> Result<usize> {
        let n = io::csv::write_table_file(&self.path, table)?;
        info!(path = %self.path.display(), rows = n, "wrote CSV table");
        Ok(n)
    }
}

/// One JSON object per row.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    pub path: PathBuf,
}

impl TableSink for JsonlSink {
    fn write_table(&self, table: &OutputTable) -> Result<usize> {
        let n = io::jsonl::write_table_file(&self.path, table)?;
        info!(path = %self.path.display(), rows = n, "wrote JSONL table");
        Ok(n)
    }
}

#[cfg(feature = "io-parquet")]
#[derive(Debug, Clone)]
pub struct ParquetSink {
    pub path: PathBuf,
}

#[cfg(feature = "io-parquet")]
impl TableSink for ParquetSink {
    fn write_table(&self, table: &OutputTable) -> Result<usize> {
        let n = io::parquet::write_table_file(&self.path, table)?;
        info!(path = %self.path.display(), rows = n, "wrote Parquet table");
        Ok(n)
    }
}

/// Sink for `cfg`, with the format taken from the config or the output extension.
pub fn sink_for(cfg: &SinkConfig) -> Result<Box<dyn TableSink>> {
    let path = cfg.output.clone();
    let sink: Box<dyn TableSink> = match cfg.resolved_format()? {
        OutputFormat::Csv => Box::new(CsvSink { path }),
        OutputFormat::Jsonl => Box::new(JsonlSink { path }),
        #[cfg(feature = "io-parquet")]
        OutputFormat::Parquet => Box::new(ParquetSink { path }),
        #[cfg(not(feature = "io-parquet"))]
        OutputFormat::Parquet => bail!("Parquet output requires the `io-parquet` feature"),
    };
    Ok(sink)
}
