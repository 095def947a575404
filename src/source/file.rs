use crate::config::SourceConfig;
use crate::io::csv::read_records_file;
use crate::io::glob::expand_glob_required;
use crate::record::Record;
use crate::source::RecordSource;
use anyhow::Result;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::info;

/// CSV files on the local filesystem, read in the given order.
#[derive(Debug, Clone)]
pub struct FileSource {
    files: Vec<PathBuf>,
    drop_columns: Vec<String>,
    parallel: bool,
}

impl FileSource {
    pub fn new(files: Vec<PathBuf>, drop_columns: Vec<String>) -> Self {
        Self {
            files,
            drop_columns,
            parallel: false,
        }
    }

    /// Files matching `pattern`, sorted by path. Zero matches is an error.
    pub fn from_glob(pattern: &str, cfg: &SourceConfig) -> Result<Self> {
        let files = expand_glob_required(pattern)?;
        Ok(Self::new(files, cfg.drop_columns.clone()).with_parallel(cfg.parallel))
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl RecordSource for FileSource {
    fn name(&self) -> String {
        format!("{} local file(s)", self.files.len())
    }

    fn read_records(&self) -> Result<Vec<Record>> {
        let per_file: Vec<Vec<Record>> = if self.parallel {
            self.files
                .par_iter()
                .map(|f| read_records_file(f, &self.drop_columns))
                .collect::<Result<_>>()?
        } else {
            self.files
                .iter()
                .map(|f| read_records_file(f, &self.drop_columns))
                .collect::<Result<_>>()?
        };
        let records: Vec<Record> = per_file.into_iter().flatten().collect();
        info!(files = self.files.len(), records = records.len(), "read local sources");
        Ok(records)
    }
}
