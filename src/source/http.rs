use crate::config::SourceConfig;
use crate::io::compression::auto_detect_reader;
use crate::io::csv::read_records;
use crate::record::Record;
use crate::source::RecordSource;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::time::Duration;
use tracing::{debug, info};

/// CSV files fetched over HTTP(S) with blocking requests.
///
/// Bodies are decompressed when the URL suffix or the leading bytes name a codec.
pub struct HttpSource {
    agent: ureq::Agent,
    urls: Vec<String>,
    drop_columns: Vec<String>,
    parallel: bool,
}

impl HttpSource {
    pub fn new(cfg: &SourceConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_millis(cfg.connect_timeout_ms))
            .timeout_read(Duration::from_millis(cfg.read_timeout_ms))
            .build();
        Self {
            agent,
            urls: cfg.urls(),
            drop_columns: cfg.drop_columns.clone(),
            parallel: cfg.parallel,
        }
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    fn fetch(&self, url: &str) -> Result<Vec<Record>> {
        debug!(url, "fetching");
        let response = self.agent.get(url).call().with_context(|| format!("GET {url}"))?;
        let body = auto_detect_reader(response.into_reader(), url)?;
        read_records(body, url, &self.drop_columns)
    }
}

impl RecordSource for HttpSource {
    fn name(&self) -> String {
        format!("{} remote file(s)", self.urls.len())
    }

    fn read_records(&self) -> Result<Vec<Record>> {
        let per_url: Vec<Vec<Record>> = if self.parallel {
            self.urls
                .par_iter()
                .map(|u| self.fetch(u))
                .collect::<Result<_>>()?
        } else {
            self.urls.iter().map(|u| self.fetch(u)).collect::<Result<_>>()?
        };
        let records: Vec<Record> = per_url.into_iter().flatten().collect();
        info!(urls = self.urls.len(), records = records.len(), "fetched remote sources");
        Ok(records)
    }
}
