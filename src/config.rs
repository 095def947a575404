//! Run configuration for the collaborators around the pivot core.
//!
//! Everything is plain data passed explicitly: there are no process-wide settings.
//! A [`PipelineConfig`] can be loaded from JSON; every field has a default, so a
//! config file only needs to name what it changes.
//!
//! ```json
//! {
//!   "source": { "local_glob": "data/*.csv.gz", "sort_by_user": false },
//!   "pivot": { "duplicates": "reject" },
//!   "sink": { "output": "wide.parquet" }
//! }
//! ```

use crate::io::compression::strip_compression_suffix;
use crate::pivot::PivotOptions;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default remote location of the source CSV files.
pub const DEFAULT_BASE_URL: &str = "https://public.wiwdata.com/engineering-challenge/data";
/// Default output file.
pub const DEFAULT_OUTPUT: &str = "out.csv";

/// Where records come from and how they are cleaned before the pivot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL the `files` are fetched from.
    pub base_url: String,
    /// File names under `base_url`, read in this order.
    pub files: Vec<String>,
    /// Local glob pattern. When set, it replaces the HTTP source.
    pub local_glob: Option<String>,
    /// Source columns known to be irrelevant.
    pub drop_columns: Vec<String>,
    /// Stable-sort records by user id before pivoting.
    pub sort_by_user: bool,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Fetch or read files concurrently. Records are still concatenated in file order.
    pub parallel: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            files: ('a'..='z').map(|c| format!("{c}.csv")).collect(),
            local_glob: None,
            drop_columns: vec!["drop".to_string(), "user_agent".to_string()],
            sort_by_user: true,
            connect_timeout_ms: 5_000,
            read_timeout_ms: 30_000,
            parallel: false,
        }
    }
}

impl SourceConfig {
    /// `{base_url}/{file}` for every configured file.
    pub fn urls(&self) -> Vec<String> {
        let base = self.base_url.trim_end_matches('/');
        self.files.iter().map(|f| format!("{base}/{f}")).collect()
    }
}

/// Output encodings the sink can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Jsonl,
    Parquet,
}

impl OutputFormat {
    /// Infer the format from a file name, ignoring a compression suffix.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let name = path.as_ref().to_string_lossy().to_ascii_lowercase();
        let name = strip_compression_suffix(&name);
        match Path::new(name).extension().and_then(|e| e.to_str()) {
            Some("csv") => Ok(Self::Csv),
            Some("jsonl") | Some("ndjson") => Ok(Self::Jsonl),
            Some("parquet") => Ok(Self::Parquet),
            other => bail!(
                "cannot infer output format from extension {:?} of {}",
                other,
                path.as_ref().display()
            ),
        }
    }
}

/// Where and how the finished table is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub output: PathBuf,
    /// Explicit format; inferred from `output` when absent.
    pub format: Option<OutputFormat>,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: None,
        }
    }
}

impl SinkConfig {
    pub fn resolved_format(&self) -> Result<OutputFormat> {
        match self.format {
            Some(f) => Ok(f),
            None => OutputFormat::from_path(&self.output),
        }
    }
}

/// Complete configuration of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub source: SourceConfig,
    pub pivot: PivotOptions,
    pub sink: SinkConfig,
}

impl PipelineConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot::DuplicatePolicy;

    #[test]
    fn defaults_cover_a_to_z() {
        let cfg = SourceConfig::default();
        assert_eq!(cfg.files.len(), 26);
        assert_eq!(cfg.files[0], "a.csv");
        assert_eq!(cfg.urls()[25], format!("{DEFAULT_BASE_URL}/z.csv"));
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let cfg = SourceConfig {
            base_url: "http://host/data/".into(),
            files: vec!["a.csv".into()],
            ..SourceConfig::default()
        };
        assert_eq!(cfg.urls(), vec!["http://host/data/a.csv"]);
    }

    #[test]
    fn partial_json_keeps_defaults() -> Result<()> {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"pivot":{"duplicates":"reject"},"sink":{"output":"w.jsonl"}}"#)?;
        assert_eq!(cfg.pivot.duplicates, DuplicatePolicy::Reject);
        assert!(!cfg.pivot.parallel);
        assert_eq!(cfg.source, SourceConfig::default());
        assert_eq!(cfg.sink.resolved_format()?, OutputFormat::Jsonl);
        Ok(())
    }

    #[test]
    fn format_inference() -> Result<()> {
        assert_eq!(OutputFormat::from_path("out.csv")?, OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path("OUT.NDJSON")?, OutputFormat::Jsonl);
        assert_eq!(OutputFormat::from_path("wide.parquet")?, OutputFormat::Parquet);
        assert!(OutputFormat::from_path("out.txt").is_err());
        Ok(())
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn format_inference_ignores_compression() -> Result<()> {
        assert_eq!(OutputFormat::from_path("out.csv.zst")?, OutputFormat::Csv);
        Ok(())
    }
}
