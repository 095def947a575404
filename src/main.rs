//! `pathpivot` command-line driver.
//!
//! Reads per-user path/length CSV records from HTTP or local files, pivots them into
//! one row per user and one column per path, and writes the table.

use anyhow::{Context, Result};
use clap::Parser;
use pathpivot::config::{OutputFormat, PipelineConfig};
use pathpivot::{DuplicatePolicy, run};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pathpivot", version, about)]
struct Args {
    /// JSON configuration file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Local input files, as a glob pattern (e.g. `data/*.csv.gz`). Disables HTTP.
    #[arg(long)]
    input: Option<String>,

    /// Base URL the source files are fetched from.
    #[arg(long)]
    base_url: Option<String>,

    /// Source file name under the base URL. Repeatable; defaults to a.csv .. z.csv.
    #[arg(long = "file")]
    files: Vec<String>,

    /// Output path.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Output format. Inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Source column to discard. Repeatable; replaces the configured list.
    #[arg(long = "drop-column")]
    drop_columns: Vec<String>,

    /// Keep source order instead of sorting records by user id.
    #[arg(long)]
    no_sort: bool,

    /// Read sources and build rows in parallel.
    #[arg(long)]
    parallel: bool,

    /// Fail when a user has more than one record for a path.
    #[arg(long)]
    reject_duplicates: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    summary_json: bool,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut cfg = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(pattern) = self.input {
            cfg.source.local_glob = Some(pattern);
        }
        if let Some(url) = self.base_url {
            cfg.source.base_url = url;
        }
        if !self.files.is_empty() {
            cfg.source.files = self.files;
        }
        if !self.drop_columns.is_empty() {
            cfg.source.drop_columns = self.drop_columns;
        }
        if self.no_sort {
            cfg.source.sort_by_user = false;
        }
        if self.parallel {
            cfg.source.parallel = true;
            cfg.pivot.parallel = true;
        }
        if self.reject_duplicates {
            cfg.pivot.duplicates = DuplicatePolicy::Reject;
        }
        if let Some(output) = self.output {
            cfg.sink.output = output;
        }
        if let Some(format) = self.format {
            cfg.sink.format = Some(format);
        }
        Ok(cfg)
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);
    match real_main(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn real_main(args: Args) -> Result<()> {
    let summary_json = args.summary_json;
    let cfg = args.into_config()?;
    let summary = run(&cfg)?;
    if summary_json {
        println!(
            "{}",
            serde_json::to_string(&summary).context("serialize run summary")?
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() -> Result<()> {
        let args = Args::try_parse_from([
            "pathpivot",
            "--input",
            "data/*.csv",
            "--drop-column",
            "referrer",
            "--no-sort",
            "--parallel",
            "--reject-duplicates",
            "-o",
            "wide.out",
            "--format",
            "jsonl",
        ])?;
        let cfg = args.into_config()?;
        assert_eq!(cfg.source.local_glob.as_deref(), Some("data/*.csv"));
        assert_eq!(cfg.source.drop_columns, vec!["referrer".to_string()]);
        assert!(!cfg.source.sort_by_user);
        assert!(cfg.source.parallel);
        assert!(cfg.pivot.parallel);
        assert_eq!(cfg.pivot.duplicates, DuplicatePolicy::Reject);
        assert_eq!(cfg.sink.output, PathBuf::from("wide.out"));
        assert_eq!(cfg.sink.format, Some(OutputFormat::Jsonl));
        Ok(())
    }

    #[test]
    fn no_flags_keep_defaults() -> Result<()> {
        let cfg = Args::try_parse_from(["pathpivot"])?.into_config()?;
        assert_eq!(cfg, PipelineConfig::default());
        Ok(())
    }

    #[test]
    fn flags_apply_on_top_of_config_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("run.json");
        std::fs::write(
            &path,
            r#"{"source": {"files": ["x.csv"], "sort_by_user": false}, "pivot": {"duplicates": "reject"}}"#,
        )?;
        let args = Args::try_parse_from([
            "pathpivot",
            "--config",
            path.to_str().context("utf-8 temp path")?,
            "--file",
            "y.csv",
            "--file",
            "z.csv",
        ])?;
        let cfg = args.into_config()?;
        assert_eq!(cfg.source.files, vec!["y.csv".to_string(), "z.csv".to_string()]);
        assert!(!cfg.source.sort_by_user);
        assert_eq!(cfg.pivot.duplicates, DuplicatePolicy::Reject);
        assert!(!cfg.pivot.parallel);
        Ok(())
    }
}
