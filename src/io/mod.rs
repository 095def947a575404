//! File formats and transport helpers used by sources and sinks.

pub mod compression;
pub mod csv;
pub mod glob;
pub mod jsonl;

#[cfg_attr(docsrs, doc(cfg(feature = "io-parquet")))]
#[cfg(feature = "io-parquet")]
pub mod parquet;
