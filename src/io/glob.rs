//! Glob expansion for local record sources.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use tracing::debug;

/// Expand `pattern` into the matching regular files, sorted lexicographically so the
/// record order (and therefore the first-seen user and path order) is reproducible.
///
/// Supports the usual syntax: `*`, `?`, `**`, `[abc]`, `[!abc]`. No match yields an
/// empty vector.
///
/// ```no_run
/// use pathpivot::io::glob::expand_glob;
///
/// let files = expand_glob("data/*.csv")?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("error reading glob entry for pattern: {pattern}"))?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    debug!(pattern, matched = files.len(), "expanded glob");
    Ok(files)
}

/// Like [`expand_glob`], but zero matches is an error.
pub fn expand_glob_required(pattern: &str) -> Result<Vec<PathBuf>> {
    let files = expand_glob(pattern)?;
    if files.is_empty() {
        bail!("no files found matching pattern: {pattern}");
    }
    Ok(files)
}
