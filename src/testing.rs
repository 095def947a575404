//! Fixtures for tests and documentation.

use crate::record::{LENGTH, PATH, Record, USER_ID};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::path::{Path, PathBuf};

/// Three records over two users and two paths; `u2` never visits `/b`.
#[must_use]
pub fn sample_records() -> Vec<Record> {
    vec![
        Record::new("u1", "/a", 5),
        Record::new("u1", "/b", 3),
        Record::new("u2", "/a", 7),
    ]
}

/// Records from `(user_id, path, length)` triples.
#[must_use]
pub fn records<'a>(triples: impl IntoIterator<Item = (&'a str, &'a str, i64)>) -> Vec<Record> {
    triples
        .into_iter()
        .map(|(u, p, l)| Record::new(u, p, l))
        .collect()
}

/// Write a source-shaped CSV (with the usual noise columns) to `dir/name`.
///
/// Columns are `length,path,user_id,drop,user_agent`, so readers must locate the
/// required fields by name. Fields are quoted as needed.
pub fn write_source_csv(dir: impl AsRef<Path>, name: &str, records: &[Record]) -> Result<PathBuf> {
    let path = dir.as_ref().join(name);
    let mut wtr = WriterBuilder::new()
        .from_path(&path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.write_record([LENGTH, PATH, USER_ID, "drop", "user_agent"])?;
    for r in records {
        let length = r.length.to_string();
        wtr.write_record([length.as_str(), r.path.as_str(), r.user_id.as_str(), "x", "Mozilla/5.0 (X11; Linux x86_64)"])?;
    }
    wtr.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv::read_records_file;

    #[test]
    fn awkward_paths_survive_the_fixture() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = records([
            ("1", "/search?q=a,b", 4),
            ("2", "/say \"hi\"", -3),
        ]);
        let path = write_source_csv(dir.path(), "a.csv", &input)?;
        let drops = vec!["drop".to_string(), "user_agent".to_string()];
        assert_eq!(read_records_file(path, &drops)?, input);
        Ok(())
    }
}
