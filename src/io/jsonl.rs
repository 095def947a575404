//! JSON Lines output: one object per row, keys in column order.

use crate::io::compression::{FinishWrite, auto_detect_writer};
use crate::record::USER_ID;
use crate::row::UserRow;
use crate::table::OutputTable;
use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

/// Serializes a row as a map so key order follows the table columns rather than
/// whatever order a `serde_json::Map` would impose.
struct RowObject<'a>(&'a UserRow);

impl Serialize for RowObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let row = self.0;
        let mut map = serializer.serialize_map(Some(row.values().len() + 1))?;
        map.serialize_entry(USER_ID, row.user_id())?;
        for (path, length) in row.cells() {
            map.serialize_entry(path, &length)?;
        }
        map.end()
    }
}

/// Write `table` as JSON Lines. Returns the number of rows written.
pub fn write_table<W: Write>(mut writer: W, table: &OutputTable) -> Result<usize> {
    for (i, row) in table.rows().iter().enumerate() {
        serde_json::to_writer(&mut writer, &RowObject(row))
            .with_context(|| format!("serialize JSONL row #{}", i + 1))?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(table.len())
}

/// Write `table` to a JSON Lines file, compressing by extension.
pub fn write_table_file(path: impl AsRef<Path>, table: &OutputTable) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut out = auto_detect_writer(f, path)?;
    let n = write_table(&mut out, table).with_context(|| format!("write {}", path.display()))?;
    out.finish_stream()
        .with_context(|| format!("finish {}", path.display()))?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Record, pivot};

    #[test]
    fn keys_follow_column_order() -> Result<()> {
        let table = pivot(&[Record::new("u1", "/z", 1), Record::new("u2", "/a", 2)])?;
        let mut buf = Vec::new();
        write_table(&mut buf, &table)?;
        assert_eq!(
            String::from_utf8(buf)?,
            "{\"user_id\":\"u1\",\"/z\":1,\"/a\":0}\n{\"user_id\":\"u2\",\"/z\":0,\"/a\":2}\n"
        );
        Ok(())
    }
}
