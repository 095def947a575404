//! CSV record ingestion and wide-table output.
//!
//! Reading is header-driven: the `user_id`, `path` and `length` columns are located by
//! name, in any position, and every other column is discarded. Columns listed in
//! `drop_columns` are expected noise and dropped quietly; anything else unexpected is
//! dropped with a warning so schema drift upstream is visible in the logs.
//!
//! Writing emits the header `user_id,<path…>` followed by one line per row.

use crate::io::compression::{FinishWrite, auto_detect_reader, auto_detect_writer};
use crate::record::{LENGTH, PATH, Record, USER_ID};
use crate::table::OutputTable;
use anyhow::{Context, Result, anyhow};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use std::fs::{File, create_dir_all};
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Column positions of the three required fields within a source header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RecordColumns {
    user_id: usize,
    path: usize,
    length: usize,
}

impl RecordColumns {
    fn locate(headers: &csv::StringRecord, origin: &str, drop_columns: &[String]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| anyhow!("{origin}: missing required column '{name}'"))
        };
        let columns = Self {
            user_id: find(USER_ID)?,
            path: find(PATH)?,
            length: find(LENGTH)?,
        };

        let (dropped, unexpected): (Vec<&str>, Vec<&str>) = headers
            .iter()
            .filter(|h| ![USER_ID, PATH, LENGTH].contains(h))
            .partition(|h| drop_columns.iter().any(|d| d == h));
        if !dropped.is_empty() {
            debug!(origin, ?dropped, "dropping configured columns");
        }
        if !unexpected.is_empty() {
            warn!(origin, ?unexpected, "dropping unexpected columns");
        }
        Ok(columns)
    }
}

/// Parse CSV `reader` into records. `origin` names the source in errors and logs.
///
/// # Errors
/// A required column is missing from the header, a row is malformed, or a `length`
/// is not an integer. Errors carry the origin and the 1-based data row.
pub fn read_records<R: Read>(reader: R, origin: &str, drop_columns: &[String]) -> Result<Vec<Record>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = rdr
        .headers()
        .with_context(|| format!("{origin}: read CSV header"))?
        .clone();
    let columns = RecordColumns::locate(&headers, origin, drop_columns)?;

    let mut out = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("{origin}: parse CSV record #{}", i + 1))?;
        let field = |idx: usize, name: &str| {
            row.get(idx)
                .ok_or_else(|| anyhow!("{origin}: record #{} has no '{name}' field", i + 1))
        };
        let raw_length = field(columns.length, LENGTH)?;
        let length = raw_length
            .parse::<i64>()
            .with_context(|| format!("{origin}: record #{}: invalid length '{raw_length}'", i + 1))?;
        out.push(Record {
            user_id: field(columns.user_id, USER_ID)?.to_string(),
            path: field(columns.path, PATH)?.to_string(),
            length,
        });
    }
    debug!(origin, records = out.len(), "read CSV records");
    Ok(out)
}

/// Read records from a local CSV file, decompressing transparently.
pub fn read_records_file(path: impl AsRef<Path>, drop_columns: &[String]) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let origin = path.display().to_string();
    let rdr = auto_detect_reader(f, &origin)?;
    read_records(rdr, &origin, drop_columns)
}

/// Write `table` as CSV to `writer`. Returns the number of data rows written.
///
/// An empty table still gets its header line.
pub fn write_table<W: Write>(writer: W, table: &OutputTable) -> Result<usize> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(table.columns()).context("write CSV header")?;
    for (i, fields) in table.records().enumerate() {
        wtr.write_record(&fields)
            .with_context(|| format!("write CSV row #{}", i + 1))?;
    }
    wtr.flush()?;
    Ok(table.len())
}

/// Write `table` to a CSV file, creating parent directories and compressing by
/// extension (`out.csv.gz`, `out.csv.zst`, …).
pub fn write_table_file(path: impl AsRef<Path>, table: &OutputTable) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_table_encoded(f, path, table).with_context(|| format!("write {}", path.display()))
}

/// Write `table` as CSV through the codec named by `hint`'s extension, closing the
/// compressed stream before returning.
pub fn write_table_encoded<W: Write + 'static>(
    writer: W,
    hint: impl AsRef<Path>,
    table: &OutputTable,
) -> Result<usize> {
    let mut out = auto_detect_writer(writer, hint)?;
    let n = write_table(&mut out, table)?;
    out.finish_stream().context("finish output stream")?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pivot;

    fn drops() -> Vec<String> {
        vec!["drop".into(), "user_agent".into()]
    }

    #[test]
    fn columns_found_by_name_and_noise_dropped() -> Result<()> {
        let data = "drop,length,path,user_agent,user_id\n\
                    x,5,/a,Mozilla,1\n\
                    y, 3 ,/b,curl,2\n";
        let records = read_records(data.as_bytes(), "inline", &drops())?;
        assert_eq!(records, vec![Record::new("1", "/a", 5), Record::new("2", "/b", 3)]);
        Ok(())
    }

    #[test]
    fn missing_required_column_is_named() {
        let err = read_records("user_id,path\n1,/a\n".as_bytes(), "a.csv", &[]).unwrap_err();
        assert!(err.to_string().contains("missing required column 'length'"));
    }

    #[test]
    fn bad_length_reports_row() {
        let err = read_records("user_id,path,length\n1,/a,5\n1,/b,abc\n".as_bytes(), "a.csv", &[])
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("a.csv: record #2"), "{msg}");
    }

    #[test]
    fn negative_lengths_are_kept() -> Result<()> {
        let records = read_records("user_id,path,length\n1,/a,-4\n".as_bytes(), "a.csv", &[])?;
        assert_eq!(records, vec![Record::new("1", "/a", -4)]);
        Ok(())
    }

    #[test]
    fn writes_header_even_when_empty() -> Result<()> {
        let mut buf = Vec::new();
        write_table(&mut buf, &pivot::pivot(&[])?)?;
        assert_eq!(String::from_utf8(buf)?, "user_id\n");
        Ok(())
    }

    #[test]
    fn writes_zero_filled_rows() -> Result<()> {
        let table = pivot::pivot(&[
            Record::new("u1", "/a", 5),
            Record::new("u1", "/b", 3),
            Record::new("u2", "/a", 7),
        ])?;
        let mut buf = Vec::new();
        assert_eq!(write_table(&mut buf, &table)?, 2);
        assert_eq!(String::from_utf8(buf)?, "user_id,/a,/b\nu1,5,3\nu2,7,0\n");
        Ok(())
    }

    /// Accepts bytes until the first flush, then fails every write.
    #[cfg(feature = "compression-gzip")]
    struct BreaksAfterFlush {
        flushed: bool,
    }

    #[cfg(feature = "compression-gzip")]
    impl Write for BreaksAfterFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.flushed {
                return Err(std::io::Error::other("disk full"));
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn failed_gzip_trailer_is_an_error() -> Result<()> {
        let table = pivot::pivot(&[Record::new("u1", "/a", 5), Record::new("u2", "/b", 7)])?;
        let err = write_table_encoded(BreaksAfterFlush { flushed: false }, "out.csv.gz", &table).unwrap_err();
        assert!(format!("{err:#}").contains("finish output stream"), "{err:#}");
        Ok(())
    }

    #[cfg(feature = "compression-gzip")]
    #[test]
    fn gzip_output_is_complete() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("wide.csv.gz");
        let table = pivot::pivot(&[Record::new("u1", "/a", 5), Record::new("u2", "/b", 7)])?;
        assert_eq!(write_table_file(&path, &table)?, 2);

        let mut out = String::new();
        flate2::read::GzDecoder::new(File::open(&path)?).read_to_string(&mut out)?;
        assert_eq!(out, "user_id,/a,/b\nu1,5,0\nu2,0,7\n");
        Ok(())
    }
}
