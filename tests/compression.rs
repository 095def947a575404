#![cfg(feature = "compression-gzip")]

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use pathpivot::io::csv::{read_records_file, write_table_file};
use pathpivot::testing::sample_records;
use pathpivot::{Record, pivot};
use std::fs::{self, File};
use std::io::{Read, Write};

#[test]
fn gzip_source_is_decompressed() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("a.csv.gz");
    let mut enc = GzEncoder::new(File::create(&path)?, Compression::default());
    enc.write_all(b"user_id,path,length,user_agent\n1,/a,5,curl\n2,/b,6,curl\n")?;
    enc.finish()?;

    let records = read_records_file(&path, &["user_agent".to_string()])?;
    assert_eq!(records, vec![Record::new("1", "/a", 5), Record::new("2", "/b", 6)]);
    Ok(())
}

#[test]
fn gzip_output_by_extension() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out.csv.gz");
    write_table_file(&path, &pivot(&sample_records())?)?;

    let mut text = String::new();
    MultiGzDecoder::new(File::open(&path)?).read_to_string(&mut text)?;
    assert_eq!(text, "user_id,/a,/b\nu1,5,3\nu2,7,0\n");
    assert!(fs::metadata(&path)?.len() > 0);
    Ok(())
}
