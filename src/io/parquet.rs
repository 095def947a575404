//! Parquet output for the wide table.
//!
//! The column set is only known at run time, so the Arrow schema is built directly
//! from the catalog: a non-null Utf8 `user_id` column followed by one non-null Int64
//! column per path. The whole table is written as a single record batch.

use crate::record::USER_ID;
use crate::table::OutputTable;
use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::{File, create_dir_all};
use std::path::Path;
use std::sync::Arc;

/// Convert `table` into an Arrow batch in column order.
pub fn to_record_batch(table: &OutputTable) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.catalog().len() + 1);
    fields.push(Field::new(USER_ID, DataType::Utf8, false));
    fields.extend(
        table
            .catalog()
            .iter()
            .map(|p| Field::new(p, DataType::Int64, false)),
    );
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());
    columns.push(Arc::new(StringArray::from_iter_values(
        table.rows().iter().map(|r| r.user_id()),
    )));
    for i in 0..table.catalog().len() {
        columns.push(Arc::new(Int64Array::from_iter_values(
            table.rows().iter().map(|r| r.values()[i]),
        )));
    }
    RecordBatch::try_new(schema, columns).context("build record batch from table")
}

/// Write `table` to a Parquet file. Returns the number of rows written.
pub fn write_table_file(path: impl AsRef<Path>, table: &OutputTable) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    let batch = to_record_batch(table)?;
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props)).context("create ArrowWriter")?;
    writer.write(&batch).context("write batch to parquet")?;
    writer.close().context("close ArrowWriter")?;
    Ok(table.len())
}
