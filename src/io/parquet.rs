//! Columnar CUR reader.
//!
//! Column pruning happens at the Parquet layer through a root projection
//! mask, and rows are decoded one record batch at a time with the batch size
//! set to the plan's chunk size. Memory therefore stays bounded by one
//! projected batch per step, the same guarantee the text reader gives.

use crate::chunk::{Chunk, Row, Value};
use crate::error::{CurError, Result};
use crate::io::{ChunkIter, FormatReader, ReadPlan, SourceFormat};
use arrow::array::{
    Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, LargeStringArray,
    StringArray, StringViewArray,
};
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reader for `.parquet` exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParquetReader;

impl FormatReader for ParquetReader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Parquet
    }

    fn read_columns(&self, path: &Path) -> Result<Vec<String>> {
        let file = File::open(path).map_err(|e| CurError::schema_read(path, e))?;
        let builder =
            ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| CurError::schema_read(path, e))?;
        Ok(builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect())
    }

    fn read_chunks(&self, path: &Path, plan: Arc<ReadPlan>) -> Result<ChunkIter> {
        let file = File::open(path)?;
        let builder =
            ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| CurError::schema_read(path, e))?;

        let raw_header: Vec<String> = builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();

        let builder = match plan.physical_indices(&raw_header) {
            Some(indices) => {
                let mask = ProjectionMask::roots(builder.parquet_schema(), indices);
                builder.with_projection(mask)
            }
            None => builder,
        };

        let total_rows = builder.metadata().file_metadata().num_rows();
        let reader = builder.with_batch_size(plan.chunk_size).build()?;

        tracing::debug!(
            path = %path.display(),
            rows = total_rows,
            chunk_size = plan.chunk_size,
            "streaming columnar source"
        );

        Ok(Box::new(ParquetChunks {
            path: path.to_path_buf(),
            reader,
            plan,
            done: false,
        }))
    }
}

struct ParquetChunks {
    path: PathBuf,
    reader: ParquetRecordBatchReader,
    plan: Arc<ReadPlan>,
    done: bool,
}

impl Iterator for ParquetChunks {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let batch = match self.reader.next() {
                Some(Ok(batch)) => batch,
                Some(Err(err)) => {
                    tracing::warn!(path = %self.path.display(), %err, "columnar read failed");
                    self.done = true;
                    return Some(Err(err.into()));
                }
                None => {
                    self.done = true;
                    break;
                }
            };
            let chunk = match batch_to_chunk(&batch, &self.plan) {
                Ok(chunk) => self.plan.apply(chunk),
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };
            if !chunk.is_empty() {
                return Some(Ok(chunk));
            }
        }
        None
    }
}

/// Decode one record batch into a row-major chunk with logical column names.
fn batch_to_chunk(batch: &RecordBatch, plan: &ReadPlan) -> Result<Chunk> {
    let schema = batch.schema();
    let raw: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let columns = plan.logical_names(&raw);

    let mut rows: Vec<Row> = vec![Vec::with_capacity(columns.len()); batch.num_rows()];
    for array in batch.columns() {
        for (row, cell) in rows.iter_mut().zip(column_values(array.as_ref())?) {
            row.push(cell);
        }
    }
    Ok(Chunk::new(columns, rows))
}

fn collect_cells<A, F>(array: &A, cell: F) -> Vec<Value>
where
    A: Array,
    F: Fn(&A, usize) -> Value,
{
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                Value::Null
            } else {
                cell(array, i)
            }
        })
        .collect()
}

/// Cells of one Arrow column. Numeric, boolean and string arrays keep their
/// type; everything else (timestamps, decimals, dictionaries) is rendered
/// with Arrow's display formatter.
fn column_values(array: &dyn Array) -> Result<Vec<Value>> {
    let any = array.as_any();
    if let Some(a) = any.downcast_ref::<Float64Array>() {
        return Ok(collect_cells(a, |a, i| Value::Float(a.value(i))));
    }
    if let Some(a) = any.downcast_ref::<Float32Array>() {
        return Ok(collect_cells(a, |a, i| Value::Float(f64::from(a.value(i)))));
    }
    if let Some(a) = any.downcast_ref::<Int64Array>() {
        return Ok(collect_cells(a, |a, i| Value::Int(a.value(i))));
    }
    if let Some(a) = any.downcast_ref::<Int32Array>() {
        return Ok(collect_cells(a, |a, i| Value::Int(i64::from(a.value(i)))));
    }
    if let Some(a) = any.downcast_ref::<BooleanArray>() {
        return Ok(collect_cells(a, |a, i| Value::Bool(a.value(i))));
    }
    if let Some(a) = any.downcast_ref::<StringArray>() {
        return Ok(collect_cells(a, |a, i| text_cell(a.value(i))));
    }
    if let Some(a) = any.downcast_ref::<LargeStringArray>() {
        return Ok(collect_cells(a, |a, i| text_cell(a.value(i))));
    }
    if let Some(a) = any.downcast_ref::<StringViewArray>() {
        return Ok(collect_cells(a, |a, i| text_cell(a.value(i))));
    }

    let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())?;
    Ok((0..array.len())
        .map(|i| {
            if array.is_null(i) {
                Value::Null
            } else {
                Value::Str(formatter.value(i).to_string())
            }
        })
        .collect())
}

fn text_cell(s: &str) -> Value {
    if s.is_empty() {
        Value::Null
    } else {
        Value::Str(s.to_string())
    }
}
