//! Delimited-text CUR reader.
//!
//! Rows are pulled from the (possibly compressed) file `chunk_size` records
//! at a time, so memory stays bounded by one chunk regardless of file size.
//! Empty fields become [`Value::Null`]; ragged rows are padded rather than
//! rejected, and bytes that are not valid UTF-8 are replaced, not fatal.

use crate::chunk::{Chunk, Row, Value};
use crate::error::{CurError, Result};
use crate::io::compression::auto_detect_reader;
use crate::io::{ChunkIter, FormatReader, ReadPlan, SourceFormat};
use csv::{ByteRecord, ReaderBuilder};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Streaming reader for `.csv` exports and their compressed variants.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReader;

fn open_csv(path: &Path) -> Result<csv::Reader<Box<dyn Read>>> {
    let file = File::open(path)?;
    let input = auto_detect_reader(file, path)?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input))
}

impl FormatReader for CsvReader {
    fn format(&self) -> SourceFormat {
        SourceFormat::Csv
    }

    fn read_columns(&self, path: &Path) -> Result<Vec<String>> {
        let mut rdr = open_csv(path).map_err(|e| CurError::schema_read(path, e))?;
        let header = rdr.headers().map_err(|e| CurError::schema_read(path, e))?;
        if header.is_empty() {
            return Err(CurError::schema_read(path, "empty header row"));
        }
        Ok(header.iter().map(str::to_string).collect())
    }

    fn read_chunks(&self, path: &Path, plan: Arc<ReadPlan>) -> Result<ChunkIter> {
        let mut reader = open_csv(path)?;
        let raw_header: Vec<String> = reader
            .headers()
            .map_err(|e| CurError::schema_read(path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let indices = plan
            .physical_indices(&raw_header)
            .unwrap_or_else(|| (0..raw_header.len()).collect());
        let picked: Vec<&String> = indices.iter().map(|&i| &raw_header[i]).collect();
        let columns = plan.logical_names(&picked);

        tracing::debug!(
            path = %path.display(),
            columns = columns.len(),
            chunk_size = plan.chunk_size,
            "streaming text source"
        );

        Ok(Box::new(CsvChunks {
            path: path.to_path_buf(),
            reader,
            record: ByteRecord::new(),
            indices,
            columns,
            plan,
            done: false,
        }))
    }
}

/// Iterator over one text file, one bounded read per step.
struct CsvChunks {
    path: PathBuf,
    reader: csv::Reader<Box<dyn Read>>,
    record: ByteRecord,
    indices: Vec<usize>,
    columns: Vec<String>,
    plan: Arc<ReadPlan>,
    done: bool,
}

impl CsvChunks {
    fn project_record(&self) -> Row {
        self.indices
            .iter()
            .map(|&i| match self.record.get(i) {
                None | Some(b"") => Value::Null,
                Some(bytes) => Value::Str(String::from_utf8_lossy(bytes).into_owned()),
            })
            .collect()
    }

    /// Read up to `chunk_size` source rows; an empty batch means end of file.
    fn read_batch(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::with_capacity(self.plan.chunk_size.min(8192));
        while rows.len() < self.plan.chunk_size {
            if !self.reader.read_byte_record(&mut self.record)? {
                break;
            }
            rows.push(self.project_record());
        }
        Ok(rows)
    }
}

impl Iterator for CsvChunks {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let rows = match self.read_batch() {
                Ok(rows) => rows,
                Err(err) => {
                    tracing::warn!(path = %self.path.display(), %err, "text read failed");
                    self.done = true;
                    return Some(Err(err));
                }
            };
            if rows.is_empty() {
                self.done = true;
                break;
            }
            let chunk = self.plan.apply(Chunk::new(self.columns.clone(), rows));
            // batches emptied by filtering are skipped, not emitted
            if !chunk.is_empty() {
                return Some(Ok(chunk));
            }
        }
        None
    }
}
