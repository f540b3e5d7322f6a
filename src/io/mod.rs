//! Physical format backends.
//!
//! Both backends implement [`FormatReader`] and produce the same normalized
//! [`Chunk`] shape; the parse pipeline only ever talks to the trait.
//!
//! Every backend follows the same steps per batch of source rows:
//! 1. read only the raw columns the [`ReadPlan`] needs,
//! 2. rename raw columns to logical names,
//! 3. drop rows outside the plan's service codes,
//! 4. apply the plan's [`Filters`],
//! 5. trim the chunk to the requested columns.
//!
//! Columns pulled in only to evaluate a filter (the service-code column for
//! a domain read, or a user filter's column) never appear in the emitted
//! chunk unless the caller asked for them.

pub mod compression;
pub mod glob;

#[cfg_attr(docsrs, doc(cfg(feature = "io-csv")))]
#[cfg(feature = "io-csv")]
pub mod csv;

#[cfg_attr(docsrs, doc(cfg(feature = "io-parquet")))]
#[cfg(feature = "io-parquet")]
pub mod parquet;

use crate::chunk::Chunk;
use crate::error::{CurError, Result};
use crate::filter::Filters;
use crate::normalize::{ColumnMap, unique_names};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Logical name of the service-code column.
pub const SERVICE_CODE_FIELD: &str = "product_code";

/// Physical layout of a discovered dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Columnar, schema-bearing files (`.parquet`).
    Parquet,
    /// Delimited text, optionally compressed (`.csv`, `.csv.gz`, ...).
    Csv,
}

impl SourceFormat {
    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Parquet => "parquet",
            SourceFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lazy, single-pass sequence of chunks from one file.
pub type ChunkIter = Box<dyn Iterator<Item = Result<Chunk>>>;

/// A backend able to introspect and stream one physical format.
pub trait FormatReader {
    fn format(&self) -> SourceFormat;

    /// Raw column names of `path`, in file order.
    ///
    /// # Errors
    /// [`CurError::SchemaRead`] if the header or footer cannot be read.
    fn read_columns(&self, path: &Path) -> Result<Vec<String>>;

    /// Stream `path` as normalized, filtered chunks of at most
    /// `plan.chunk_size` rows. Nothing is read until the iterator is advanced
    /// past the file header.
    fn read_chunks(&self, path: &Path, plan: Arc<ReadPlan>) -> Result<ChunkIter>;
}

/// The backend for `format`, if compiled into this build.
///
/// # Errors
/// [`CurError::FormatUnsupported`] when the matching feature is disabled.
pub fn reader_for(format: SourceFormat) -> Result<Box<dyn FormatReader>> {
    match format {
        #[cfg(feature = "io-parquet")]
        SourceFormat::Parquet => Ok(Box::new(parquet::ParquetReader)),
        #[cfg(feature = "io-csv")]
        SourceFormat::Csv => Ok(Box::new(csv::CsvReader)),
        #[allow(unreachable_patterns)]
        other => Err(CurError::FormatUnsupported {
            format: other.name().to_string(),
        }),
    }
}

/// Everything a reader needs to turn one file into chunks.
#[derive(Debug, Clone)]
pub struct ReadPlan {
    /// Dataset column map, resolved from the first discovered file.
    pub column_map: Arc<ColumnMap>,
    /// Logical columns to emit, in order; `None` emits every column.
    pub columns: Option<Vec<String>>,
    /// Service codes to keep; `None` keeps all services.
    pub service_codes: Option<HashSet<String>>,
    pub filters: Filters,
    pub chunk_size: usize,
}

impl ReadPlan {
    pub fn new(column_map: Arc<ColumnMap>, chunk_size: usize) -> Self {
        Self {
            column_map,
            columns: None,
            service_codes: None,
            filters: Filters::default(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Logical columns the physical read must include: the requested ones
    /// plus every column a filter needs. `None` means read everything.
    fn needed_logical(&self) -> Option<Vec<&str>> {
        let requested = self.columns.as_ref()?;
        let mut needed: Vec<&str> = requested.iter().map(String::as_str).collect();
        let helpers = std::iter::once(SERVICE_CODE_FIELD).chain(self.filters.columns());
        for col in helpers {
            if !needed.contains(&col) {
                needed.push(col);
            }
        }
        Some(needed)
    }

    /// Indices into `raw_header` of the columns to read physically, in file
    /// order. `None` means every column.
    ///
    /// Each needed logical field is located through the dataset's reverse map
    /// first; files whose spelling drifted from the first file fall back to
    /// normalizing their own header.
    pub fn physical_indices(&self, raw_header: &[String]) -> Option<Vec<usize>> {
        let needed = self.needed_logical()?;
        let mut picks: Vec<usize> = needed
            .iter()
            .filter_map(|logical| {
                self.column_map
                    .raw(logical)
                    .and_then(|raw| raw_header.iter().position(|h| h == raw))
                    .or_else(|| {
                        raw_header
                            .iter()
                            .position(|h| self.column_map.resolve(h) == *logical)
                    })
            })
            .collect();
        picks.sort_unstable();
        picks.dedup();
        Some(picks)
    }

    /// Logical names for a list of raw column names, unique within the list.
    pub fn logical_names<S: AsRef<str>>(&self, raw: &[S]) -> Vec<String> {
        unique_names(raw.iter().map(|r| self.column_map.resolve(r.as_ref())))
    }

    /// Service filter, user filters and output projection, in that order.
    pub fn apply(&self, mut chunk: Chunk) -> Chunk {
        if let Some(codes) = &self.service_codes
            && let Some(idx) = chunk.column_index(SERVICE_CODE_FIELD)
        {
            chunk.retain_rows(|_, row| {
                row[idx]
                    .to_key()
                    .is_some_and(|code| codes.contains(&code))
            });
        }

        if !self.filters.is_empty() {
            let bound = self.filters.bind(chunk.columns());
            if !bound.is_empty() {
                chunk.retain_rows(|_, row| bound.matches(row));
            }
        }

        match &self.columns {
            Some(cols) => chunk.project(cols),
            None => chunk,
        }
    }
}
