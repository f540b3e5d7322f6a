//! Incremental cost aggregation over a chunk stream.
//!
//! Each aggregator folds one chunk at a time and keeps only its running
//! totals, so a full scan never materializes the dataset. A chunk missing
//! the columns an aggregator needs is skipped; a row whose key or cost cannot
//! be read is excluded.
//!
//! ```
//! use cur_ingest::aggregate::{ChunkAggregator, CostByKey};
//! use cur_ingest::{Chunk, Value};
//!
//! let chunk = Chunk::new(
//!     vec!["resource_id".into(), "unblended_cost".into()],
//!     vec![
//!         vec![Value::from("i-1"), Value::from(10.0)],
//!         vec![Value::from("i-1"), Value::from(5.5)],
//!     ],
//! );
//! let mut agg = CostByKey::resource();
//! agg.add_chunk(&chunk);
//! assert_eq!(agg.finish()["i-1"], 15.5);
//! ```

use crate::chunk::{Chunk, Value};
use crate::error::Result;
use crate::normalize::{TAG_FIELD_PREFIX, is_tag_field};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const COST_FIELD: &str = "unblended_cost";
pub const RESOURCE_FIELD: &str = "resource_id";
pub const SERVICE_FIELD: &str = "product_code";
pub const USAGE_DATE_FIELD: &str = "usage_start_date";

/// A fold over chunks.
///
/// - `add_chunk` absorbs one chunk into the accumulator,
/// - `finish` turns the accumulator into the result.
pub trait ChunkAggregator {
    type Output;

    fn add_chunk(&mut self, chunk: &Chunk);

    fn finish(self) -> Self::Output;
}

/// Drive `aggregator` over a fallible chunk sequence. The first read error
/// aborts the fold.
pub fn fold_chunks<I, A>(chunks: I, mut aggregator: A) -> Result<A::Output>
where
    I: IntoIterator<Item = Result<Chunk>>,
    A: ChunkAggregator,
{
    for chunk in chunks {
        aggregator.add_chunk(&chunk?);
    }
    Ok(aggregator.finish())
}

/// Cost contribution of a cell: missing cost counts as zero, a cost that is
/// present but unparsable excludes the row.
fn cost_of(cell: &Value) -> Option<f64> {
    if cell.is_null() {
        Some(0.0)
    } else {
        cell.as_f64()
    }
}

/// Sum of `unblended_cost` keyed by the value of one column.
#[derive(Debug, Clone)]
pub struct CostByKey {
    key_column: String,
    totals: HashMap<String, f64>,
}

impl CostByKey {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
            totals: HashMap::new(),
        }
    }

    /// Cost per `resource_id`; rows without a resource id are excluded.
    pub fn resource() -> Self {
        Self::new(RESOURCE_FIELD)
    }

    /// Cost per `product_code`.
    pub fn service() -> Self {
        Self::new(SERVICE_FIELD)
    }
}

impl ChunkAggregator for CostByKey {
    type Output = HashMap<String, f64>;

    fn add_chunk(&mut self, chunk: &Chunk) {
        let (Some(key_idx), Some(cost_idx)) = (
            chunk.column_index(&self.key_column),
            chunk.column_index(COST_FIELD),
        ) else {
            return;
        };
        for row in chunk.rows() {
            if let (Some(key), Some(cost)) = (row[key_idx].to_key(), cost_of(&row[cost_idx])) {
                *self.totals.entry(key).or_insert(0.0) += cost;
            }
        }
    }

    fn finish(self) -> Self::Output {
        self.totals
    }
}

/// Cost per calendar day of `usage_start_date`, ascending by date.
#[derive(Debug, Clone, Default)]
pub struct CostByDay {
    totals: BTreeMap<NaiveDate, f64>,
}

impl CostByDay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChunkAggregator for CostByDay {
    type Output = BTreeMap<NaiveDate, f64>;

    fn add_chunk(&mut self, chunk: &Chunk) {
        let (Some(date_idx), Some(cost_idx)) = (
            chunk.column_index(USAGE_DATE_FIELD),
            chunk.column_index(COST_FIELD),
        ) else {
            return;
        };
        for row in chunk.rows() {
            if let (Some(day), Some(cost)) = (row[date_idx].as_date(), cost_of(&row[cost_idx])) {
                *self.totals.entry(day).or_insert(0.0) += cost;
            }
        }
    }

    fn finish(self) -> Self::Output {
        self.totals
    }
}

/// Rows with and without a value for one tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TagCounts {
    pub tagged: u64,
    pub untagged: u64,
}

impl TagCounts {
    /// Share of rows carrying the tag, in `[0, 1]`.
    pub fn coverage(&self) -> f64 {
        let total = self.tagged + self.untagged;
        if total == 0 {
            0.0
        } else {
            self.tagged as f64 / total as f64
        }
    }
}

/// Tagged/untagged row counts for every `tag_*` column, keyed by tag name.
#[derive(Debug, Clone, Default)]
pub struct TagCoverage {
    counts: BTreeMap<String, TagCounts>,
}

impl TagCoverage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChunkAggregator for TagCoverage {
    type Output = BTreeMap<String, TagCounts>;

    fn add_chunk(&mut self, chunk: &Chunk) {
        for (idx, column) in chunk.columns().iter().enumerate() {
            if !is_tag_field(column) {
                continue;
            }
            let tag = column.strip_prefix(TAG_FIELD_PREFIX).unwrap_or(column).to_string();
            let tagged = chunk.rows().iter().filter(|r| !r[idx].is_null()).count() as u64;
            let entry = self.counts.entry(tag).or_default();
            entry.tagged += tagged;
            entry.untagged += chunk.len() as u64 - tagged;
        }
    }

    fn finish(self) -> Self::Output {
        self.counts
    }
}
