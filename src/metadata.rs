//! Coarse dataset summary.
//!
//! Everything beyond file count and size is sampled from a bounded prefix
//! of the first file. It describes the dataset; it is not an aggregate and
//! must not be reported as one.

use crate::chunk::Chunk;
use crate::discovery::Discovery;
use crate::io::SourceFormat;
use chrono::NaiveDate;
use serde::Serialize;

/// Earliest and latest usage dates seen in the sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetMetadata {
    pub format: SourceFormat,
    pub file_count: usize,
    pub total_size_bytes: u64,
    pub date_range: Option<DateRange>,
    pub accounts: Vec<String>,
    pub services: Vec<String>,
    pub regions: Vec<String>,
}

impl DatasetMetadata {
    pub fn from_discovery(discovery: &Discovery) -> Self {
        Self {
            format: discovery.format,
            file_count: discovery.file_count(),
            total_size_bytes: discovery.total_size_bytes,
            date_range: None,
            accounts: Vec::new(),
            services: Vec::new(),
            regions: Vec::new(),
        }
    }

    pub fn total_size_mb(&self) -> f64 {
        self.total_size_bytes as f64 / (1024.0 * 1024.0)
    }

    /// Fold a sample chunk into the summary. Unparsable dates are ignored.
    pub fn absorb_sample(&mut self, sample: &Chunk) {
        if let Some(dates) = sample.column("usage_start_date") {
            for day in dates.filter_map(|v| v.as_date()) {
                self.date_range = Some(match self.date_range {
                    Some(r) => DateRange {
                        start: r.start.min(day),
                        end: r.end.max(day),
                    },
                    None => DateRange {
                        start: day,
                        end: day,
                    },
                });
            }
        }

        distinct_into(sample, "usage_account_id", &mut self.accounts);
        distinct_into(sample, "product_code", &mut self.services);
        distinct_into(sample, "region", &mut self.regions);
    }
}

/// Append the column's distinct non-empty values not yet in `out`,
/// preserving first-seen order.
fn distinct_into(chunk: &Chunk, column: &str, out: &mut Vec<String>) {
    let Some(values) = chunk.column(column) else {
        return;
    };
    for key in values.filter_map(|v| v.to_key()) {
        if !out.contains(&key) {
            out.push(key);
        }
    }
}
