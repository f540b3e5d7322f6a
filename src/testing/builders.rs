//! Writers for synthetic billing files.

use anyhow::{Context, Result};
use std::fs::{File, create_dir_all};
use std::path::Path;

/// Logical fields written as `Float64` by [`CurFileBuilder::write_parquet`].
#[cfg(feature = "io-parquet")]
const NUMERIC_FIELDS: &[&str] = &[
    "usage_amount",
    "unblended_cost",
    "blended_cost",
    "public_ondemand_cost",
    "reservation_effective_cost",
    "reservation_unused_quantity",
    "reservation_unused_fee",
    "savings_plan_effective_cost",
    "savings_plan_rate",
];

/// A fluent builder for one billing file.
///
/// Cells are given as text; an empty cell is written as a missing value.
/// Missing trailing cells are padded the same way.
///
/// # Example
///
/// ```no_run
/// use cur_ingest::testing::CurFileBuilder;
///
/// # fn main() -> anyhow::Result<()> {
/// CurFileBuilder::new()
///     .columns(["lineItem/ProductCode", "lineItem/UnblendedCost"])
///     .row(["AmazonEC2", "1.5"])
///     .row(["AmazonS3", ""])
///     .write_csv("/tmp/cur/report.csv.gz")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CurFileBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CurFileBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw header.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append one row.
    #[must_use]
    pub fn row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Append many rows.
    #[must_use]
    pub fn rows<I, R, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for row in rows {
            self = self.row(row);
        }
        self
    }

    /// Append `n` rows produced by `make(i)`.
    #[must_use]
    pub fn generate<F, R, S>(mut self, n: usize, mut make: F) -> Self
    where
        F: FnMut(usize) -> R,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for i in 0..n {
            self = self.row(make(i));
        }
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn padded_rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        let width = self.columns.len();
        self.rows.iter().map(move |row| {
            (0..width)
                .map(|i| row.get(i).map_or("", String::as_str))
                .collect()
        })
    }

    /// Write a CSV file, compressed according to the file extension
    /// (`.csv.gz`, `.csv.zst`, ...). Parent directories are created.
    #[cfg(feature = "io-csv")]
    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        use std::io::Write;

        let path = path.as_ref();
        create_parent(path)?;
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let sink = crate::io::compression::auto_detect_writer(file, path)
            .with_context(|| format!("open encoder for {}", path.display()))?;

        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(&self.columns).context("write CSV header")?;
        for row in self.padded_rows() {
            writer.write_record(&row).context("write CSV row")?;
        }
        let mut sink = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flush CSV writer: {}", e.error()))?;
        sink.flush().with_context(|| format!("flush {}", path.display()))?;
        Ok(())
    }

    /// Write a Parquet file. Known cost and quantity fields become
    /// `Float64` columns, everything else `Utf8`.
    #[cfg(feature = "io-parquet")]
    pub fn write_parquet(&self, path: impl AsRef<Path>) -> Result<()> {
        use crate::normalize::normalize;
        use arrow::array::{ArrayRef, Float64Array, StringArray};
        use arrow::datatypes::{DataType, Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::arrow_writer::ArrowWriter;
        use parquet::file::properties::WriterProperties;
        use std::sync::Arc;

        let path = path.as_ref();
        create_parent(path)?;
        let rows: Vec<Vec<&str>> = self.padded_rows().collect();

        let mut fields = Vec::with_capacity(self.columns.len());
        let mut arrays: Vec<ArrayRef> = Vec::with_capacity(self.columns.len());
        for (idx, name) in self.columns.iter().enumerate() {
            let cells = rows.iter().map(|r| Some(r[idx]).filter(|c| !c.is_empty()));
            if NUMERIC_FIELDS.contains(&normalize(name).as_str()) {
                let values = cells
                    .map(|c| c.map(str::parse::<f64>).transpose())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .with_context(|| format!("non-numeric cell in {name}"))?;
                fields.push(Field::new(name, DataType::Float64, true));
                arrays.push(Arc::new(Float64Array::from(values)));
            } else {
                fields.push(Field::new(name, DataType::Utf8, true));
                arrays.push(Arc::new(StringArray::from(cells.collect::<Vec<_>>())));
            }
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
            .context("build record batch")?;
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        let props = WriterProperties::builder().build();
        let mut writer =
            ArrowWriter::try_new(file, batch.schema(), Some(props)).context("create ArrowWriter")?;
        writer.write(&batch).context("write batch")?;
        writer.close().context("close ArrowWriter")?;
        Ok(())
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}
