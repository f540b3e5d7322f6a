//! Locate the billing files that make up one logical dataset.

use crate::error::{CurError, Result};
use crate::io::SourceFormat;
use crate::io::compression::compressed_extensions;
use crate::io::glob::find_recursive;
use serde::Serialize;
use std::path::{Path, PathBuf};

const PARQUET_SUFFIX: &str = ".parquet";
const CSV_SUFFIX: &str = ".csv";

/// Files found under a root, in discovery order, with coarse size metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discovery {
    pub root: PathBuf,
    pub format: SourceFormat,
    pub files: Vec<PathBuf>,
    pub total_size_bytes: u64,
}

impl Discovery {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn total_size_mb(&self) -> f64 {
        self.total_size_bytes as f64 / (1024.0 * 1024.0)
    }

    /// First file in discovery order; the dataset schema is read from it.
    pub fn first_file(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }
}

/// Search `root` recursively for billing files.
///
/// Columnar files take precedence: when any `.parquet` file exists, text
/// files are ignored entirely. Otherwise `.csv` files and their compressed
/// variants (`.csv.gz` and any other codec compiled in) form the dataset.
/// Files are sorted within each format; no content is read.
///
/// # Errors
/// [`CurError::NoDataFound`] when neither format yields a file.
pub fn discover(root: impl AsRef<Path>) -> Result<Discovery> {
    let root = root.as_ref();

    let mut format = SourceFormat::Parquet;
    let mut files = find_recursive(root, PARQUET_SUFFIX)?;

    if files.is_empty() {
        format = SourceFormat::Csv;
        files = find_recursive(root, CSV_SUFFIX)?;
        for ext in compressed_extensions() {
            files.extend(find_recursive(root, &format!("{CSV_SUFFIX}{ext}"))?);
        }
        files.sort();
        files.dedup();
    }

    if files.is_empty() {
        tracing::warn!(root = %root.display(), "no billing files found");
        return Err(CurError::NoDataFound {
            root: root.to_path_buf(),
        });
    }

    let mut total_size_bytes = 0u64;
    for f in &files {
        total_size_bytes += std::fs::metadata(f)?.len();
    }

    tracing::info!(
        root = %root.display(),
        format = %format,
        files = files.len(),
        total_size_bytes,
        "discovered billing files"
    );

    Ok(Discovery {
        root: root.to_path_buf(),
        format,
        files,
        total_size_bytes,
    })
}
