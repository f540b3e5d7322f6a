//! Recursive file matching under a dataset root.

use crate::error::Result;
use glob::{MatchOptions, Pattern, glob_with};
use std::path::{Path, PathBuf};

/// Expand a glob pattern into a sorted list of matching regular files.
///
/// Directories are skipped; entries that cannot be read are logged and
/// skipped as well, so one unreadable subdirectory does not hide the rest of
/// a partitioned export. An empty result is not an error.
///
/// # Errors
/// Returns an error if the pattern itself is invalid.
pub fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut result = Vec::new();
    for entry in glob_with(pattern, options)? {
        match entry {
            Ok(path) if path.is_file() => result.push(path),
            Ok(_) => {}
            Err(err) => tracing::warn!(%err, pattern, "skipping unreadable glob entry"),
        }
    }

    // deterministic discovery order
    result.sort();
    Ok(result)
}

/// Find every file under `root`, at any depth, whose name ends with `suffix`
/// (for example `.parquet` or `.csv.gz`).
pub fn find_recursive(root: &Path, suffix: &str) -> Result<Vec<PathBuf>> {
    let base = Pattern::escape(&root.to_string_lossy());
    let pattern = format!("{base}/**/*{suffix}");
    expand_glob(&pattern)
}
