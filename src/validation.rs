//! Structural health check for a dataset root.
//!
//! [`CurParser::validate`] never returns an error: every failure is folded
//! into a [`ValidationReport`], which makes it the safe entry point for
//! directories of unknown provenance.
//!
//! Checks run in order and stop early only when continuing is meaningless:
//! 1. discovery, reused if already done (no files: invalid, stop),
//! 2. schema introspection (unreadable: invalid, stop),
//! 3. required columns (missing: invalid, continue),
//! 4. recommended columns (missing: warning),
//! 5. sampled metadata (any problem: warning).

use crate::error::CurError;
use crate::metadata::DatasetMetadata;
use crate::parser::CurParser;
use serde::Serialize;

/// Logical columns a dataset must carry to be usable.
pub const REQUIRED_COLUMNS: [&str; 3] = ["usage_start_date", "product_code", "unblended_cost"];

/// Logical columns whose absence degrades, but does not prevent, analysis.
pub const RECOMMENDED_COLUMNS: [&str; 3] = ["resource_id", "region", "usage_account_id"];

/// Outcome of [`CurParser::validate`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Sampled dataset summary; absent when validation stopped early.
    pub summary: Option<DatasetMetadata>,
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            summary: None,
        }
    }
}

impl ValidationReport {
    fn fail(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

impl CurParser {
    /// Check discovery, schema and a metadata sample without scanning the
    /// whole dataset.
    ///
    /// Reuses a previous discovery and column map when present; call
    /// [`CurParser::discover`] first to validate a root whose contents changed.
    pub fn validate(&mut self) -> ValidationReport {
        let mut report = ValidationReport::default();

        match self.ensure_discovered() {
            Ok(_) => {}
            Err(err @ CurError::NoDataFound { .. }) => {
                report.fail(err.to_string());
                return finish(report);
            }
            Err(err) => {
                report.fail(format!("File discovery failed: {err}"));
                return finish(report);
            }
        }

        let schema = match self.schema() {
            Ok(schema) => schema,
            Err(err) => {
                report.fail(format!("Schema extraction failed: {err}"));
                return finish(report);
            }
        };

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|c| !schema.contains_logical(c))
            .collect();
        if !missing.is_empty() {
            report.fail(format!("Missing required columns: {}", missing.join(", ")));
        }

        let missing: Vec<&str> = RECOMMENDED_COLUMNS
            .into_iter()
            .filter(|c| !schema.contains_logical(c))
            .collect();
        if !missing.is_empty() {
            report.warn(format!("Missing recommended columns: {}", missing.join(", ")));
        }

        match self.extract_metadata() {
            Ok(metadata) => {
                if metadata.date_range.is_none() {
                    report.warn("Could not determine date range");
                }
                if metadata.accounts.is_empty() {
                    report.warn("No account IDs found");
                }
                report.summary = Some(metadata);
            }
            Err(err) => report.warn(format!("Metadata extraction warning: {err}")),
        }

        finish(report)
    }
}

fn finish(report: ValidationReport) -> ValidationReport {
    if report.valid {
        tracing::info!(warnings = report.warnings.len(), "dataset passed validation");
    } else {
        tracing::warn!(errors = ?report.errors, "dataset failed validation");
    }
    report
}
