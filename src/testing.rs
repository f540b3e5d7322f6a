//! Testing utilities for code built on `cur-ingest`.
//!
//! Real exports are large and awkward to check in, so tests usually build a
//! small synthetic one on disk and point a [`CurParser`](crate::CurParser) at
//! it:
//!
//! - **Builders**: [`CurFileBuilder`] writes CSV (plain or compressed) and
//!   Parquet billing files with arbitrary headers
//! - **Fixtures**: [`sample_header`] and [`sample_rows`] give a realistic
//!   CUR 1 layout covering several services, accounts and days
//! - **Assertions**: [`assert_costs_close`] compares cost maps with a
//!   floating-point tolerance
//!
//! # Quick Start
//!
//! ```no_run
//! use cur_ingest::CurParser;
//! use cur_ingest::testing::*;
//!
//! fn resource_totals() -> anyhow::Result<()> {
//!     let dir = tempfile::tempdir()?;
//!     CurFileBuilder::new()
//!         .columns(sample_header())
//!         .rows(sample_rows())
//!         .write_csv(dir.path().join("2024-01/report-1.csv"))?;
//!
//!     let mut parser = CurParser::new(dir.path());
//!     let costs = parser.resource_costs(None)?;
//!     assert_costs_close(&costs, &[("i-1", 15.5), ("i-2", 3.25)], 1e-9);
//!     Ok(())
//! }
//! ```

mod assertions;
mod builders;
mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
