//! # cur-ingest
//!
//! Streaming ingestion for **AWS Cost and Usage Report** (CUR) exports.
//! A dataset root is a directory tree of billing files, either Parquet or
//! (optionally compressed) CSV. `cur-ingest` discovers those files, maps
//! their vendor column names onto one stable logical vocabulary, and hands
//! the rows back as bounded [`Chunk`]s so that datasets larger than memory
//! can be scanned and aggregated.
//!
//! ## Key Features
//!
//! - **Column normalization** - `lineItem/UnblendedCost` and
//!   `line_item_unblended_cost` both become `unblended_cost`
//! - **Format auto-detection** - Parquet first, CSV (plain or compressed) second
//! - **Bounded memory** - every read is chunked, files are opened lazily
//! - **Domain views** - predefined column and service subsets (compute, storage, ...)
//! - **Filters** - equality and membership tests on logical columns
//! - **Aggregates** - cost per resource, service and day, tag coverage
//! - **Validation** - a structural health report that never errors
//!
//! ## Quick Start
//!
//! ```no_run
//! use cur_ingest::{CurParser, Domain, Filters};
//! # fn main() -> cur_ingest::Result<()> {
//! let mut parser = CurParser::new("/data/acme/raw-data");
//!
//! let report = parser.validate();
//! assert!(report.valid, "{:?}", report.errors);
//!
//! let filters = Filters::new().eq("region", "us-east-1");
//! for chunk in parser.parse(Some(Domain::Compute), Some(&filters), 50_000)? {
//!     let chunk = chunk?;
//!     println!("{} rows", chunk.len());
//! }
//!
//! let per_service = parser.service_costs()?;
//! # let _ = per_service;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`normalize`] - raw column name to logical name mapping
//! - [`discovery`] - locating billing files under a root
//! - [`io`] - per-format chunk readers and compression codecs
//! - [`parser`] - the chunk stream and table collection
//! - [`aggregate`] - incremental cost and tag aggregators
//! - [`validation`] - dataset health checks
//! - [`testing`] - builders and assertions for tests over synthetic exports

pub mod aggregate;
pub mod chunk;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod filter;
pub mod io;
pub mod logging;
pub mod metadata;
pub mod normalize;
pub mod parser;
pub mod testing;
pub mod validation;

pub use aggregate::TagCounts;
pub use chunk::{Chunk, Row, Value};
pub use config::ParserConfig;
pub use discovery::{Discovery, discover};
pub use domain::Domain;
pub use error::{CurError, Result};
pub use filter::{Condition, Filters};
pub use io::SourceFormat;
pub use logging::init_logging;
pub use metadata::{DatasetMetadata, DateRange};
pub use normalize::{ColumnMap, normalize};
pub use parser::{ChunkStream, CurParser, create_parser};
pub use validation::ValidationReport;
