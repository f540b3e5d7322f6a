//! The chunked parse pipeline.
//!
//! [`CurParser`] is bound to one dataset root. Discovery and column-map
//! resolution run lazily on first use and are memoized; every call to
//! [`CurParser::parse`] re-reads the files and returns a fresh, single-pass
//! [`ChunkStream`].

use crate::aggregate::{ChunkAggregator, CostByDay, CostByKey, TagCounts, TagCoverage, fold_chunks};
use crate::chunk::Chunk;
use crate::config::ParserConfig;
use crate::discovery::{self, Discovery};
use crate::domain::Domain;
use crate::error::{CurError, Result};
use crate::filter::Filters;
use crate::io::{ChunkIter, FormatReader, ReadPlan, reader_for};
use crate::metadata::DatasetMetadata;
use crate::normalize::ColumnMap;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Parser for one CUR dataset root.
pub struct CurParser {
    root: PathBuf,
    config: ParserConfig,
    discovery: Option<Discovery>,
    column_map: Option<Arc<ColumnMap>>,
}

impl CurParser {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, ParserConfig::default())
    }

    pub fn with_config(root: impl Into<PathBuf>, config: ParserConfig) -> Self {
        Self {
            root: root.into(),
            config,
            discovery: None,
            column_map: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Run discovery again, dropping the cached column map.
    ///
    /// # Errors
    /// [`CurError::NoDataFound`] when the root holds no billing files.
    pub fn discover(&mut self) -> Result<&Discovery> {
        self.discovery = None;
        self.column_map = None;
        let found = discovery::discover(&self.root)?;
        let found: &Discovery = self.discovery.insert(found);
        Ok(found)
    }

    /// Cached discovery, running it on first use.
    pub(crate) fn ensure_discovered(&mut self) -> Result<&Discovery> {
        if self.discovery.is_none() {
            self.discover()?;
        }
        self.discovery.as_ref().ok_or_else(|| CurError::NoDataFound {
            root: self.root.clone(),
        })
    }

    /// Column map of the dataset, built from the first discovered file.
    ///
    /// # Errors
    /// [`CurError::NoDataFound`], [`CurError::FormatUnsupported`] or
    /// [`CurError::SchemaRead`].
    pub fn schema(&mut self) -> Result<Arc<ColumnMap>> {
        if let Some(map) = &self.column_map {
            return Ok(Arc::clone(map));
        }

        let discovery = self.ensure_discovered()?;
        let format = discovery.format;
        let first = discovery
            .first_file()
            .map(Path::to_path_buf)
            .ok_or_else(|| CurError::NoDataFound {
                root: discovery.root.clone(),
            })?;

        let reader = reader_for(format)?;
        let map = Arc::new(ColumnMap::from_columns(reader.read_columns(&first)?));
        info!(file = %first.display(), columns = map.len(), "resolved dataset schema");

        self.column_map = Some(Arc::clone(&map));
        Ok(map)
    }

    /// Stream the dataset as normalized chunks of at most `chunk_size` rows.
    ///
    /// A `domain` narrows both the emitted columns and the service codes;
    /// `filters` further restrict rows. Files are read in discovery order
    /// and only when the stream reaches them.
    ///
    /// # Errors
    /// Fails before yielding anything if discovery or schema resolution
    /// fails; read errors surface as `Err` items.
    pub fn parse(
        &mut self,
        domain: Option<Domain>,
        filters: Option<&Filters>,
        chunk_size: usize,
    ) -> Result<ChunkStream> {
        let column_map = self.schema()?;
        let discovery = self.ensure_discovered()?;
        let reader = reader_for(discovery.format)?;

        let mut plan = ReadPlan::new(column_map, chunk_size);
        if let Some(domain) = domain {
            plan.columns = domain
                .columns()
                .map(|cols| cols.iter().map(|c| (*c).to_string()).collect());
            plan.service_codes = domain
                .service_codes()
                .map(|codes| codes.iter().map(|c| (*c).to_string()).collect());
        }
        if let Some(filters) = filters {
            plan.filters = filters.clone();
        }

        debug!(
            domain = domain.map(Domain::name),
            files = discovery.file_count(),
            chunk_size = plan.chunk_size,
            "starting parse"
        );

        Ok(ChunkStream::new(reader, discovery.files.clone(), plan))
    }

    /// Collect the stream into one table, stopping once `max_rows` rows are
    /// gathered (the last chunk is cut to the remaining quota).
    ///
    /// Memory grows with the result. Use [`CurParser::parse`] when the
    /// dataset may not fit.
    pub fn parse_to_table(
        &mut self,
        domain: Option<Domain>,
        filters: Option<&Filters>,
        max_rows: Option<usize>,
    ) -> Result<Chunk> {
        let chunk_size = self.config.chunk_size;
        let mut parts = Vec::new();
        let mut total = 0usize;

        for chunk in self.parse(domain, filters, chunk_size)? {
            let mut chunk = chunk?;
            if let Some(limit) = max_rows
                && total + chunk.len() >= limit
            {
                chunk.truncate(limit - total);
                parts.push(chunk);
                break;
            }
            total += chunk.len();
            parts.push(chunk);
        }

        Ok(Chunk::concat(parts))
    }

    /// File-level metadata plus accounts, services, regions and date range
    /// sampled from the first `sample_rows` rows of the first file.
    pub fn extract_metadata(&mut self) -> Result<DatasetMetadata> {
        let sample_rows = self.config.sample_rows;
        let column_map = self.schema()?;
        let discovery = self.ensure_discovered()?;
        let mut metadata = DatasetMetadata::from_discovery(discovery);

        let Some(first) = discovery.first_file().map(Path::to_path_buf) else {
            return Ok(metadata);
        };
        let reader = reader_for(discovery.format)?;
        let plan = Arc::new(ReadPlan::new(column_map, sample_rows));

        if let Some(sample) = reader.read_chunks(&first, plan)?.next().transpose()? {
            debug!(rows = sample.len(), "sampled first file for metadata");
            metadata.absorb_sample(&sample);
        }
        Ok(metadata)
    }

    fn aggregate<A: ChunkAggregator>(
        &mut self,
        domain: Option<Domain>,
        aggregator: A,
    ) -> Result<A::Output> {
        let chunk_size = self.config.chunk_size;
        let stream = self.parse(domain, None, chunk_size)?;
        fold_chunks(stream, aggregator)
    }

    /// Total `unblended_cost` per resource id.
    pub fn resource_costs(&mut self, domain: Option<Domain>) -> Result<HashMap<String, f64>> {
        self.aggregate(domain, CostByKey::resource())
    }

    /// Total `unblended_cost` per service code, across all services.
    pub fn service_costs(&mut self) -> Result<HashMap<String, f64>> {
        self.aggregate(None, CostByKey::service())
    }

    /// Total `unblended_cost` per usage day, ascending.
    pub fn daily_costs(&mut self, domain: Option<Domain>) -> Result<BTreeMap<NaiveDate, f64>> {
        self.aggregate(domain, CostByDay::new())
    }

    /// Tagged/untagged row counts per resource tag.
    pub fn tag_coverage(&mut self) -> Result<BTreeMap<String, TagCounts>> {
        self.aggregate(None, TagCoverage::new())
    }
}

/// Lazy chunk sequence over every discovered file.
///
/// Single pass: once exhausted, or after the first `Err`, it yields `None`.
pub struct ChunkStream {
    reader: Box<dyn FormatReader>,
    files: std::vec::IntoIter<PathBuf>,
    plan: Arc<ReadPlan>,
    current: Option<ChunkIter>,
    failed: bool,
}

impl ChunkStream {
    fn new(reader: Box<dyn FormatReader>, files: Vec<PathBuf>, plan: ReadPlan) -> Self {
        Self {
            reader,
            files: files.into_iter(),
            plan: Arc::new(plan),
            current: None,
            failed: false,
        }
    }

    pub fn plan(&self) -> &ReadPlan {
        &self.plan
    }
}

impl Iterator for ChunkStream {
    type Item = Result<Chunk>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }

            if let Some(chunks) = self.current.as_mut() {
                match chunks.next() {
                    Some(Ok(chunk)) => return Some(Ok(chunk)),
                    Some(Err(err)) => {
                        self.failed = true;
                        return Some(Err(err));
                    }
                    None => self.current = None,
                }
            }

            let path = self.files.next()?;
            debug!(file = %path.display(), "opening billing file");
            match self.reader.read_chunks(&path, Arc::clone(&self.plan)) {
                Ok(chunks) => self.current = Some(chunks),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl FusedIterator for ChunkStream {}

/// Parser for a client directory: data under `<client_dir>/raw-data`,
/// optional settings in `<client_dir>/config.json`.
pub fn create_parser(client_dir: impl AsRef<Path>) -> anyhow::Result<CurParser> {
    let client_dir = client_dir.as_ref();
    let config = ParserConfig::load(client_dir.join("config.json"))?;
    Ok(CurParser::with_config(client_dir.join("raw-data"), config))
}
