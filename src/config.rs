//! Parser configuration.
//!
//! Loaded from an optional `config.json` next to a client's `raw-data`
//! directory, then overridden from the environment:
//! - `CUR_CHUNK_SIZE` - rows per chunk
//! - `CUR_SAMPLE_ROWS` - rows sampled for metadata extraction

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

pub const DEFAULT_CHUNK_SIZE: usize = 100_000;
pub const DEFAULT_SAMPLE_ROWS: usize = 1_000;

const CHUNK_SIZE_ENV: &str = "CUR_CHUNK_SIZE";
const SAMPLE_ROWS_ENV: &str = "CUR_SAMPLE_ROWS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Rows per chunk for aggregations and table materialization.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Size of the first-file prefix read by metadata extraction.
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,

    /// Client settings the engine does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_sample_rows() -> usize {
    DEFAULT_SAMPLE_ROWS
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            sample_rows: default_sample_rows(),
            extra: serde_json::Map::new(),
        }
    }
}

impl ParserConfig {
    /// Parse a JSON config file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let config: ParserConfig = serde_json::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Load `path` if it exists, defaults otherwise, then apply environment
    /// overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    /// Apply `CUR_CHUNK_SIZE` / `CUR_SAMPLE_ROWS` when set and numeric.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(n) = env_usize(CHUNK_SIZE_ENV) {
            self.chunk_size = n;
        }
        if let Some(n) = env_usize(SAMPLE_ROWS_ENV) {
            self.sample_rows = n;
        }
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        self.chunk_size = self.chunk_size.max(1);
        self.sample_rows = self.sample_rows.max(1);
        self
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring non-numeric override");
            None
        }
    }
}
