//! Normalized row batches.
//!
//! A [`Chunk`] is the unit that flows from the format readers to consumers:
//! logical column names plus row-major cells. It is deliberately small and
//! untyped; CUR columns drift between revisions and the same field may be a
//! string in a text export and a double in a columnar one.

use chrono::{DateTime, NaiveDate};
use std::collections::HashMap;
use std::fmt;

/// One cell of a normalized billing row.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Str(String),
    Float(f64),
    Int(i64),
    Bool(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Textual content, if the cell holds a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the cell. Strings are parsed leniently; anything
    /// unparsable or non-finite (`NaN`, `inf`) is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Value::Float(f) => *f,
            Value::Int(i) => *i as f64,
            Value::Str(s) => s.trim().parse::<f64>().ok()?,
            Value::Bool(_) | Value::Null => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Calendar date of a timestamp cell (`2024-01-31T00:00:00Z`,
    /// `2024-01-31 00:00:00`, `2024-01-31`). Offsets are honoured; anything
    /// else is `None`.
    pub fn as_date(&self) -> Option<NaiveDate> {
        let s = self.as_str()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.date_naive());
        }
        s.get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    }

    /// Non-empty textual rendering, used for grouping keys.
    pub fn to_key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Str(s) if s.is_empty() => None,
            other => Some(other.to_string()),
        }
    }

    /// Equality that tolerates representation drift between text and typed
    /// cells. Two strings compare as text, so `"0123"` and `"123"` differ;
    /// otherwise the comparison is numeric when both sides read as numbers
    /// and textual if not. `Null` equals nothing.
    pub fn loose_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => self.to_string() == other.to_string(),
            },
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Str(s) => f.write_str(s),
            Value::Float(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A row is one cell per chunk column, in column order.
pub type Row = Vec<Value>;

/// An ordered batch of normalized billing rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chunk {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Chunk {
    /// Build a chunk; rows shorter than the header are padded with `Null`,
    /// longer ones are cut.
    pub fn new(columns: Vec<String>, mut rows: Vec<Row>) -> Self {
        let width = columns.len();
        for row in &mut rows {
            row.resize(width, Value::Null);
        }
        Self { columns, rows }
    }

    /// An empty chunk with a header and no rows.
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, top to bottom, or `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Cell at `(row, column)`.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Keep only the rows matching `keep`, preserving order.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[String], &Row) -> bool,
    {
        let columns = &self.columns;
        self.rows.retain(|r| keep(columns, r));
    }

    /// Restrict the chunk to `wanted`, in that order. Names the chunk does
    /// not carry are skipped.
    pub fn project<S: AsRef<str>>(self, wanted: &[S]) -> Chunk {
        let picks: Vec<usize> = wanted
            .iter()
            .filter_map(|w| self.column_index(w.as_ref()))
            .collect();
        let columns = picks.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|mut row| picks.iter().map(|&i| std::mem::take(&mut row[i])).collect())
            .collect();
        Chunk { columns, rows }
    }

    /// Drop every row past `n`.
    pub fn truncate(&mut self, n: usize) {
        self.rows.truncate(n);
    }

    /// Split into consecutive chunks of at most `size` rows (`0` counts as 1).
    pub fn split_into(self, size: usize) -> Vec<Chunk> {
        let size = size.max(1);
        let Chunk { columns, rows } = self;
        let mut out = Vec::with_capacity(rows.len().div_ceil(size));
        let mut rows = rows.into_iter().peekable();
        while rows.peek().is_some() {
            let part: Vec<Row> = rows.by_ref().take(size).collect();
            out.push(Chunk {
                columns: columns.clone(),
                rows: part,
            });
        }
        out
    }

    /// Stack chunks vertically. The result carries the union of all columns
    /// in first-seen order; cells a chunk lacks are `Null`.
    pub fn concat<I>(chunks: I) -> Chunk
    where
        I: IntoIterator<Item = Chunk>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut rows: Vec<Row> = Vec::new();

        for chunk in chunks {
            let mapping: Vec<usize> = chunk
                .columns
                .iter()
                .map(|c| {
                    *positions.entry(c.clone()).or_insert_with(|| {
                        columns.push(c.clone());
                        columns.len() - 1
                    })
                })
                .collect();
            for row in chunk.rows {
                let mut wide = vec![Value::Null; columns.len()];
                for (cell, &to) in row.into_iter().zip(&mapping) {
                    wide[to] = cell;
                }
                rows.push(wide);
            }
        }

        Chunk::new(columns, rows)
    }
}
