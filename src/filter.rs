//! Row filters applied inside the readers, before a chunk is emitted.

use crate::chunk::{Row, Value};

/// Condition on a single logical column.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Cell must equal the value.
    Eq(Value),
    /// Cell must equal one of the values.
    OneOf(Vec<Value>),
}

impl Condition {
    pub fn matches(&self, cell: &Value) -> bool {
        match self {
            Condition::Eq(v) => cell.loose_eq(v),
            Condition::OneOf(vs) => vs.iter().any(|v| cell.loose_eq(v)),
        }
    }
}

/// Ordered equality/membership filters over logical columns.
///
/// A filter whose column is missing from a chunk is ignored for that chunk.
///
/// ```
/// use cur_ingest::Filters;
///
/// let filters = Filters::new()
///     .eq("region", "us-east-1")
///     .one_of("usage_account_id", ["111111111111", "222222222222"]);
/// assert_eq!(filters.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    conditions: Vec<(String, Condition)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions
            .push((column.into(), Condition::Eq(value.into())));
        self
    }

    #[must_use]
    pub fn one_of<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.conditions
            .push((column.into(), Condition::OneOf(values)));
        self
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Filtered column names, in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.conditions.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(c, cond)| (c.as_str(), cond))
    }

    /// Resolve column names against a chunk header once, so the per-row
    /// check is index based.
    pub(crate) fn bind(&self, header: &[String]) -> BoundFilters<'_> {
        let checks = self
            .conditions
            .iter()
            .filter_map(|(col, cond)| {
                header.iter().position(|h| h == col).map(|idx| (idx, cond))
            })
            .collect();
        BoundFilters { checks }
    }
}

/// [`Filters`] resolved against one header.
pub(crate) struct BoundFilters<'a> {
    checks: Vec<(usize, &'a Condition)>,
}

impl BoundFilters<'_> {
    pub(crate) fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub(crate) fn matches(&self, row: &Row) -> bool {
        self.checks
            .iter()
            .all(|(idx, cond)| cond.matches(&row[*idx]))
    }
}
