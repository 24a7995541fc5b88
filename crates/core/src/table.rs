//! Raw and canonical tables.
//!
//! A raw table is what a data source hands over: rows of named cells with a
//! source-specific temporal column. A canonical table is keyed by
//! [`MonthPeriod`], sorted ascending, with exactly one row per period.

use crate::error::{Error, Result};
use crate::types::MonthPeriod;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;

/// Numeric value with total ordering.
pub type Value = OrderedFloat<f64>;

/// A single field of a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Missing value.
    Null,
    /// Numeric value.
    Number(Value),
    /// Text value (dates and labels arrive as text).
    Text(String),
}

impl Cell {
    /// Numeric content, if any.
    pub fn as_number(&self) -> Option<Value> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Text content, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(OrderedFloat(v))
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// One row of a raw observation table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow {
    columns: BTreeMap<String, Cell>,
}

impl RawRow {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column setter.
    pub fn with(mut self, name: impl Into<String>, cell: impl Into<Cell>) -> Self {
        self.insert(name, cell);
        self
    }

    /// Set a column.
    pub fn insert(&mut self, name: impl Into<String>, cell: impl Into<Cell>) {
        self.columns.insert(name.into(), cell.into());
    }

    /// Get a column.
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.columns.get(name)
    }

    /// All columns.
    pub fn columns(&self) -> &BTreeMap<String, Cell> {
        &self.columns
    }

    /// Copy of the columns without `name`.
    pub fn columns_without(&self, name: &str) -> BTreeMap<String, Cell> {
        self.columns
            .iter()
            .filter(|(k, _)| k.as_str() != name)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// An ordered sequence of raw rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    rows: Vec<RawRow>,
}

impl RawTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of records, e.g. `[{"date": "2021-03-05", "close": 1.5}]`.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Parse a JSON array of records from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn push(&mut self, row: RawRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Vec<RawRow>> for RawTable {
    fn from(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }
}

impl FromIterator<RawRow> for RawTable {
    fn from_iter<I: IntoIterator<Item = RawRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// One row of a canonical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Month this row stands for.
    pub period: MonthPeriod,
    /// Value columns.
    pub values: BTreeMap<String, Cell>,
}

impl Row {
    pub fn new(period: MonthPeriod, values: BTreeMap<String, Cell>) -> Self {
        Self { period, values }
    }

    /// Get a column.
    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.values.get(name)
    }

    /// Numeric value of a column, if present and numeric.
    pub fn value(&self, name: &str) -> Option<Value> {
        self.get(name).and_then(Cell::as_number)
    }
}

/// Period-indexed table: sorted ascending, one row per period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalTable {
    rows: Vec<Row>,
}

impl CanonicalTable {
    /// Build a canonical table, sorting by period.
    ///
    /// Fails with [`Error::DuplicatePeriod`] if two rows share a period.
    pub fn from_rows(mut rows: Vec<Row>) -> Result<Self> {
        rows.sort_by_key(|r| r.period);
        if let Some(pair) = rows.windows(2).find(|w| w[0].period == w[1].period) {
            return Err(Error::DuplicatePeriod(pair[0].period));
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for `period`, by index lookup.
    pub fn get(&self, period: MonthPeriod) -> Option<&Row> {
        self.rows
            .binary_search_by_key(&period, |r| r.period)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Periods in ascending order.
    pub fn periods(&self) -> impl Iterator<Item = MonthPeriod> + '_ {
        self.rows.iter().map(|r| r.period)
    }

    pub fn first_period(&self) -> Option<MonthPeriod> {
        self.rows.first().map(|r| r.period)
    }

    pub fn last_period(&self) -> Option<MonthPeriod> {
        self.rows.last().map(|r| r.period)
    }

    /// Owned copies of the rows with `start <= period <= end`.
    ///
    /// An inverted range yields no rows.
    pub fn range(&self, start: MonthPeriod, end: MonthPeriod) -> Vec<Row> {
        if start > end {
            return Vec::new();
        }
        let lo = self.rows.partition_point(|r| r.period < start);
        let hi = self.rows.partition_point(|r| r.period <= end);
        self.rows[lo..hi].to_vec()
    }
}
