//! Tabular results: typed rows that can be flattened into named columns.

use indexmap::IndexMap;
use jiff::{SignedDuration, Timestamp};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// A single typed value in a flattened record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// An optional field that the service did not return.
    Null,
    Text(String),
    Timestamp(Timestamp),
    Duration(SignedDuration),
    Integer(u64),
    /// Nested data kept as-is, such as thumbnails or tags.
    Blob(serde_json::Value),
}

impl Cell {
    /// Captures any serializable value as an opaque JSON blob.
    pub fn blob<T: Serialize>(value: &T) -> Self {
        serde_json::to_value(value).map_or(Cell::Null, Cell::Blob)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Cell::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Timestamp(t) => write!(f, "{t}"),
            Cell::Duration(d) => write!(f, "{d}"),
            Cell::Integer(n) => write!(f, "{n}"),
            Cell::Blob(v) => write!(f, "{v}"),
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<Timestamp> for Cell {
    fn from(t: Timestamp) -> Self {
        Cell::Timestamp(t)
    }
}

impl From<SignedDuration> for Cell {
    fn from(d: SignedDuration) -> Self {
        Cell::Duration(d)
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Integer(n)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Null, Into::into)
    }
}

/// One flattened result: column name to cell, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlatRecord(IndexMap<&'static str, Cell>);

impl FlatRecord {
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.0.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Cell)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A row type with a fixed set of named columns.
pub trait Record {
    /// Column names, in the order [`Record::cells`] returns values.
    const COLUMNS: &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;

    fn to_flat(&self) -> FlatRecord {
        FlatRecord(Self::COLUMNS.iter().copied().zip(self.cells()).collect())
    }
}

/// Ordered rows returned by one operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable<R> {
    rows: Vec<R>,
}

impl<R> Default for ResultTable<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R> ResultTable<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl<R: Record> ResultTable<R> {
    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    /// Flattens every row.
    pub fn records(&self) -> impl Iterator<Item = FlatRecord> + '_ {
        self.rows.iter().map(Record::to_flat)
    }

    /// Writes a header line followed by one tab-separated line per row.
    ///
    /// Tabs and line breaks inside cells are escaped so each record stays on one line.
    pub fn write_tsv(&self, mut out: impl Write) -> io::Result<()> {
        writeln!(out, "{}", R::COLUMNS.join("\t"))?;
        for row in &self.rows {
            let line = row
                .cells()
                .iter()
                .map(|cell| escape_tsv(&cell.to_string()))
                .collect::<Vec<_>>()
                .join("\t");
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    /// Writes one JSON object per row.
    pub fn write_json_lines(&self, mut out: impl Write) -> io::Result<()> {
        for record in self.records() {
            serde_json::to_writer(&mut out, &record)?;
            writeln!(out)?;
        }
        Ok(())
    }
}

fn escape_tsv(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

impl<R> FromIterator<R> for ResultTable<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<R> IntoIterator for ResultTable<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a ResultTable<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
