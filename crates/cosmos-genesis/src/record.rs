//! Tabular query results.

use crate::error::{CosmosError, CosmosResult};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use std::str::FromStr;

/// Raw result of one query: a header plus string-valued rows.
///
/// The service returns every cell as text (or NULL); typed access goes
/// through [`Record::try_get`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { columns, rows }
    }

    /// Build a result set from rows whose header is unknown.
    ///
    /// Columns are named `col0`, `col1`, ... after the widest row.
    pub fn without_header(rows: Vec<Vec<Option<String>>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let columns = (0..width).map(|i| format!("col{i}")).collect();
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert rows into column-keyed records, in column order.
    ///
    /// Missing trailing cells become NULL; extra cells beyond the header are dropped.
    /// A repeated column name gets a numeric suffix (`planet_id`, `planet_id_1`, ...).
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .enumerate()
                    .map(|(i, col)| (col.clone(), row.get(i).cloned().flatten()))
                    .collect()
            })
            .collect()
    }
}

/// One result row: column name to scalar value (NULL is `None`).
///
/// Columns keep the order of the query's result header, and names are unique.
/// Serializes as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: Vec<(String, Option<String>)>,
}

impl Record {
    fn lookup(&self, column: &str) -> Option<&Option<String>> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Append a column, suffixing the name with `_1`, `_2`, ... if it is taken.
    fn push(&mut self, column: String, value: Option<String>) {
        let mut name = column.clone();
        let mut n = 0;
        while self.lookup(&name).is_some() {
            n += 1;
            name = format!("{column}_{n}");
        }
        self.values.push((name, value));
    }

    /// Raw cell value; `None` for both missing columns and NULL.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.lookup(column).and_then(|v| v.as_deref())
    }

    /// Cell value, requiring the column to exist and be non-NULL.
    pub fn get_str(&self, column: &str) -> CosmosResult<&str> {
        match self.lookup(column) {
            Some(Some(v)) => Ok(v.as_str()),
            Some(None) => Err(CosmosError::decode(column, "value is NULL")),
            None => Err(CosmosError::decode(column, "no such column")),
        }
    }

    /// Parse a cell into `T`.
    pub fn try_get<T>(&self, column: &str) -> CosmosResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get_str(column)?;
        raw.parse::<T>()
            .map_err(|e| CosmosError::decode(column, format!("cannot parse '{raw}': {e}")))
    }

    /// Like [`Record::try_get`], but NULL maps to `Ok(None)`.
    pub fn try_get_opt<T>(&self, column: &str) -> CosmosResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.lookup(column) {
            Some(None) => Ok(None),
            _ => self.try_get(column).map(Some),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Option<String>)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Option<String>)>>(iter: I) -> Self {
        let mut record = Record::default();
        for (column, value) in iter {
            record.push(column, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
