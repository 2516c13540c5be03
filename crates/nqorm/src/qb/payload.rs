//! Structured request bodies for the `/tables/*` endpoints.
//!
//! Field names and enum spellings follow the service's REST schema. Optional
//! fields are omitted from the JSON when unset rather than sent as `null`.

use crate::condition::Op;
use crate::error::NqError;
use crate::value::{FilterValue, Scalar};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

/// One entry of the `filters` map: `{ "operator": "Equal", "value": 1 }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterEntry {
    pub operator: Op,
    pub value: FilterValue,
}

/// Column name to filter. A column filtered twice keeps only the later filter.
pub type FilterMap = BTreeMap<String, FilterEntry>;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = NqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(NqError::Other(format!("invalid sort direction: '{other}'"))),
        }
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub column: String,
    pub direction: SortDirection,
}

/// Body of `POST /tables/query`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPayload {
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<SortField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// Conflict handling for inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictResolution {
    Ignore,
    Replace,
    Update,
    Abort,
}

/// One row to insert. Keeps column insertion order; setting a column twice keeps the later value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value (builder style).
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Scalar>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.fields.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| c.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Scalar);
    type IntoIter = std::vec::IntoIter<(String, Scalar)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Body of `POST /tables/insert`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertPayload {
    pub table_name: String,
    pub records: Vec<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_conflict: Option<ConflictResolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

/// Arithmetic update kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arithmetic {
    Increment,
    Decrement,
}

impl Arithmetic {
    pub fn sql_operator(self) -> &'static str {
        match self {
            Arithmetic::Increment => "+",
            Arithmetic::Decrement => "-",
        }
    }
}

/// Right-hand side of an UPDATE assignment.
///
/// `Value` serializes as the bare scalar; `Arithmetic` as
/// `{ "operation": "increment", "value": 5 }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Assignment {
    Value(Scalar),
    Arithmetic { operation: Arithmetic, value: Scalar },
}

/// Body of `PUT /tables/update`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdatePayload {
    pub table_name: String,
    pub updates: BTreeMap<String, Assignment>,
    pub filters: FilterMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimistic_lock_version: Option<u64>,
}

/// Body of `DELETE /tables/delete`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletePayload {
    pub table_name: String,
    pub filters: FilterMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_delete: Option<bool>,
}
