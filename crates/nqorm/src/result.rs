//! Result value objects built from service responses.
//!
//! Responses arrive wrapped as `{success, data, error, metadata}`; the helpers
//! here unwrap `data` and read the payload defensively. Missing optional keys
//! default to empty/`None` instead of failing.

use crate::error::{NqError, NqResult};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One result row: column name to JSON value.
pub type Row = Map<String, Value>;

/// Unwrap the `{success, data, error, metadata}` envelope.
///
/// - `data` present and an object: returns `data`
/// - `success: false` with an `error` and no `data`: returns [`NqError::Query`]
/// - anything else is returned unchanged
pub fn unwrap_envelope(value: Value) -> NqResult<Value> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };
    let is_envelope = map.contains_key("data") && map.contains_key("success");
    if is_envelope {
        if let Some(data @ Value::Object(_)) = map.remove("data") {
            return Ok(data);
        }
        if map.get("success") == Some(&Value::Bool(false)) {
            let message = map
                .get("error")
                .and_then(error_message)
                .unwrap_or_else(|| "request failed".to_string());
            return Err(NqError::Query(message));
        }
    }
    Ok(Value::Object(map))
}

/// Text of an `error` field: a string, `{message}`, or an externally tagged `{Kind: message}`.
pub(crate) fn error_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            if let Some(Value::String(msg)) = map.get("message") {
                return Some(msg.clone());
            }
            if map.len() == 1 {
                if let Some((kind, Value::String(msg))) = map.iter().next() {
                    return Some(format!("{kind}: {msg}"));
                }
            }
            Some(value.to_string())
        }
        other => Some(other.to_string()),
    }
}

fn as_rows(value: Option<&Value>) -> Vec<Row> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect(),
        _ => Vec::new(),
    }
}

fn as_strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Result of a raw `/query` call or a `/tables/query` call.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    success: bool,
    rows_affected: Option<u64>,
    rows: Vec<Row>,
    columns: Vec<String>,
    error: Option<String>,
    execution_time_ms: Option<f64>,
    total_count: Option<u64>,
    has_more: Option<bool>,
}

impl QueryResult {
    /// Build from a response body (envelope already removed or not).
    ///
    /// Rows are read from `rows`, falling back to `records`. `success` defaults
    /// to "no error reported".
    pub fn from_value(value: Value) -> NqResult<Self> {
        let value = unwrap_envelope(value)?;
        let Value::Object(map) = value else {
            return Err(NqError::decode(format!(
                "expected an object for query result, got {value}"
            )));
        };

        let error = map.get("error").and_then(error_message);
        let rows = match map.get("rows") {
            Some(Value::Array(_)) => as_rows(map.get("rows")),
            _ => as_rows(map.get("records")),
        };
        let success = map
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(error.is_none());
        let execution_time_ms = map
            .get("execution_time_ms")
            .and_then(Value::as_f64)
            .or_else(|| {
                map.get("query_stats")
                    .and_then(|s| s.get("execution_time_ms"))
                    .and_then(Value::as_f64)
            });

        Ok(Self {
            success,
            rows_affected: map.get("rows_affected").and_then(Value::as_u64),
            rows,
            columns: as_strings(map.get("columns")),
            error,
            execution_time_ms,
            total_count: map.get("total_count").and_then(Value::as_u64),
            has_more: map.get("has_more").and_then(Value::as_bool),
        })
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn rows_affected(&self) -> Option<u64> {
        self.rows_affected
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn execution_time_ms(&self) -> Option<f64> {
        self.execution_time_ms
    }

    /// Total matching rows reported by `/tables/query`.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn has_more(&self) -> Option<bool> {
        self.has_more
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// One column's values in row order (`Null` where a row lacks the column).
    pub fn pluck(&self, column: &str) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Turn a reported failure into [`NqError::Query`].
    pub fn into_checked(self) -> NqResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(NqError::Query(
                self.error.unwrap_or_else(|| "query reported failure".to_string()),
            ))
        }
    }
}

fn from_payload<T: for<'de> Deserialize<'de>>(value: Value, what: &str) -> NqResult<T> {
    let value = unwrap_envelope(value)?;
    serde_json::from_value(value).map_err(|e| NqError::decode(format!("{what}: {e}")))
}

/// Ids may come back as strings or numbers.
fn lenient_ids<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(as_strings(value.as_ref()))
}

fn lenient_strings<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(match value {
        Some(Value::String(s)) => vec![s],
        other => as_strings(other.as_ref()),
    })
}

/// Result of `/tables/insert`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct InsertResult {
    pub inserted_count: u64,
    pub failed_count: u64,
    #[serde(deserialize_with = "lenient_ids")]
    pub inserted_ids: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub errors: Vec<String>,
}

impl InsertResult {
    pub fn from_value(value: Value) -> NqResult<Self> {
        from_payload(value, "insert result")
    }

    pub fn has_errors(&self) -> bool {
        self.failed_count > 0 || !self.errors.is_empty()
    }
}

/// Result of `/tables/update`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct UpdateResult {
    pub updated_count: u64,
    pub matched_count: u64,
    pub new_version: Option<u64>,
}

impl UpdateResult {
    pub fn from_value(value: Value) -> NqResult<Self> {
        from_payload(value, "update result")
    }
}

/// Result of `/tables/delete`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct DeleteResult {
    pub deleted_count: u64,
    pub cascaded_deletes: BTreeMap<String, u64>,
}

impl DeleteResult {
    pub fn from_value(value: Value) -> NqResult<Self> {
        let mut value = unwrap_envelope(value)?;
        if let Some(map) = value.as_object_mut() {
            if map.get("cascaded_deletes") == Some(&Value::Null) {
                map.remove("cascaded_deletes");
            }
        }
        from_payload(value, "delete result")
    }
}
