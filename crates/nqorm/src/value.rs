//! Typed values carried by filters, assignments and insert records.
//!
//! [`Scalar`] is a single SQL value. [`FilterValue`] is the shape a filter
//! carries: nothing (`IS NULL`), one scalar, or a list (`IN`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single SQL value.
///
/// Serializes to the matching JSON scalar (`null`, `true`, `42`, `1.5`, `"text"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Render as an inline SQL literal.
    ///
    /// Strings are single-quoted with `'` doubled. Non-finite floats render as `NULL`.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Scalar::Null => "NULL".to_string(),
            Scalar::Bool(true) => "TRUE".to_string(),
            Scalar::Bool(false) => "FALSE".to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) if f.is_finite() => f.to_string(),
            Scalar::Float(_) => "NULL".to_string(),
            Scalar::Text(s) => quote_literal(s),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(b) => serde_json::Value::Bool(*b),
            Scalar::Int(i) => serde_json::Value::from(*i),
            Scalar::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Scalar::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}

fn quote_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

macro_rules! scalar_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(v: $t) -> Self {
                    Scalar::Int(i64::from(v))
                }
            }
        )*
    };
}

scalar_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Scalar {
    fn from(v: f32) -> Self {
        Scalar::Float(f64::from(v))
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<&String> for Scalar {
    fn from(v: &String) -> Self {
        Scalar::Text(v.clone())
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

/// JSON arrays and objects have no scalar form and are carried as their JSON text.
impl From<serde_json::Value> for Scalar {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Scalar::Null,
            serde_json::Value::Bool(b) => Scalar::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => n.as_f64().map_or(Scalar::Null, Scalar::Float),
            },
            serde_json::Value::String(s) => Scalar::Text(s),
            other => Scalar::Text(other.to_string()),
        }
    }
}

/// The value side of a filter.
///
/// `None` is used only by `IS NULL` / `IS NOT NULL`, `List` only by `IN` / `NOT IN`.
/// Serializes as `null`, the scalar, or a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    None,
    Single(Scalar),
    List(Vec<Scalar>),
}

impl FilterValue {
    /// Build a list value.
    pub fn list<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FilterValue::None)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, FilterValue::List(_))
    }
}

macro_rules! filter_value_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FilterValue {
                fn from(v: $t) -> Self {
                    FilterValue::Single(Scalar::from(v))
                }
            }
        )*
    };
}

filter_value_from_scalar!(
    i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, &str, String, &String, Scalar
);

impl<T: Into<Scalar>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        FilterValue::Single(Scalar::from(v))
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        FilterValue::list(v)
    }
}
