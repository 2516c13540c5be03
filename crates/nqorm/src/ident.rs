//! SQL identifier handling.
//!
//! Table and column names are always rendered double-quoted (`"users"`), with
//! embedded `"` escaped as `""`. Only SELECT projection entries that are not
//! plain identifiers (`*`, `1`, `COUNT(*)`) are passed through verbatim.
//!
//! # Example
//! ```ignore
//! use nqorm::ident::{quote_column, quote_ident, render_column};
//!
//! assert_eq!(quote_ident("users"), r#""users""#);
//! assert_eq!(render_column("u.name"), r#""u"."name""#);
//! assert_eq!(render_column("COUNT(*)"), "COUNT(*)");
//! assert_eq!(quote_column("first name"), r#""first name""#);
//! ```

use crate::error::{NqError, NqResult};

/// Validate a table name given to a builder factory.
///
/// Returns [`NqError::MissingTable`] for empty or blank names.
pub fn table_name(name: &str) -> NqResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NqError::MissingTable);
    }
    if trimmed.contains('\0') {
        return Err(NqError::InvalidIdentifier(
            "identifier cannot contain NUL character".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Quote a single identifier.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Whether `s` matches `[A-Za-z_][A-Za-z0-9_$]*`.
pub fn is_plain_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

/// Quote a column reference used in WHERE, SET, INSERT or ORDER BY.
///
/// Dotted plain identifiers (`u.name`) are quoted part by part; any other
/// name is quoted whole, so it can never change the shape of the statement.
pub fn quote_column(col: &str) -> String {
    if col.contains('.') && col.split('.').all(is_plain_ident) {
        col.split('.').map(quote_ident).collect::<Vec<_>>().join(".")
    } else {
        quote_ident(col)
    }
}

/// Render a SELECT projection entry.
///
/// Plain (optionally dotted) identifiers are quoted; expressions such as
/// `*`, `1` or `COUNT(*)` are emitted as-is.
pub fn render_column(col: &str) -> String {
    if !col.is_empty() && col.split('.').all(is_plain_ident) {
        quote_column(col)
    } else {
        col.to_string()
    }
}

/// Validate a savepoint name. Savepoint names are emitted unquoted.
pub fn savepoint_name(name: &str) -> NqResult<&str> {
    if is_plain_ident(name) {
        Ok(name)
    } else {
        Err(NqError::InvalidIdentifier(format!(
            "invalid savepoint name: '{name}'"
        )))
    }
}
