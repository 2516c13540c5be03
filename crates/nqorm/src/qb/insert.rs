//! INSERT query builder.

use crate::error::{NqError, NqResult};
use crate::ident::{quote_column, quote_ident, table_name};
use crate::qb::binding::BindingList;
use crate::qb::payload::{ConflictResolution, InsertPayload, Record};
use crate::qb::traits::SqlQb;
use crate::value::Scalar;

/// INSERT query builder.
///
/// Rows may have different column sets; the SQL text uses the union of
/// columns in first-seen order and fills gaps with `NULL`.
#[derive(Clone, Debug)]
pub struct InsertQb {
    table: String,
    rows: Vec<Record>,
    on_conflict: Option<ConflictResolution>,
    batch_size: Option<usize>,
}

impl InsertQb {
    /// Create an INSERT builder for a table.
    pub fn into_table(table: &str) -> NqResult<Self> {
        Ok(Self {
            table: table_name(table)?,
            rows: Vec::new(),
            on_conflict: None,
            batch_size: None,
        })
    }

    /// Add one row from `(column, value)` pairs.
    pub fn values<I, K, V>(mut self, row: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        self.rows.push(row.into_iter().collect());
        self
    }

    /// Add one row.
    pub fn record(mut self, row: Record) -> Self {
        self.rows.push(row);
        self
    }

    /// Add many rows.
    pub fn values_many(mut self, rows: impl IntoIterator<Item = Record>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Conflict handling sent with the structured payload.
    pub fn on_conflict(mut self, resolution: ConflictResolution) -> Self {
        self.on_conflict = Some(resolution);
        self
    }

    /// Server-side batch size sent with the structured payload.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Union of row columns in first-seen order.
    fn column_union(&self) -> Vec<&str> {
        let mut cols: Vec<&str> = Vec::new();
        for row in &self.rows {
            for col in row.columns() {
                if !cols.contains(&col) {
                    cols.push(col);
                }
            }
        }
        cols
    }
}

impl SqlQb for InsertQb {
    type Payload = InsertPayload;

    fn table_name(&self) -> &str {
        &self.table
    }

    fn build_error(&self) -> Option<&str> {
        self.rows
            .iter()
            .any(Record::is_empty)
            .then_some("INSERT record has no values")
    }

    fn render(&self, out: &mut BindingList) -> String {
        let cols = self.column_union();
        if cols.is_empty() || self.build_error().is_some() {
            return String::new();
        }

        let col_list = cols
            .iter()
            .map(|c| quote_column(c))
            .collect::<Vec<_>>()
            .join(", ");

        let null = Scalar::Null;
        let tuples = self
            .rows
            .iter()
            .map(|row| {
                let items = cols
                    .iter()
                    .map(|c| out.bind(row.get(c).unwrap_or(&null)))
                    .collect::<Vec<_>>();
                format!("({})", items.join(", "))
            })
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "INSERT INTO {} ({col_list}) VALUES {tuples}",
            quote_ident(&self.table)
        )
    }

    fn to_payload(&self) -> InsertPayload {
        InsertPayload {
            table_name: self.table.clone(),
            records: self.rows.clone(),
            on_conflict: self.on_conflict,
            batch_size: self.batch_size,
        }
    }

    fn validate(&self) -> NqResult<()> {
        if self.rows.is_empty() || self.rows.iter().all(Record::is_empty) {
            return Err(NqError::EmptyStatement("INSERT without values"));
        }
        if let Some(i) = self.rows.iter().position(Record::is_empty) {
            return Err(NqError::validation(format!("record {i} has no values")));
        }
        if self.batch_size == Some(0) {
            return Err(NqError::validation("batch_size must be at least 1"));
        }
        Ok(())
    }
}
