//! UPDATE query builder.

use crate::error::{NqError, NqResult};
use crate::ident::{quote_column, quote_ident, table_name};
use crate::qb::binding::BindingList;
use crate::qb::payload::{Arithmetic, Assignment, UpdatePayload};
use crate::qb::traits::SqlQb;
use crate::qb::where_builder::{WhereBuilder, impl_where_methods};
use crate::value::Scalar;

/// UPDATE query builder.
///
/// Setting the same column twice replaces the earlier assignment in place,
/// in both the payload and the SQL text.
#[derive(Clone, Debug)]
pub struct UpdateQb {
    table: String,
    /// SET clauses, in first-assigned order
    set_fields: Vec<(String, Assignment)>,
    filters: WhereBuilder,
    optimistic_lock_version: Option<u64>,
    build_error: Option<String>,
}

impl UpdateQb {
    /// Create an UPDATE builder for a table.
    pub fn table(table: &str) -> NqResult<Self> {
        Ok(Self {
            table: table_name(table)?,
            set_fields: Vec::new(),
            filters: WhereBuilder::new(),
            optimistic_lock_version: None,
            build_error: None,
        })
    }

    fn assign(&mut self, column: &str, assignment: Assignment) {
        if column.trim().is_empty() {
            self.record_error("SET column name is empty".to_string());
            return;
        }
        match self.set_fields.iter_mut().find(|(c, _)| c == column) {
            Some(slot) => slot.1 = assignment,
            None => self.set_fields.push((column.to_string(), assignment)),
        }
    }

    fn record_error(&mut self, message: String) {
        if self.build_error.is_none() {
            self.build_error = Some(message);
        }
    }

    /// Set a column value.
    pub fn set(mut self, column: &str, value: impl Into<Scalar>) -> Self {
        self.assign(column, Assignment::Value(value.into()));
        self
    }

    /// Set several column values.
    pub fn set_many<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        for (column, value) in values {
            self.assign(column.as_ref(), Assignment::Value(value.into()));
        }
        self
    }

    fn arithmetic(mut self, column: &str, operation: Arithmetic, amount: Scalar) -> Self {
        if !amount.is_numeric() {
            self.record_error(format!(
                "{} amount for '{column}' must be numeric, got {amount}",
                match operation {
                    Arithmetic::Increment => "increment",
                    Arithmetic::Decrement => "decrement",
                }
            ));
            return self;
        }
        self.assign(
            column,
            Assignment::Arithmetic {
                operation,
                value: amount,
            },
        );
        self
    }

    /// `column = column + amount`
    pub fn increment(self, column: &str, amount: impl Into<Scalar>) -> Self {
        self.arithmetic(column, Arithmetic::Increment, amount.into())
    }

    /// `column = column - amount`
    pub fn decrement(self, column: &str, amount: impl Into<Scalar>) -> Self {
        self.arithmetic(column, Arithmetic::Decrement, amount.into())
    }

    /// `column = column + 1`
    pub fn increment_one(self, column: &str) -> Self {
        self.increment(column, 1)
    }

    /// `column = column - 1`
    pub fn decrement_one(self, column: &str) -> Self {
        self.decrement(column, 1)
    }

    /// Expected row version, checked by the service before applying the update.
    pub fn optimistic_lock_version(mut self, version: u64) -> Self {
        self.optimistic_lock_version = Some(version);
        self
    }

    // ==================== WHERE conditions ====================

    impl_where_methods!(filters);

    /// Replace the accumulated filters.
    pub(crate) fn with_filters(mut self, filters: WhereBuilder) -> Self {
        self.filters = filters;
        self
    }

    /// Check if any SET clauses have been added.
    pub fn has_set_fields(&self) -> bool {
        !self.set_fields.is_empty()
    }
}

impl SqlQb for UpdateQb {
    type Payload = UpdatePayload;

    fn table_name(&self) -> &str {
        &self.table
    }

    fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref().or(self.filters.build_error())
    }

    fn render(&self, out: &mut BindingList) -> String {
        if self.set_fields.is_empty() || SqlQb::build_error(self).is_some() {
            return String::new();
        }

        let sets = self
            .set_fields
            .iter()
            .map(|(column, assignment)| {
                let col = quote_column(column);
                match assignment {
                    Assignment::Value(v) => format!("{col} = {}", out.bind(v)),
                    Assignment::Arithmetic { operation, value } => format!(
                        "{col} = {col} {} {}",
                        operation.sql_operator(),
                        out.bind(value)
                    ),
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!("UPDATE {} SET {sets}", quote_ident(&self.table));
        let where_sql = self.filters.build_where_sql(out);
        if !where_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&where_sql);
        }
        sql
    }

    fn to_payload(&self) -> UpdatePayload {
        UpdatePayload {
            table_name: self.table.clone(),
            updates: self.set_fields.iter().cloned().collect(),
            filters: self.filters.build_filters(),
            optimistic_lock_version: self.optimistic_lock_version,
        }
    }

    fn validate(&self) -> NqResult<()> {
        if let Some(err) = SqlQb::build_error(self) {
            return Err(NqError::validation(err));
        }
        if self.set_fields.is_empty() {
            return Err(NqError::EmptyStatement("UPDATE without SET"));
        }
        Ok(())
    }
}
