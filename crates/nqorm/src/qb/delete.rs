//! DELETE query builder.

use crate::error::{NqError, NqResult};
use crate::ident::{quote_ident, table_name};
use crate::qb::binding::BindingList;
use crate::qb::payload::DeletePayload;
use crate::qb::traits::SqlQb;
use crate::qb::where_builder::{WhereBuilder, impl_where_methods};

/// DELETE query builder.
///
/// A DELETE without filters targets every row of the table.
#[derive(Clone, Debug)]
pub struct DeleteQb {
    table: String,
    filters: WhereBuilder,
    cascade: Option<bool>,
    soft_delete: Option<bool>,
}

impl DeleteQb {
    /// Create a DELETE builder for a table.
    pub fn from(table: &str) -> NqResult<Self> {
        Ok(Self {
            table: table_name(table)?,
            filters: WhereBuilder::new(),
            cascade: None,
            soft_delete: None,
        })
    }

    impl_where_methods!(filters);

    /// Replace the accumulated filters.
    pub(crate) fn with_filters(mut self, filters: WhereBuilder) -> Self {
        self.filters = filters;
        self
    }

    /// Ask the service to delete dependent rows as well.
    pub fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = Some(cascade);
        self
    }

    /// Ask the service to mark rows deleted instead of removing them.
    pub fn soft_delete(mut self, soft: bool) -> Self {
        self.soft_delete = Some(soft);
        self
    }
}

impl SqlQb for DeleteQb {
    type Payload = DeletePayload;

    fn table_name(&self) -> &str {
        &self.table
    }

    fn build_error(&self) -> Option<&str> {
        self.filters.build_error()
    }

    fn render(&self, out: &mut BindingList) -> String {
        if self.build_error().is_some() {
            return String::new();
        }
        let mut sql = format!("DELETE FROM {}", quote_ident(&self.table));
        let where_sql = self.filters.build_where_sql(out);
        if !where_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&where_sql);
        }
        sql
    }

    fn to_payload(&self) -> DeletePayload {
        DeletePayload {
            table_name: self.table.clone(),
            filters: self.filters.build_filters(),
            cascade: self.cascade,
            soft_delete: self.soft_delete,
        }
    }

    fn validate(&self) -> NqResult<()> {
        if let Some(err) = self.build_error() {
            return Err(NqError::validation(err));
        }
        Ok(())
    }
}
