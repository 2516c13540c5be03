//! SELECT query builder.

use crate::error::{NqError, NqResult};
use crate::ident::{quote_column, quote_ident, render_column, table_name};
use crate::qb::binding::BindingList;
use crate::qb::payload::{QueryPayload, SortDirection, SortField};
use crate::qb::traits::SqlQb;
use crate::qb::where_builder::{WhereBuilder, impl_where_methods};

/// SELECT query builder.
#[derive(Clone, Debug)]
pub struct SelectQb {
    pub(crate) table: String,
    /// SELECT columns (default ["*"])
    pub(crate) columns: Vec<String>,
    pub(crate) filters: WhereBuilder,
    pub(crate) sort: Vec<SortField>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

impl SelectQb {
    /// Create a SELECT builder for a table.
    ///
    /// Fails with [`NqError::MissingTable`] when `table` is empty.
    pub fn from(table: &str) -> NqResult<Self> {
        Ok(Self {
            table: table_name(table)?,
            columns: vec!["*".to_string()],
            filters: WhereBuilder::new(),
            sort: Vec::new(),
            limit: None,
            offset: None,
        })
    }

    // ==================== SELECT columns ====================

    /// Set SELECT columns. An empty list selects `*`.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        if self.columns.is_empty() {
            self.columns.push("*".to_string());
        }
        self
    }

    /// Append one SELECT column.
    pub fn add_select(mut self, column: &str) -> Self {
        if self.is_select_all() {
            self.columns[0] = column.to_string();
        } else {
            self.columns.push(column.to_string());
        }
        self
    }

    fn is_select_all(&self) -> bool {
        self.columns.len() == 1 && self.columns[0] == "*"
    }

    // ==================== WHERE conditions ====================

    impl_where_methods!(filters);

    // ==================== ORDER BY ====================

    /// Append an ORDER BY entry.
    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.sort.push(SortField {
            column: column.to_string(),
            direction,
        });
        self
    }

    /// Add ORDER BY column ASC.
    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Asc)
    }

    /// Add ORDER BY column DESC.
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Desc)
    }

    // ==================== Pagination ====================

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// Pagination helper.
    ///
    /// `page` is 1-based (clamped to >= 1).
    /// `per_page` is clamped to >= 1.
    pub fn paginate(mut self, page: u64, per_page: u64) -> Self {
        let p = page.max(1);
        let size = per_page.max(1);
        self.limit = Some(size);
        self.offset = Some((p - 1).saturating_mul(size));
        self
    }

    // ==================== Accessors ====================

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn sort(&self) -> &[SortField] {
        &self.sort
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn get_offset(&self) -> Option<u64> {
        self.offset
    }

    // ==================== Build helpers ====================

    /// `SELECT COUNT(*) FROM "t" [WHERE ...]`. Sort and pagination are ignored.
    pub fn render_count(&self, out: &mut BindingList) -> String {
        if self.build_error().is_some() {
            return String::new();
        }
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_ident(&self.table));
        let where_sql = self.filters.build_where_sql(out);
        if !where_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&where_sql);
        }
        sql
    }

    /// COUNT query text with inline values.
    pub fn to_count_sql(&self) -> String {
        self.render_count(&mut BindingList::inline())
    }
}

impl SqlQb for SelectQb {
    type Payload = QueryPayload;

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
        let cols = self
            .columns
            .iter()
            .map(|c| render_column(c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {cols} FROM {}", quote_ident(&self.table));

        let where_sql = self.filters.build_where_sql(out);
        if !where_sql.is_empty() {
            sql.push(' ');
            sql.push_str(&where_sql);
        }

        if !self.sort.is_empty() {
            let order = self
                .sort
                .iter()
                .map(|s| format!("{} {}", quote_column(&s.column), s.direction.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        sql
    }

    fn to_payload(&self) -> QueryPayload {
        QueryPayload {
            table_name: self.table.clone(),
            columns: (!self.is_select_all()).then(|| self.columns.clone()),
            filters: (!self.filters.is_empty()).then(|| self.filters.build_filters()),
            sort: (!self.sort.is_empty()).then(|| self.sort.clone()),
            limit: self.limit,
            offset: self.offset,
        }
    }

    fn validate(&self) -> NqResult<()> {
        if let Some(err) = self.build_error() {
            return Err(NqError::validation(err));
        }
        Ok(())
    }
}
