//! Fluent, endpoint-bound query over one table.
//!
//! [`TableQuery`] accumulates filters, sort, pagination and columns like
//! [`SelectQb`], and its terminal calls send exactly one request each:
//!
//! | terminal | request |
//! |---|---|
//! | `get`, `first`, `exists`, `pluck`, `value` | `POST /tables/query` |
//! | `count` | `POST /query` with `SELECT COUNT(*) ...` |
//! | `update_set` | `PUT /tables/update` |
//! | `delete_rows` | `DELETE /tables/delete` |
//! | `insert` | `POST /tables/insert` |
//!
//! # Example
//!
//! ```ignore
//! let names = client
//!     .table("users")?
//!     .where_eq("status", "active")
//!     .order_by_asc("name")
//!     .pluck("name")
//!     .await?;
//! ```

use crate::client::Transport;
use crate::error::{NqError, NqResult};
use crate::qb::{
    BindingList, DeleteQb, InsertQb, Record, SelectQb, SortDirection, SqlQb, UpdateQb,
    impl_where_methods,
};
use crate::result::{DeleteResult, InsertResult, Row, UpdateResult};
use crate::runner::QueryRunner;
use crate::tables::TableResource;
use crate::value::Scalar;
use serde_json::Value;

/// Fluent query bound to a table-resource client and a runner.
pub struct TableQuery<T> {
    select: SelectQb,
    tables: TableResource<T>,
    runner: QueryRunner<T>,
}

impl<T> Clone for TableQuery<T> {
    fn clone(&self) -> Self {
        Self {
            select: self.select.clone(),
            tables: self.tables.clone(),
            runner: self.runner.clone(),
        }
    }
}

impl<T> std::fmt::Debug for TableQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableQuery")
            .field("select", &self.select)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> TableQuery<T> {
    pub fn new(table: &str, tables: TableResource<T>, runner: QueryRunner<T>) -> NqResult<Self> {
        Ok(Self {
            select: SelectQb::from(table)?,
            tables,
            runner,
        })
    }

    // ==================== Accumulation ====================

    /// Set the columns to fetch.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = self.select.select(columns);
        self
    }

    impl_where_methods!(select.filters);

    pub fn order_by(mut self, column: &str, direction: SortDirection) -> Self {
        self.select = self.select.order_by(column, direction);
        self
    }

    pub fn order_by_asc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Asc)
    }

    pub fn order_by_desc(self, column: &str) -> Self {
        self.order_by(column, SortDirection::Desc)
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.select = self.select.limit(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.select = self.select.offset(n);
        self
    }

    pub fn paginate(mut self, page: u64, per_page: u64) -> Self {
        self.select = self.select.paginate(page, per_page);
        self
    }

    /// The underlying SELECT builder.
    pub fn builder(&self) -> &SelectQb {
        &self.select
    }

    // ==================== Terminals ====================

    /// All matching rows.
    pub async fn get(&self) -> NqResult<Vec<Row>> {
        Ok(self.tables.select(&self.select).await?.into_rows())
    }

    /// The first matching row (sent with `limit = 1`).
    pub async fn first(&self) -> NqResult<Option<Row>> {
        let qb = self.select.clone().limit(1);
        Ok(self.tables.select(&qb).await?.into_rows().into_iter().next())
    }

    /// Whether any row matches (sent with `limit = 1`, `columns = ["1"]`).
    pub async fn exists(&self) -> NqResult<bool> {
        let qb = self.select.clone().select(["1"]).limit(1);
        Ok(!self.tables.select(&qb).await?.is_empty())
    }

    /// Number of matching rows, via `SELECT COUNT(*)` on the `/query` endpoint.
    ///
    /// Sort, limit and offset are ignored.
    pub async fn count(&self) -> NqResult<u64> {
        self.select.validate()?;
        let mut out = BindingList::inline();
        let sql = self.select.render_count(&mut out);
        let result = self.runner.execute_bound(&sql, out.as_slice()).await?;
        match result.first() {
            Some(row) => parse_count(row),
            None => Ok(0),
        }
    }

    /// One column's values, in row order.
    pub async fn pluck(&self, column: &str) -> NqResult<Vec<Value>> {
        let qb = self.select.clone().select([column]);
        Ok(self.tables.select(&qb).await?.pluck(column))
    }

    /// One column of the first row, or `None` when nothing matches.
    pub async fn value(&self, column: &str) -> NqResult<Option<Value>> {
        let qb = self.select.clone().select([column]).limit(1);
        let result = self.tables.select(&qb).await?;
        Ok(result
            .first()
            .map(|row| row.get(column).cloned().unwrap_or(Value::Null)))
    }

    /// Update matching rows.
    pub async fn update_set<I, K, V>(&self, values: I) -> NqResult<UpdateResult>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Scalar>,
    {
        let qb = UpdateQb::table(self.select.table_name())?
            .set_many(values)
            .with_filters(self.select.filters.clone());
        self.tables.update_with(&qb).await
    }

    /// Delete matching rows.
    pub async fn delete_rows(&self) -> NqResult<DeleteResult> {
        let qb = DeleteQb::from(self.select.table_name())?.with_filters(self.select.filters.clone());
        self.tables.delete_with(&qb).await
    }

    /// Insert rows into this table. Filters are not involved.
    pub async fn insert(&self, rows: impl IntoIterator<Item = Record>) -> NqResult<InsertResult> {
        let qb = InsertQb::into_table(self.select.table_name())?.values_many(rows);
        self.tables.insert_with(&qb).await
    }
}

/// Read the count from a `SELECT COUNT(*)` row.
fn parse_count(row: &Row) -> NqResult<u64> {
    let value = ["count", "COUNT(*)", "count(*)"]
        .iter()
        .find_map(|key| row.get(*key))
        .or_else(|| row.values().next())
        .ok_or_else(|| NqError::decode("count result has no columns"))?;

    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| NqError::decode(format!("invalid count value: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| NqError::decode(format!("invalid count value: '{s}'"))),
        other => Err(NqError::decode(format!("invalid count value: {other}"))),
    }
}
