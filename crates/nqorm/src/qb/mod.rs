//! Statement builders.
//!
//! Every builder renders to two forms describing the same operation:
//!
//! - a structured payload for the `/tables/*` endpoints (`to_payload()` / `to_array()`)
//! - SQL text for the `/query` endpoint (`to_sql()`, with values in `bindings()`)
//!
//! # Usage
//!
//! ```ignore
//! use nqorm::qb::{self, SqlQb};
//! use nqorm::Op;
//!
//! let q = qb::select("users")?
//!     .select(["id", "name"])
//!     .where_("age", Op::GreaterThanOrEqual, 18)
//!     .order_by_desc("created_at")
//!     .limit(20);
//! assert_eq!(
//!     q.to_sql(),
//!     r#"SELECT "id", "name" FROM "users" WHERE "age" >= 18 ORDER BY "created_at" DESC LIMIT 20"#
//! );
//!
//! let u = qb::update("items")?.increment("qty", 5).where_eq("id", 1);
//! assert_eq!(u.to_sql(), r#"UPDATE "items" SET "qty" = "qty" + 5 WHERE "id" = 1"#);
//! # Ok::<(), nqorm::NqError>(())
//! ```

mod binding;
mod delete;
mod insert;
mod payload;
mod select;
mod traits;
mod update;
mod where_builder;

pub use binding::{BindingList, PlaceholderStyle};
pub use delete::DeleteQb;
pub use insert::InsertQb;
pub use payload::{
    Arithmetic, Assignment, ConflictResolution, DeletePayload, FilterEntry, FilterMap,
    InsertPayload, QueryPayload, Record, SortDirection, SortField, UpdatePayload,
};
pub use select::SelectQb;
pub use traits::SqlQb;
pub use update::UpdateQb;
pub use where_builder::WhereBuilder;

pub(crate) use where_builder::impl_where_methods;

use crate::error::NqResult;

/// Create a SELECT query builder for the given table.
pub fn select(table: &str) -> NqResult<SelectQb> {
    SelectQb::from(table)
}

/// Create an INSERT query builder for the given table.
pub fn insert(table: &str) -> NqResult<InsertQb> {
    InsertQb::into_table(table)
}

/// Create an UPDATE query builder for the given table.
pub fn update(table: &str) -> NqResult<UpdateQb> {
    UpdateQb::table(table)
}

/// Create a DELETE query builder for the given table.
pub fn delete(table: &str) -> NqResult<DeleteQb> {
    DeleteQb::from(table)
}
