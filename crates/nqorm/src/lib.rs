//! # nqorm
//!
//! A query-building client for the NeuroQuantumDB REST API.
//!
//! ## Features
//!
//! - **Two renderings, one builder**: every statement builder produces a structured
//!   payload for `/tables/*` and SQL text for `/query`, describing the same operation
//! - **Closed operator catalog**: `Op` maps each filter kind to one SQL token,
//!   including the service's `NEUROMATCH` / `QUANTUM_ENTANGLE`
//! - **Fluent table queries**: `get` / `first` / `exists` / `count` / `pluck` / `value`
//! - **Transactions**: `BEGIN` / `COMMIT` / `ROLLBACK` over `/query`, with savepoints;
//!   a failing callback is rolled back and its error returned unchanged
//! - **Pluggable transport**: `HttpTransport` (reqwest) by default, or any `Transport`
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use nqorm::qb::{self, SqlQb};
//! use nqorm::Op;
//!
//! let q = qb::select("users")?
//!     .where_("age", Op::GreaterThan, 18)
//!     .where_in("role", ["admin", "owner"])
//!     .limit(10);
//!
//! // SQL text for /query
//! assert_eq!(
//!     q.to_sql(),
//!     r#"SELECT * FROM "users" WHERE "age" > 18 AND "role" IN ('admin', 'owner') LIMIT 10"#
//! );
//!
//! // Payload for /tables/query
//! let body = q.to_array()?;
//! assert_eq!(body["filters"]["age"]["operator"], "GreaterThan");
//! # Ok::<(), nqorm::NqError>(())
//! ```
//!
//! ## Client
//!
//! ```ignore
//! use nqorm::{ClientConfig, NqClient};
//!
//! let client = NqClient::connect(ClientConfig::from_env()?)?;
//!
//! let first = client.table("users")?.where_eq("id", 1).first().await?;
//!
//! client
//!     .transaction(async || {
//!         client.query(r#"UPDATE "stock" SET "qty" = "qty" - 1 WHERE "id" = 7"#).await?;
//!         Ok::<_, nqorm::NqError>(())
//!     })
//!     .await?;
//! ```

pub mod client;
pub mod condition;
pub mod error;
pub mod ident;
pub mod nq_client;
pub mod qb;
pub mod result;
pub mod runner;
pub mod table_query;
pub mod tables;
pub mod value;

#[cfg(feature = "http")]
pub mod http;

pub mod prelude;

pub use client::Transport;
pub use condition::{Filter, Op};
pub use error::{NqError, NqResult};
pub use nq_client::NqClient;
pub use result::{DeleteResult, InsertResult, QueryResult, Row, UpdateResult};
pub use runner::{QueryRunner, QueryType, TransactionState};
pub use table_query::TableQuery;
pub use tables::TableResource;
pub use value::{FilterValue, Scalar};

// Re-export qb module for easy access
pub use qb::{
    ConflictResolution, DeleteQb, InsertQb, Record, SelectQb, SortDirection, SqlQb, UpdateQb,
    WhereBuilder, delete, insert, select, update,
};

#[cfg(feature = "http")]
pub use http::{ClientConfig, HttpTransport};
