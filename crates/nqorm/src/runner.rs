//! Raw SQL execution through `/query`, plus transactions and savepoints.
//!
//! Transactions are plain statements sent to the service (`BEGIN TRANSACTION`,
//! `COMMIT`, `ROLLBACK`). The runner tracks a small state machine so misuse
//! (COMMIT without BEGIN, nested BEGIN) is rejected before anything is sent:
//!
//! ```text
//! Idle -> InTransaction -> Committed | RolledBack
//! ```
//!
//! A finished transaction can be followed by a new `BEGIN`. Nesting is not
//! supported; use savepoints inside a transaction instead.
//!
//! # Example
//!
//! ```ignore
//! use nqorm::{NqResult, QueryRunner};
//!
//! # async fn demo(runner: QueryRunner<impl nqorm::Transport>) -> NqResult<()> {
//! let moved = runner
//!     .transaction(async || {
//!         runner.execute(r#"UPDATE "accounts" SET "balance" = "balance" - 100 WHERE "id" = 1"#).await?;
//!         runner.execute(r#"UPDATE "accounts" SET "balance" = "balance" + 100 WHERE "id" = 2"#).await?;
//!         Ok::<_, nqorm::NqError>(100)
//!     })
//!     .await?;
//! # Ok(()) }
//! ```

use crate::client::Transport;
use crate::error::{NqError, NqResult};
use crate::ident::savepoint_name;
use crate::qb::SqlQb;
use crate::result::QueryResult;
use crate::value::Scalar;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Path of the raw execution endpoint.
pub const QUERY_PATH: &str = "/query";

/// Logged SQL is cut to this many bytes.
const MAX_LOGGED_SQL: usize = 200;

const IDLE: u8 = 0;
const IN_TRANSACTION: u8 = 1;
const COMMITTED: u8 = 2;
const ROLLED_BACK: u8 = 3;

/// Transaction state of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    InTransaction,
    Committed,
    RolledBack,
}

impl TransactionState {
    fn from_u8(v: u8) -> Self {
        match v {
            IN_TRANSACTION => TransactionState::InTransaction,
            COMMITTED => TransactionState::Committed,
            ROLLED_BACK => TransactionState::RolledBack,
            _ => TransactionState::Idle,
        }
    }
}

/// The kind of statement being executed (for logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Transaction,
    Other,
}

impl QueryType {
    /// Detect the statement kind from its leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let first = sql
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or("")
            .to_ascii_uppercase();
        match first.as_str() {
            "SELECT" | "WITH" => QueryType::Select,
            "INSERT" => QueryType::Insert,
            "UPDATE" => QueryType::Update,
            "DELETE" => QueryType::Delete,
            "BEGIN" | "COMMIT" | "ROLLBACK" | "SAVEPOINT" | "RELEASE" => QueryType::Transaction,
            _ => QueryType::Other,
        }
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn truncate_sql(sql: &str) -> String {
    if sql.len() > MAX_LOGGED_SQL {
        format!("{}...", truncate_sql_bytes(sql, MAX_LOGGED_SQL))
    } else {
        sql.to_string()
    }
}

/// Executes SQL text through `/query` and manages transactions.
///
/// Clones share the transport and the transaction state.
pub struct QueryRunner<T> {
    transport: Arc<T>,
    state: Arc<AtomicU8>,
}

impl<T> Clone for QueryRunner<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> std::fmt::Debug for QueryRunner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRunner")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<T> QueryRunner<T> {
    pub fn state(&self) -> TransactionState {
        TransactionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn in_transaction(&self) -> bool {
        self.state() == TransactionState::InTransaction
    }

    fn require_transaction(&self) -> NqResult<()> {
        if self.in_transaction() {
            Ok(())
        } else {
            Err(NqError::NoActiveTransaction)
        }
    }
}

impl<T: Transport> QueryRunner<T> {
    pub fn new(transport: T) -> Self {
        Self::with_shared(Arc::new(transport))
    }

    /// Create a runner over a transport shared with other clients.
    pub fn with_shared(transport: Arc<T>) -> Self {
        Self {
            transport,
            state: Arc::new(AtomicU8::new(IDLE)),
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    // ==================== Execution ====================

    /// Execute SQL text.
    ///
    /// Fails with [`NqError::EmptyStatement`] for blank text (nothing is sent) and
    /// with [`NqError::Query`] when the service reports `success: false`.
    pub async fn execute(&self, sql: &str) -> NqResult<QueryResult> {
        self.execute_bound(sql, &[]).await
    }

    /// Execute SQL text rendered from a builder; `bindings` are only logged.
    pub async fn execute_bound(&self, sql: &str, bindings: &[Scalar]) -> NqResult<QueryResult> {
        if sql.trim().is_empty() {
            return Err(NqError::EmptyStatement("empty query text"));
        }

        debug!(
            target: "nqorm.sql",
            query_type = ?QueryType::from_sql(sql),
            param_count = bindings.len(),
            sql = %truncate_sql(sql),
            "executing",
        );

        let start = Instant::now();
        let body = serde_json::json!({ "query": sql });
        let response = self.transport.post(QUERY_PATH, &body).await;
        let elapsed = start.elapsed();

        let result = response
            .and_then(QueryResult::from_value)
            .and_then(QueryResult::into_checked);
        match &result {
            Ok(r) => debug!(
                target: "nqorm.sql",
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                rows = r.len(),
                rows_affected = ?r.rows_affected(),
                "completed",
            ),
            Err(e) => warn!(
                target: "nqorm.sql",
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                error = %e,
                sql = %truncate_sql(sql),
                "failed",
            ),
        }
        result
    }

    /// Validate and execute a builder's SQL form.
    pub async fn run<Q: SqlQb>(&self, qb: &Q) -> NqResult<QueryResult> {
        qb.execute(self).await
    }

    // ==================== Transactions ====================

    /// Send `BEGIN TRANSACTION`.
    ///
    /// Fails with [`NqError::TransactionActive`] if a transaction is already open.
    pub async fn begin_transaction(&self) -> NqResult<()> {
        let previous = self.state.load(Ordering::Acquire);
        if previous == IN_TRANSACTION
            || self
                .state
                .compare_exchange(previous, IN_TRANSACTION, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return Err(NqError::TransactionActive);
        }

        info!(target: "nqorm.tx", "BEGIN");
        if let Err(e) = self.execute("BEGIN TRANSACTION").await {
            self.state.store(previous, Ordering::Release);
            return Err(e);
        }
        Ok(())
    }

    /// Send `COMMIT`. On failure the transaction stays open so it can be rolled back.
    pub async fn commit(&self) -> NqResult<()> {
        self.require_transaction()?;
        info!(target: "nqorm.tx", "COMMIT");
        self.execute("COMMIT").await?;
        self.state.store(COMMITTED, Ordering::Release);
        Ok(())
    }

    /// Send `ROLLBACK`.
    ///
    /// The runner leaves the transaction even if the statement fails.
    pub async fn rollback(&self) -> NqResult<()> {
        self.require_transaction()?;
        info!(target: "nqorm.tx", "ROLLBACK");
        let result = self.execute("ROLLBACK").await;
        self.state.store(ROLLED_BACK, Ordering::Release);
        result.map(|_| ())
    }

    /// `SAVEPOINT name` inside the open transaction.
    pub async fn savepoint(&self, name: &str) -> NqResult<()> {
        self.require_transaction()?;
        let name = savepoint_name(name)?;
        debug!(target: "nqorm.tx", savepoint = name, "SAVEPOINT");
        self.execute(&format!("SAVEPOINT {name}")).await.map(|_| ())
    }

    /// `ROLLBACK TO SAVEPOINT name`. The transaction stays open.
    pub async fn rollback_to(&self, name: &str) -> NqResult<()> {
        self.require_transaction()?;
        let name = savepoint_name(name)?;
        debug!(target: "nqorm.tx", savepoint = name, "ROLLBACK TO SAVEPOINT");
        self.execute(&format!("ROLLBACK TO SAVEPOINT {name}"))
            .await
            .map(|_| ())
    }

    /// `RELEASE SAVEPOINT name`.
    pub async fn release(&self, name: &str) -> NqResult<()> {
        self.require_transaction()?;
        let name = savepoint_name(name)?;
        debug!(target: "nqorm.tx", savepoint = name, "RELEASE SAVEPOINT");
        self.execute(&format!("RELEASE SAVEPOINT {name}"))
            .await
            .map(|_| ())
    }

    /// Run `f` inside `BEGIN TRANSACTION` / `COMMIT`.
    ///
    /// If `f` fails, `ROLLBACK` is sent and `f`'s error is returned unchanged,
    /// even when the rollback itself fails (that failure is logged). If `COMMIT`
    /// fails, a rollback is attempted and the commit error is returned.
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: AsyncFnOnce() -> Result<R, E>,
        E: From<NqError>,
    {
        self.begin_transaction().await?;
        let result = f().await;
        self.finish(result).await
    }

    /// Commit on `Ok`, roll back on `Err`. Used by [`transaction`](Self::transaction)
    /// and the [`transaction!`](crate::transaction) macro.
    #[doc(hidden)]
    pub async fn finish<R, E>(&self, result: Result<R, E>) -> Result<R, E>
    where
        E: From<NqError>,
    {
        match result {
            Ok(value) => {
                if let Err(commit_err) = self.commit().await {
                    warn!(target: "nqorm.tx", error = %commit_err, "commit failed, rolling back");
                    if let Err(rollback_err) = self.rollback().await {
                        warn!(target: "nqorm.tx", error = %rollback_err, "rollback after failed commit failed");
                    }
                    return Err(commit_err.into());
                }
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(target: "nqorm.tx", error = %rollback_err, "rollback failed");
                }
                Err(error)
            }
        }
    }

    /// Await `body` and finish the open transaction with its result.
    #[doc(hidden)]
    pub async fn __run_nq<R, F>(&self, body: F) -> NqResult<R>
    where
        F: std::future::Future<Output = NqResult<R>>,
    {
        let result = body.await;
        self.finish(result).await
    }
}

/// Runs the given block inside a transaction on a [`QueryRunner`].
///
/// - Sends `BEGIN TRANSACTION` (errors propagate with `?`).
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)` and yields the block's error unchanged.
///
/// The block must evaluate to `nqorm::NqResult<T>`.
///
/// # Example
///
/// ```ignore
/// let n = nqorm::transaction!(runner, {
///     runner.execute("DELETE FROM \"sessions\"").await?;
///     Ok(1)
/// })?;
/// ```
#[macro_export]
macro_rules! transaction {
    ($runner:expr, $body:block) => {{
        let __nqorm_runner = &$runner;
        __nqorm_runner.begin_transaction().await?;
        __nqorm_runner.__run_nq(async { $body }).await
    }};
}
