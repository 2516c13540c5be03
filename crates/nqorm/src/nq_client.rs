//! Client facade wiring one transport into the runner and table clients.

use crate::client::Transport;
use crate::error::NqResult;
use crate::result::QueryResult;
use crate::runner::QueryRunner;
use crate::table_query::TableQuery;
use crate::tables::TableResource;
use std::sync::Arc;

/// Entry point: shares one transport between the `/query` runner and the
/// `/tables/*` client. Both are built eagerly at construction.
///
/// # Example
///
/// ```ignore
/// use nqorm::{ClientConfig, NqClient};
///
/// let client = NqClient::connect(ClientConfig::from_env()?)?;
/// let active = client.table("users")?.where_eq("status", "active").count().await?;
/// ```
pub struct NqClient<T> {
    transport: Arc<T>,
    runner: QueryRunner<T>,
    tables: TableResource<T>,
}

impl<T> Clone for NqClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            runner: self.runner.clone(),
            tables: self.tables.clone(),
        }
    }
}

impl<T> std::fmt::Debug for NqClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NqClient")
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> NqClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_shared(Arc::new(transport))
    }

    pub fn with_shared(transport: Arc<T>) -> Self {
        Self {
            runner: QueryRunner::with_shared(Arc::clone(&transport)),
            tables: TableResource::with_shared(Arc::clone(&transport)),
            transport,
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Raw `/query` execution and transactions.
    pub fn runner(&self) -> &QueryRunner<T> {
        &self.runner
    }

    /// `/tables/*` endpoints.
    pub fn tables(&self) -> &TableResource<T> {
        &self.tables
    }

    /// Fluent query over `table`.
    pub fn table(&self, table: &str) -> NqResult<TableQuery<T>> {
        TableQuery::new(table, self.tables.clone(), self.runner.clone())
    }

    /// Execute SQL text.
    pub async fn query(&self, sql: &str) -> NqResult<QueryResult> {
        self.runner.execute(sql).await
    }

    /// See [`QueryRunner::transaction`].
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: AsyncFnOnce() -> Result<R, E>,
        E: From<crate::error::NqError>,
    {
        self.runner.transaction(f).await
    }
}

#[cfg(feature = "http")]
impl NqClient<crate::http::HttpTransport> {
    /// Build an HTTP-backed client.
    pub fn connect(config: crate::http::ClientConfig) -> NqResult<Self> {
        Ok(Self::new(crate::http::HttpTransport::new(config)?))
    }
}
