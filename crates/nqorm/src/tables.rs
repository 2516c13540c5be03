//! REST client for the `/tables/*` endpoints.
//!
//! Each call takes either a finished payload or a builder. Builders are
//! validated before anything is sent.

use crate::client::Transport;
use crate::error::NqResult;
use crate::qb::{
    DeleteQb, DeletePayload, InsertPayload, InsertQb, QueryPayload, SelectQb, SqlQb, UpdatePayload,
    UpdateQb,
};
use crate::result::{DeleteResult, InsertResult, QueryResult, UpdateResult};
use std::sync::Arc;
use tracing::debug;

pub const TABLES_QUERY_PATH: &str = "/tables/query";
pub const TABLES_INSERT_PATH: &str = "/tables/insert";
pub const TABLES_UPDATE_PATH: &str = "/tables/update";
pub const TABLES_DELETE_PATH: &str = "/tables/delete";

/// Table-resource client.
pub struct TableResource<T> {
    transport: Arc<T>,
}

impl<T> Clone for TableResource<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> std::fmt::Debug for TableResource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableResource").finish_non_exhaustive()
    }
}

impl<T: Transport> TableResource<T> {
    pub fn new(transport: T) -> Self {
        Self::with_shared(Arc::new(transport))
    }

    pub fn with_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    // ==================== Payload calls ====================

    /// `POST /tables/query`
    pub async fn query(&self, payload: &QueryPayload) -> NqResult<QueryResult> {
        debug!(target: "nqorm.sql", table = %payload.table_name, limit = ?payload.limit, "tables/query");
        let body = serde_json::to_value(payload)?;
        let response = self.transport.post(TABLES_QUERY_PATH, &body).await?;
        QueryResult::from_value(response)?.into_checked()
    }

    /// `POST /tables/insert`
    pub async fn insert(&self, payload: &InsertPayload) -> NqResult<InsertResult> {
        debug!(target: "nqorm.sql", table = %payload.table_name, records = payload.records.len(), "tables/insert");
        let body = serde_json::to_value(payload)?;
        let response = self.transport.post(TABLES_INSERT_PATH, &body).await?;
        InsertResult::from_value(response)
    }

    /// `PUT /tables/update`
    pub async fn update(&self, payload: &UpdatePayload) -> NqResult<UpdateResult> {
        debug!(target: "nqorm.sql", table = %payload.table_name, columns = payload.updates.len(), "tables/update");
        let body = serde_json::to_value(payload)?;
        let response = self.transport.put(TABLES_UPDATE_PATH, &body).await?;
        UpdateResult::from_value(response)
    }

    /// `DELETE /tables/delete`
    pub async fn delete(&self, payload: &DeletePayload) -> NqResult<DeleteResult> {
        debug!(target: "nqorm.sql", table = %payload.table_name, filters = payload.filters.len(), "tables/delete");
        let body = serde_json::to_value(payload)?;
        let response = self.transport.delete(TABLES_DELETE_PATH, Some(&body)).await?;
        DeleteResult::from_value(response)
    }

    // ==================== Builder calls ====================

    pub async fn select(&self, qb: &SelectQb) -> NqResult<QueryResult> {
        qb.validate()?;
        self.query(&qb.to_payload()).await
    }

    pub async fn insert_with(&self, qb: &InsertQb) -> NqResult<InsertResult> {
        qb.validate()?;
        self.insert(&qb.to_payload()).await
    }

    pub async fn update_with(&self, qb: &UpdateQb) -> NqResult<UpdateResult> {
        qb.validate()?;
        self.update(&qb.to_payload()).await
    }

    pub async fn delete_with(&self, qb: &DeleteQb) -> NqResult<DeleteResult> {
        qb.validate()?;
        self.delete(&qb.to_payload()).await
    }
}
