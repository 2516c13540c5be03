//! Transport trait: the four HTTP verbs the query layer needs.

use crate::error::NqResult;
use serde_json::Value;
use std::sync::Arc;

/// A JSON-over-HTTP connection to the service.
///
/// Paths are relative to the API base (`/query`, `/tables/insert`, ...).
/// Implementations return the decoded response body, or an error for
/// transport failures and non-success statuses. Retries, timeouts and
/// pooling are the implementation's concern.
pub trait Transport: Send + Sync {
    /// `GET path`
    fn get(&self, path: &str) -> impl std::future::Future<Output = NqResult<Value>> + Send;

    /// `POST path` with a JSON body.
    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send;

    /// `PUT path` with a JSON body.
    fn put(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send;

    /// `DELETE path`, optionally with a JSON body.
    fn delete(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn get(&self, path: &str) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        (**self).get(path)
    }

    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        (**self).post(path, body)
    }

    fn put(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        (**self).put(path, body)
    }

    fn delete(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        (**self).delete(path, body)
    }
}
