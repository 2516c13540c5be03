//! In-memory transport that records calls and replays canned responses.

#![allow(dead_code)]

use nqorm::{NqResult, Transport};
use serde_json::{Value, json};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

impl Call {
    /// The SQL text of a `/query` call.
    pub fn query(&self) -> Option<&str> {
        if self.path != "/query" {
            return None;
        }
        self.body.as_ref()?.get("query")?.as_str()
    }
}

type Responder = dyn Fn(&Call) -> NqResult<Value> + Send + Sync;

pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    responder: Box<Responder>,
}

impl RecordingTransport {
    /// Every call succeeds with an empty result.
    pub fn new() -> Self {
        Self::with_responder(|_| Ok(json!({"success": true, "rows": []})))
    }

    pub fn with_responder(f: impl Fn(&Call) -> NqResult<Value> + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(f),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// SQL texts sent to `/query`, in order.
    pub fn queries(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|c| c.query().map(str::to_string))
            .collect()
    }

    pub fn count_query(&self, sql: &str) -> usize {
        self.queries().iter().filter(|q| q.as_str() == sql).count()
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&Value>) -> NqResult<Value> {
        let call = Call {
            method,
            path: path.to_string(),
            body: body.cloned(),
        };
        let response = (self.responder)(&call);
        self.calls.lock().unwrap().push(call);
        response
    }
}

impl Transport for RecordingTransport {
    fn get(&self, path: &str) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        std::future::ready(self.record("GET", path, None))
    }

    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        std::future::ready(self.record("POST", path, Some(body)))
    }

    fn put(
        &self,
        path: &str,
        body: &Value,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        std::future::ready(self.record("PUT", path, Some(body)))
    }

    fn delete(
        &self,
        path: &str,
        body: Option<&Value>,
    ) -> impl std::future::Future<Output = NqResult<Value>> + Send {
        std::future::ready(self.record("DELETE", path, body))
    }
}

/// A `/tables/query`-style envelope around `records`.
pub fn records_response(records: Value) -> Value {
    json!({
        "success": true,
        "data": {
            "records": records,
            "total_count": records.as_array().map(|a| a.len()).unwrap_or(0),
            "returned_count": records.as_array().map(|a| a.len()).unwrap_or(0),
            "has_more": false,
            "query_stats": {"execution_time_ms": 0.4, "rows_scanned": 1, "indexes_used": []}
        },
        "error": null,
        "metadata": {"response_time_ms": 1.0, "request_id": "test", "message": "ok", "version": "0.1.0", "timestamp": "2024-01-01T00:00:00Z"}
    })
}
