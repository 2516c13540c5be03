//! `HttpTransport` against a mock server.
//!
//! Run with: `cargo test --test http_transport`

#![cfg(feature = "http")]

use nqorm::{ClientConfig, HttpTransport, NqClient, NqError, Transport};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new()
        .base_url(format!("{}/api/v1", server.uri()))
        .api_key("nq_test_key")
}

#[tokio::test]
async fn query_carries_api_key_and_sql_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query"))
        .and(header("x-api-key", "nq_test_key"))
        .and(body_json(json!({"query": r#"SELECT * FROM "users" LIMIT 1"#})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "rows": [{"id": 1}],
            "columns": ["id"],
            "rows_affected": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NqClient::connect(config(&server)).unwrap();
    let result = client
        .query(r#"SELECT * FROM "users" LIMIT 1"#)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.columns(), ["id"]);
}

#[tokio::test]
async fn table_query_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tables/query"))
        .and(body_json(json!({
            "table_name": "users",
            "filters": {"status": {"operator": "Equal", "value": "active"}},
            "limit": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "records": [{"id": 3, "status": "active"}],
                "total_count": 1,
                "returned_count": 1,
                "has_more": false,
                "query_stats": {"execution_time_ms": 1.5, "rows_scanned": 10, "indexes_used": []}
            },
            "error": null,
            "metadata": {"response_time_ms": 2.0, "request_id": "r1", "message": "ok", "version": "0.1.0", "timestamp": "2024-01-01T00:00:00Z"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NqClient::connect(config(&server)).unwrap();
    let row = client
        .table("users")
        .unwrap()
        .where_eq("status", "active")
        .first()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(row["id"], 3);
}

#[tokio::test]
async fn delete_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/tables/delete"))
        .and(body_json(json!({
            "table_name": "sessions",
            "filters": {"user_id": {"operator": "Equal", "value": 9}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"deleted_count": 2, "cascaded_deletes": {"tokens": 5}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NqClient::connect(config(&server)).unwrap();
    let result = client
        .table("sessions")
        .unwrap()
        .where_eq("user_id", 9)
        .delete_rows()
        .await
        .unwrap();

    assert_eq!(result.deleted_count, 2);
    assert_eq!(result.cascaded_deletes.get("tokens"), Some(&5));
}

#[tokio::test]
async fn non_success_status_maps_to_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tables/insert"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "data": null,
            "error": {"BadRequest": "table 'nope' does not exist"}
        })))
        .mount(&server)
        .await;

    let client = NqClient::connect(config(&server)).unwrap();
    let err = client
        .table("nope")
        .unwrap()
        .insert([nqorm::Record::new().set("a", 1)])
        .await
        .unwrap_err();

    match err {
        NqError::Http { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "BadRequest: table 'nope' does not exist");
        }
        other => panic!("expected an HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(config(&server)).unwrap();
    let err = transport.get("/health").await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.to_string().contains("maintenance"));
    assert!(err.is_transport_error());
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let transport = HttpTransport::new(
        ClientConfig::new()
            .base_url("http://127.0.0.1:1/api/v1")
            .connect_timeout(std::time::Duration::from_millis(200)),
    )
    .unwrap();

    let err = transport.post("/query", &json!({"query": "SELECT 1"})).await.unwrap_err();

    assert!(err.is_transport_error());
}

#[test]
fn invalid_base_url_is_rejected() {
    assert!(HttpTransport::new(ClientConfig::new().base_url("not a url")).is_err());
}
