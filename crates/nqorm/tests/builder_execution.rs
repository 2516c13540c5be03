//! Builders executed through both endpoints send the two forms they render.
//!
//! Run with: `cargo test --test builder_execution`

mod common;

use common::{RecordingTransport, records_response};
use nqorm::qb::{self, SqlQb};
use nqorm::{ConflictResolution, NqClient, NqError, Op, Record};
use serde_json::json;
use std::sync::Arc;

fn client() -> (Arc<RecordingTransport>, NqClient<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::with_responder(|call| {
        Ok(match call.path.as_str() {
            "/tables/query" => records_response(json!([])),
            _ => json!({"success": true, "rows": [], "rows_affected": 1}),
        })
    }));
    let client = NqClient::with_shared(Arc::clone(&transport));
    (transport, client)
}

#[tokio::test]
async fn select_sends_sql_to_query_and_payload_to_tables() {
    let (transport, client) = client();
    let q = qb::select("products")
        .unwrap()
        .select(["id", "price"])
        .where_("price", Op::LessThan, 9.5)
        .where_("name", Op::Contains, "%lamp%")
        .order_by_asc("price")
        .limit(20);

    client.runner().run(&q).await.unwrap();
    client.tables().select(&q).await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0].query(),
        Some(
            r#"SELECT "id", "price" FROM "products" WHERE "price" < 9.5 AND "name" LIKE '%lamp%' ORDER BY "price" ASC LIMIT 20"#
        )
    );
    assert_eq!(calls[1].path, "/tables/query");
    assert_eq!(calls[1].body, Some(q.to_array().unwrap()));
}

#[tokio::test]
async fn update_with_arithmetic_in_both_forms() {
    let (transport, client) = client();
    let q = qb::update("inventory")
        .unwrap()
        .decrement("qty", 2)
        .set("updated_by", "job")
        .where_eq("sku", "A-1")
        .optimistic_lock_version(3);

    let result = q.execute(client.runner()).await.unwrap();
    assert_eq!(result.rows_affected(), Some(1));
    client.tables().update_with(&q).await.unwrap();

    let calls = transport.calls();
    assert_eq!(
        calls[0].query(),
        Some(r#"UPDATE "inventory" SET "qty" = "qty" - 2, "updated_by" = 'job' WHERE "sku" = 'A-1'"#)
    );
    assert_eq!(calls[1].method, "PUT");
    assert_eq!(
        calls[1].body,
        Some(json!({
            "table_name": "inventory",
            "updates": {
                "qty": {"operation": "decrement", "value": 2},
                "updated_by": "job"
            },
            "filters": {"sku": {"operator": "Equal", "value": "A-1"}},
            "optimistic_lock_version": 3
        }))
    );
}

#[tokio::test]
async fn insert_options_only_reach_the_payload() {
    let (transport, client) = client();
    let q = qb::insert("events")
        .unwrap()
        .record(Record::new().set("kind", "login").set("user_id", 5))
        .record(Record::new().set("kind", "logout"))
        .on_conflict(ConflictResolution::Ignore)
        .batch_size(100);

    client.runner().run(&q).await.unwrap();
    client.tables().insert_with(&q).await.unwrap();

    let calls = transport.calls();
    assert_eq!(
        calls[0].query(),
        Some(r#"INSERT INTO "events" ("kind", "user_id") VALUES ('login', 5), ('logout', NULL)"#)
    );
    let body = calls[1].body.as_ref().unwrap();
    assert_eq!(body["on_conflict"], "Ignore");
    assert_eq!(body["batch_size"], 100);
}

#[tokio::test]
async fn delete_without_filters_targets_whole_table() {
    let (transport, client) = client();
    let q = qb::delete("tmp").unwrap().soft_delete(true);

    client.runner().run(&q).await.unwrap();
    client.tables().delete_with(&q).await.unwrap();

    let calls = transport.calls();
    assert_eq!(calls[0].query(), Some(r#"DELETE FROM "tmp""#));
    assert_eq!(calls[1].method, "DELETE");
    assert_eq!(
        calls[1].body,
        Some(json!({"table_name": "tmp", "filters": {}, "soft_delete": true}))
    );
}

#[tokio::test]
async fn invalid_builders_never_reach_the_transport() {
    let (transport, client) = client();

    let empty_update = qb::update("users").unwrap().where_eq("id", 1);
    assert!(matches!(
        client.runner().run(&empty_update).await.unwrap_err(),
        NqError::EmptyStatement(_)
    ));
    assert!(matches!(
        client.tables().update_with(&empty_update).await.unwrap_err(),
        NqError::EmptyStatement(_)
    ));

    let empty_insert = qb::insert("users").unwrap();
    assert!(matches!(
        client.runner().run(&empty_insert).await.unwrap_err(),
        NqError::EmptyStatement(_)
    ));

    let zero_batch = qb::insert("users")
        .unwrap()
        .values([("name", "x")])
        .batch_size(0);
    assert!(matches!(
        client.tables().insert_with(&zero_batch).await.unwrap_err(),
        NqError::Validation(_)
    ));

    let bad_increment = qb::update("users").unwrap().increment("visits", "many");
    assert!(matches!(
        client.runner().run(&bad_increment).await.unwrap_err(),
        NqError::Validation(_)
    ));

    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn neural_operators_render_service_tokens() {
    let (transport, client) = client();
    let q = qb::select("memories")
        .unwrap()
        .where_("embedding", Op::NeuralSimilarity, "sunny beach")
        .where_("state", Op::QuantumEntanglement, "pair-7");

    client.runner().run(&q).await.unwrap();

    assert_eq!(
        transport.queries(),
        vec![
            r#"SELECT * FROM "memories" WHERE "embedding" NEUROMATCH 'sunny beach' AND "state" QUANTUM_ENTANGLE 'pair-7'"#
        ]
    );
    let body = q.to_array().unwrap();
    assert_eq!(body["filters"]["embedding"]["operator"], "NeuralSimilar");
    assert_eq!(body["filters"]["state"]["operator"], "QuantumEntangled");
}
