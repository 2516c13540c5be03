//! Transaction lifecycle over the `/query` endpoint.
//!
//! Run with: `cargo test --test transaction`

mod common;

use common::RecordingTransport;
use nqorm::{NqClient, NqError, NqResult, QueryRunner, TransactionState};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug)]
enum AppError {
    Domain(String),
    Nq(NqError),
}

impl From<NqError> for AppError {
    fn from(e: NqError) -> Self {
        AppError::Nq(e)
    }
}

fn runner() -> (Arc<RecordingTransport>, QueryRunner<Arc<RecordingTransport>>) {
    let transport = Arc::new(RecordingTransport::new());
    let runner = QueryRunner::new(Arc::clone(&transport));
    (transport, runner)
}

/// Fails any `/query` call whose text equals `sql`.
fn failing_on(sql: &'static str) -> Arc<RecordingTransport> {
    Arc::new(RecordingTransport::with_responder(move |call| {
        if call.query() == Some(sql) {
            Err(NqError::Http {
                status: 500,
                message: format!("{sql} failed"),
            })
        } else {
            Ok(json!({"success": true, "rows": []}))
        }
    }))
}

#[tokio::test]
async fn failing_callback_rolls_back_and_returns_its_error() {
    let (transport, runner) = runner();

    let result: Result<(), AppError> = runner
        .transaction(async || Err(AppError::Domain("insufficient stock".into())))
        .await;

    match result {
        Err(AppError::Domain(msg)) => assert_eq!(msg, "insufficient stock"),
        other => panic!("expected the callback's error, got {other:?}"),
    }
    assert_eq!(transport.count_query("BEGIN TRANSACTION"), 1);
    assert_eq!(transport.count_query("ROLLBACK"), 1);
    assert_eq!(transport.count_query("COMMIT"), 0);
    assert_eq!(runner.state(), TransactionState::RolledBack);
}

#[tokio::test]
async fn successful_callback_commits() {
    let (transport, runner) = runner();

    let moved = runner
        .transaction(async || {
            runner
                .execute(r#"UPDATE "accounts" SET "balance" = "balance" - 100 WHERE "id" = 1"#)
                .await?;
            Ok::<_, NqError>(100)
        })
        .await
        .unwrap();

    assert_eq!(moved, 100);
    assert_eq!(
        transport.queries(),
        vec![
            "BEGIN TRANSACTION".to_string(),
            r#"UPDATE "accounts" SET "balance" = "balance" - 100 WHERE "id" = 1"#.to_string(),
            "COMMIT".to_string(),
        ]
    );
    assert_eq!(runner.state(), TransactionState::Committed);
}

#[tokio::test]
async fn statement_error_inside_callback_triggers_rollback() {
    let transport = failing_on(r#"DELETE FROM "orders""#);
    let runner = QueryRunner::new(Arc::clone(&transport));

    let err = runner
        .transaction(async || {
            runner.execute(r#"DELETE FROM "orders""#).await?;
            Ok::<_, AppError>(())
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Nq(NqError::Http { status: 500, .. })));
    assert_eq!(transport.count_query("ROLLBACK"), 1);
    assert_eq!(transport.count_query("COMMIT"), 0);
}

#[tokio::test]
async fn rollback_failure_does_not_mask_callback_error() {
    let transport = failing_on("ROLLBACK");
    let runner = QueryRunner::new(Arc::clone(&transport));

    let err = runner
        .transaction(async || Err::<(), _>(AppError::Domain("boom".into())))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Domain(ref m) if m == "boom"));
    assert_eq!(transport.count_query("ROLLBACK"), 1);
    assert!(!runner.in_transaction());
}

#[tokio::test]
async fn commit_failure_rolls_back_and_returns_commit_error() {
    let transport = failing_on("COMMIT");
    let runner = QueryRunner::new(Arc::clone(&transport));

    let err = runner
        .transaction(async || Ok::<_, NqError>(()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(
        transport.queries(),
        vec!["BEGIN TRANSACTION", "COMMIT", "ROLLBACK"]
    );
    assert_eq!(runner.state(), TransactionState::RolledBack);
}

#[tokio::test]
async fn begin_while_active_is_rejected_without_a_request() {
    let (transport, runner) = runner();

    runner.begin_transaction().await.unwrap();
    let err = runner.begin_transaction().await.unwrap_err();

    assert!(matches!(err, NqError::TransactionActive));
    assert_eq!(transport.count_query("BEGIN TRANSACTION"), 1);
    assert!(runner.in_transaction());
}

#[tokio::test]
async fn commit_and_rollback_require_a_transaction() {
    let (transport, runner) = runner();

    assert!(matches!(
        runner.commit().await.unwrap_err(),
        NqError::NoActiveTransaction
    ));
    assert!(matches!(
        runner.rollback().await.unwrap_err(),
        NqError::NoActiveTransaction
    ));
    assert!(matches!(
        runner.savepoint("sp1").await.unwrap_err(),
        NqError::NoActiveTransaction
    ));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn failed_begin_leaves_runner_idle() {
    let transport = failing_on("BEGIN TRANSACTION");
    let runner = QueryRunner::new(Arc::clone(&transport));

    let err = runner
        .transaction(async || Ok::<_, NqError>(()))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(runner.state(), TransactionState::Idle);
    assert_eq!(transport.queries(), vec!["BEGIN TRANSACTION"]);
}

#[tokio::test]
async fn runner_can_begin_again_after_finishing() {
    let (transport, runner) = runner();

    runner.begin_transaction().await.unwrap();
    runner.commit().await.unwrap();
    runner.begin_transaction().await.unwrap();
    runner.rollback().await.unwrap();

    assert_eq!(
        transport.queries(),
        vec!["BEGIN TRANSACTION", "COMMIT", "BEGIN TRANSACTION", "ROLLBACK"]
    );
}

#[tokio::test]
async fn savepoints_are_sent_verbatim() {
    let (transport, runner) = runner();

    runner.begin_transaction().await.unwrap();
    runner.savepoint("before_items").await.unwrap();
    runner.rollback_to("before_items").await.unwrap();
    runner.release("before_items").await.unwrap();
    runner.commit().await.unwrap();

    assert_eq!(
        transport.queries(),
        vec![
            "BEGIN TRANSACTION",
            "SAVEPOINT before_items",
            "ROLLBACK TO SAVEPOINT before_items",
            "RELEASE SAVEPOINT before_items",
            "COMMIT",
        ]
    );
}

#[tokio::test]
async fn invalid_savepoint_name_is_rejected() {
    let (transport, runner) = runner();
    runner.begin_transaction().await.unwrap();

    let err = runner.savepoint("sp; DROP TABLE users").await.unwrap_err();

    assert!(matches!(err, NqError::InvalidIdentifier(_)));
    assert_eq!(transport.queries(), vec!["BEGIN TRANSACTION"]);
}

#[tokio::test]
async fn clones_share_transaction_state() {
    let (_transport, runner) = runner();
    let other = runner.clone();

    runner.begin_transaction().await.unwrap();
    assert!(other.in_transaction());
    other.commit().await.unwrap();
    assert_eq!(runner.state(), TransactionState::Committed);
}

async fn archive_with_macro(runner: &QueryRunner<Arc<RecordingTransport>>) -> NqResult<u32> {
    nqorm::transaction!(runner, {
        runner
            .execute(r#"INSERT INTO "archive" ("id") VALUES (1)"#)
            .await?;
        runner.execute(r#"DELETE FROM "live" WHERE "id" = 1"#).await?;
        Ok(2)
    })
}

#[tokio::test]
async fn transaction_macro_commits_on_ok() {
    let (transport, runner) = runner();

    assert_eq!(archive_with_macro(&runner).await.unwrap(), 2);
    assert_eq!(transport.queries().first().map(String::as_str), Some("BEGIN TRANSACTION"));
    assert_eq!(transport.queries().last().map(String::as_str), Some("COMMIT"));
}

#[tokio::test]
async fn transaction_macro_rolls_back_on_err() {
    let transport = failing_on(r#"DELETE FROM "live" WHERE "id" = 1"#);
    let runner = QueryRunner::new(Arc::clone(&transport));

    let err = archive_with_macro(&runner).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(transport.count_query("ROLLBACK"), 1);
    assert_eq!(transport.count_query("COMMIT"), 0);
}

#[tokio::test]
async fn blank_statement_is_rejected_before_sending() {
    let (transport, runner) = runner();

    let err = runner.execute("   ").await.unwrap_err();

    assert!(matches!(err, NqError::EmptyStatement(_)));
    assert!(err.is_usage_error());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn unsuccessful_query_response_is_an_error() {
    let transport = Arc::new(RecordingTransport::with_responder(|_| {
        Ok(json!({"success": false, "error": "table 'ghosts' does not exist"}))
    }));
    let client = NqClient::with_shared(transport);

    let err = client.query(r#"SELECT * FROM "ghosts""#).await.unwrap_err();

    match err {
        NqError::Query(msg) => assert!(msg.contains("ghosts")),
        other => panic!("expected a query error, got {other:?}"),
    }
}

#[tokio::test]
async fn client_transaction_uses_the_shared_runner() {
    let transport = Arc::new(RecordingTransport::new());
    let client = NqClient::with_shared(Arc::clone(&transport));

    client
        .transaction(async || {
            client
                .query(r#"UPDATE "stock" SET "qty" = "qty" - 1 WHERE "id" = 7"#)
                .await?;
            Ok::<_, NqError>(())
        })
        .await
        .unwrap();

    assert_eq!(transport.queries().len(), 3);
    assert_eq!(client.runner().state(), TransactionState::Committed);
}
