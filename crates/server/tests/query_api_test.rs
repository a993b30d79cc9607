//! # Query API Tests
//!
//! End-to-end tests of `/query` and `/embeddings/backfill` against a real
//! server, a temporary Turso database, and mocked HTTP collaborators.

mod common;

use anyhow::Result;
use common::{chat_completion, constant_embedding, TestApp, CHAT_PATH, EMBEDDINGS_PATH};
use httpmock::Method::POST;
use serde_json::{json, Value};
use vecsql::providers::db::storage::Storage;
use vecsql::types::BoundStatement;

#[tokio::test]
async fn test_health_and_root() -> Result<()> {
    let app = TestApp::spawn().await?;

    let health = app.client.get(app.url("/health")).send().await?;
    assert!(health.status().is_success());
    assert_eq!(health.text().await?, "OK");

    let root = app.client.get(app.url("/")).send().await?;
    assert!(root.text().await?.contains("vecsql"));
    Ok(())
}

#[tokio::test]
async fn test_structured_query_returns_rows() -> Result<()> {
    let app = TestApp::spawn().await?;
    let chat_mock = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST).path(CHAT_PATH);
            then.status(200).json_body(chat_completion(
                "```sql\nSELECT name FROM employees ORDER BY name\n```",
            ));
        })
        .await;

    let response = app
        .client
        .post(app.url("/query"))
        .json(&json!({ "query": "list all employees" }))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    let result = &body["result"];
    assert_eq!(result["status"], "ok");
    assert_eq!(
        result["generated_query"],
        "SELECT name FROM employees ORDER BY name"
    );
    assert_eq!(result["columns"], json!(["name"]));
    assert_eq!(result["rows"], json!([["Alice"], ["Bob"], ["Carol"]]));
    assert!(body.get("debug").is_none());
    chat_mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_destructive_query_is_rejected_and_not_executed() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST).path(CHAT_PATH);
            then.status(200)
                .json_body(chat_completion("DROP TABLE products;"));
        })
        .await;

    let response = app
        .client
        .post(app.url("/query"))
        .json(&json!({ "query": "DROP TABLE products" }))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["status"], "rejected");
    assert_eq!(body["result"]["error"]["stage"], "validation");
    assert_eq!(body["result"]["generated_query"], "DROP TABLE products;");

    // The table is still there.
    let rows = app
        .app_state
        .sqlite_provider
        .execute(&BoundStatement::verbatim("SELECT COUNT(*) FROM products"))
        .await?;
    assert_eq!(rows.rows[0][0].to_string(), "6");
    Ok(())
}

#[tokio::test]
async fn test_empty_result_is_reported_as_empty() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST).path(CHAT_PATH);
            then.status(200).json_body(chat_completion(
                "SELECT name FROM employees WHERE salary > 1000000",
            ));
        })
        .await;

    let response = app
        .client
        .post(app.url("/query"))
        .json(&json!({ "query": "employees earning over a million" }))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["status"], "empty");
    assert_eq!(body["result"]["rows"], json!([]));
    assert!(body["result"]["error"].is_null());
    Ok(())
}

#[tokio::test]
async fn test_backfill_then_similarity_query() -> Result<()> {
    let app = TestApp::spawn().await?;
    let embed_mock = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST).path(EMBEDDINGS_PATH);
            then.status(200).json_body(constant_embedding());
        })
        .await;

    // --- 1. Backfill product embeddings ---
    let backfill = app
        .client
        .post(app.url("/embeddings/backfill"))
        .json(&json!({ "table": "products" }))
        .send()
        .await?;
    assert_eq!(backfill.status().as_u16(), 200);
    let summary: Value = backfill.json().await?;
    assert_eq!(summary["result"]["embedded"], 6);
    assert_eq!(summary["result"]["failed"], json!([]));

    // --- 2. Similarity query with an explicit top_k ---
    let response = app
        .client
        .post(app.url("/query?debug=true"))
        .json(&json!({ "query": "products similar to a desk lamp", "top_k": 2 }))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["status"], "ok");
    assert_eq!(
        body["result"]["columns"],
        json!(["id", "name", "price", "distance"])
    );
    assert_eq!(body["result"]["rows"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["debug"]["intent"], "similarity_query");
    assert_eq!(body["debug"]["state"], "presented");
    assert_eq!(body["debug"]["top_k"], 2);

    // Six backfill calls and one query embedding.
    embed_mock.assert_hits_async(7).await;
    Ok(())
}

#[tokio::test]
async fn test_embedding_failure_is_bad_gateway() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST).path(EMBEDDINGS_PATH);
            then.status(503).body("embedding service unavailable");
        })
        .await;
    let chat_mock = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST).path(CHAT_PATH);
            then.status(200).json_body(chat_completion("SELECT 1"));
        })
        .await;

    let response = app
        .client
        .post(app.url("/query"))
        .json(&json!({ "query": "chairs like this one" }))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["status"], "failed");
    assert_eq!(body["result"]["error"]["stage"], "embedding");
    assert!(body["result"]["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("embedding service unavailable")));
    assert!(body["result"]["generated_query"].is_null());
    chat_mock.assert_hits_async(0).await;
    Ok(())
}

#[tokio::test]
async fn test_execution_failure_is_internal_error() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST).path(CHAT_PATH);
            then.status(200)
                .json_body(chat_completion("SELECT * FROM widgets"));
        })
        .await;

    let response = app
        .client
        .post(app.url("/query"))
        .json(&json!({ "query": "show every widget" }))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await?;
    assert_eq!(body["result"]["status"], "failed");
    assert_eq!(body["result"]["error"]["stage"], "execution");
    Ok(())
}

#[tokio::test]
async fn test_backfill_rejects_tables_without_embeddings() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .post(app.url("/embeddings/backfill"))
        .json(&json!({ "table": "employees" }))
        .send()
        .await?;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await?;
    assert!(body["error"]
        .as_str()
        .is_some_and(|m| m.contains("employees")));
    Ok(())
}
