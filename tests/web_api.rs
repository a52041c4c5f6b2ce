//! Web API integration tests.
//!
//! Drives the axum router directly with `tower::ServiceExt::oneshot`, so no
//! socket is bound.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use promptbin::models::PromptDraft;
use promptbin::storage::{FilesystemPromptStore, PromptStore};
use promptbin::web;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

fn app() -> (TempDir, Router, Arc<FilesystemPromptStore>) {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FilesystemPromptStore::new(dir.path()).unwrap());
    let router = web::router(store.clone());
    (dir, router, store)
}

fn seeded_app() -> (TempDir, Router, String) {
    let (dir, router, store) = app();
    let id = store
        .save(
            &PromptDraft {
                title: "Summarize".to_string(),
                content: "Summarize: {{text}}".to_string(),
                category: "writing".to_string(),
                tags: "nlp, summary".to_string(),
                ..Default::default()
            },
            None,
        )
        .unwrap();
    (dir, router, id)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_create_and_list() {
    let (_dir, router, _store) = app();

    let (status, body) = send(
        router.clone(),
        json_request(
            "POST",
            "/api/prompts",
            json!({
                "title": "Debugging",
                "content": "Find the bug in {{code}}",
                "category": "coding",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Prompt created successfully");
    let id = body["prompt_id"].as_str().unwrap().to_string();

    let (status, body) = send(router, get_request("/api/prompts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["prompts"][0]["id"], id.as_str());
}

#[tokio::test]
async fn test_create_validation_failure() {
    let (_dir, router, _store) = app();

    let (status, body) = send(
        router,
        json_request("POST", "/api/prompts", json!({"title": "No content"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Missing required field: content");
}

#[tokio::test]
async fn test_get_update_delete() {
    let (_dir, router, id) = seeded_app();

    let (status, body) = send(router.clone(), get_request(&format!("/api/prompts/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Summarize");

    let (status, body) = send(
        router.clone(),
        json_request(
            "PUT",
            &format!("/api/prompts/{id}"),
            json!({
                "title": "Summarize v2",
                "content": "Summarize: {{text}}",
                "category": "writing",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Prompt updated successfully");

    let (status, body) = send(
        router.clone(),
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/prompts/{id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Prompt deleted successfully");

    let (status, _body) = send(router, get_request(&format!("/api/prompts/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_missing_prompt_is_404() {
    let (_dir, router, _store) = app();

    let (status, body) = send(
        router,
        json_request(
            "PUT",
            "/api/prompts/20240101_000000_deadbeef",
            json!({"title": "X", "content": "Y", "category": "coding"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Prompt not found");
}

#[tokio::test]
async fn test_search() {
    let (_dir, router, _id) = seeded_app();

    let (status, body) = send(router.clone(), get_request("/api/search?q=summarize")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["query"], "summarize");

    // Category scoping
    let (status, body) = send(
        router.clone(),
        get_request("/api/search?q=summarize&category=coding"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);

    // Invalid category is a 400
    let (status, _body) = send(router, get_request("/api/search?q=x&category=poetry")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats() {
    let (_dir, router, _id) = seeded_app();

    let (status, body) = send(router, get_request("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_prompts"], 1);
    assert_eq!(body["by_category"]["writing"], 1);
    assert_eq!(body["recent_activity"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_preview_highlights_variables() {
    let (_dir, router, _store) = app();

    let (status, body) = send(
        router.clone(),
        json_request("POST", "/api/preview", json!({"content": "Use {{name}} here"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["html"],
        "Use <span class=\"template-var\">{{name}}</span> here"
    );

    let (status, body) = send(router, json_request("POST", "/api/preview", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No content provided");
}

#[tokio::test]
async fn test_security_header_present() {
    let (_dir, router, _store) = app();

    let response = router.oneshot(get_request("/api/stats")).await.unwrap();
    assert_eq!(
        response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
}
