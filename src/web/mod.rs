//! Web API server.
//!
//! Exposes the prompt store over HTTP as a JSON API. Response envelopes
//! follow the `{"status": ..., "message": ...}` convention; storage faults
//! are logged and surfaced as opaque 500s.

use crate::models::{Category, PromptDraft, highlight_template_variables};
use crate::storage::PromptStore;
use crate::{Error, Result};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state.
type AppState = Arc<dyn PromptStore>;

/// Builds the API router over the given store.
#[must_use]
pub fn router(store: AppState) -> Router {
    Router::new()
        .route("/api/prompts", get(list_prompts).post(create_prompt))
        .route(
            "/api/prompts/{id}",
            get(get_prompt).put(update_prompt).delete(delete_prompt),
        )
        .route("/api/search", get(search_prompts))
        .route("/api/stats", get(get_stats))
        .route("/api/preview", axum::routing::post(preview_content))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            header::HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

/// Runs the web server until interrupted.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(host: &str, port: u16, store: AppState) -> Result<()> {
    let app = router(store);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "bind".to_string(),
            cause: format!("{addr}: {e}"),
        })?;

    tracing::info!(%addr, "Starting web server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "serve".to_string(),
            cause: e.to_string(),
        })
}

/// Resolves on ctrl-c.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Shutdown signal received");
    }
}

/// Query parameters for listing and searching.
#[derive(Debug, Deserialize)]
struct ListQuery {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    category: Option<String>,
}

/// GET /api/prompts
async fn list_prompts(
    State(store): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let category = match parse_category(query.category.as_deref()) {
        Ok(category) => category,
        Err(response) => return response,
    };

    match store.list(category) {
        Ok(prompts) => {
            let count = prompts.len();
            Json(json!({ "prompts": prompts, "count": count })).into_response()
        },
        Err(e) => error_response(&e),
    }
}

/// POST /api/prompts
async fn create_prompt(
    State(store): State<AppState>,
    body: Option<Json<PromptDraft>>,
) -> Response {
    let Some(Json(draft)) = body else {
        return status_error(StatusCode::BAD_REQUEST, "No data provided");
    };

    match store.save(&draft, None) {
        Ok(prompt_id) => Json(json!({
            "status": "success",
            "message": "Prompt created successfully",
            "prompt_id": prompt_id,
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/prompts/{id}
async fn get_prompt(State(store): State<AppState>, Path(id): Path<String>) -> Response {
    match store.get(&id) {
        Ok(Some(prompt)) => Json(prompt).into_response(),
        Ok(None) => status_error(StatusCode::NOT_FOUND, "Prompt not found"),
        Err(e) => error_response(&e),
    }
}

/// PUT /api/prompts/{id}
async fn update_prompt(
    State(store): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<PromptDraft>>,
) -> Response {
    let Some(Json(draft)) = body else {
        return status_error(StatusCode::BAD_REQUEST, "No data provided");
    };

    // Updates never create; an unknown id is a 404.
    match store.get(&id) {
        Ok(Some(_)) => {},
        Ok(None) => return status_error(StatusCode::NOT_FOUND, "Prompt not found"),
        Err(e) => return error_response(&e),
    }

    match store.save(&draft, Some(&id)) {
        Ok(_) => Json(json!({
            "status": "success",
            "message": "Prompt updated successfully",
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// DELETE /api/prompts/{id}
async fn delete_prompt(State(store): State<AppState>, Path(id): Path<String>) -> Response {
    match store.delete(&id) {
        Ok(true) => Json(json!({
            "status": "success",
            "message": "Prompt deleted successfully",
        }))
        .into_response(),
        Ok(false) => status_error(StatusCode::NOT_FOUND, "Prompt not found"),
        Err(e) => error_response(&e),
    }
}

/// GET /api/search
async fn search_prompts(
    State(store): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let category = match parse_category(query.category.as_deref()) {
        Ok(category) => category,
        Err(response) => return response,
    };

    match store.search(&query.q, category) {
        Ok(prompts) => {
            let count = prompts.len();
            Json(json!({
                "prompts": prompts,
                "query": query.q,
                "count": count,
            }))
            .into_response()
        },
        Err(e) => error_response(&e),
    }
}

/// GET /api/stats
async fn get_stats(State(store): State<AppState>) -> Response {
    match store.stats() {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(&e),
    }
}

/// POST /api/preview
async fn preview_content(body: Option<Json<Value>>) -> Response {
    let content = body
        .as_ref()
        .and_then(|Json(v)| v.get("content"))
        .and_then(Value::as_str);

    let Some(content) = content else {
        return status_error(StatusCode::BAD_REQUEST, "No content provided");
    };

    Json(json!({
        "status": "success",
        "html": highlight_template_variables(content),
    }))
    .into_response()
}

/// Parses an optional category query parameter.
fn parse_category(raw: Option<&str>) -> std::result::Result<Option<Category>, Response> {
    match raw {
        None => Ok(None),
        Some(s) => match Category::parse(s) {
            Ok(category) => Ok(Some(category)),
            Err(e) => Err(error_response(&e)),
        },
    }
}

/// Maps a store error to an HTTP response.
fn error_response(error: &Error) -> Response {
    match error {
        Error::Validation(message) => status_error(StatusCode::BAD_REQUEST, message),
        Error::OperationFailed { operation, cause } => {
            tracing::error!(%operation, %cause, "Store operation failed");
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        },
    }
}

/// Builds a `{"status": "error"}` envelope with the given status code.
fn status_error(code: StatusCode, message: &str) -> Response {
    (code, Json(json!({ "status": "error", "message": message }))).into_response()
}
