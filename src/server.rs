// src/server.rs

//! HTTP surface: `POST /plan` and `GET /health`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::agent::TripAgent;
use crate::parse::ParseError;
use crate::protocol::TripResponse;

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub query: String,
}

/// Request-level error body:
/// `{ "ok": false, "error": { "code": "<code>", "message": "<message>" } }`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorResponse {
    pub ok: bool,
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                ok: false,
                error: ApiErrorBody {
                    code: code.into(),
                    message: message.into(),
                },
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        Self::bad_request(err.to_string())
    }
}

pub fn router(agent: Arc<TripAgent>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/plan", post(plan))
        .with_state(agent)
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// POST /plan
///
/// Runs the whole plan on a blocking worker; the tool adapters use blocking
/// HTTP clients and each request gets its own run state.
async fn plan(
    State(agent): State<Arc<TripAgent>>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<TripResponse>, ApiError> {
    let outcome = tokio::task::spawn_blocking(move || agent.handle_query(&req.query))
        .await
        .map_err(|e| {
            error!("planner task failed: {}", e);
            ApiError::internal(format!("planner task failed: {e}"))
        })?;
    Ok(Json(outcome?))
}

pub async fn serve(agent: Arc<TripAgent>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(agent))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
