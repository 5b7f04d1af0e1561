//! API route definitions.

use crate::api::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::error;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/cleanup", post(trigger_cleanup))
        .route("/cleanup/status", get(cleanup_status))
        .route("/cleanup/schedule", post(schedule_cleanup))
}

async fn health() -> Json<Value> {
    Json(json!({
        "data": {
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION")
        },
        "meta": {
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

/// Manual trigger: run one cleanup pass now, independent of the schedule.
/// Per-item deletion failures are part of a successful response; only a
/// failing scan or task-record write maps to 500.
async fn trigger_cleanup(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.engine.delete_expired_events().await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": report.outcome.message,
                "data": {
                    "deleted": report.outcome.deleted,
                    "failed": report.outcome.failed,
                    "timestamp": report.run_at.to_rfc3339()
                }
            })),
        ),
        Err(e) => {
            error!("Manual cleanup trigger failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}

async fn cleanup_status(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.scheduler.cleanup_status() {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": status })),
        ),
        Err(e) => {
            error!("Cleanup status read failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}

async fn schedule_cleanup(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.scheduler.schedule_cleanup() {
        Ok(outcome) => {
            let message = if outcome.created {
                "Cleanup schedule created"
            } else {
                "Cleanup schedule updated"
            };
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": message,
                    "data": { "next_run": outcome.next_run.to_rfc3339() }
                })),
            )
        }
        Err(e) => {
            error!("Cleanup scheduling failed: {e:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}
