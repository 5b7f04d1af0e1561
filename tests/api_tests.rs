//! HTTP API tests -- envelope shapes and status codes via `oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use eventsweep::api::state::AppState;
use eventsweep::cleanup::{CleanupEngine, FixedClock};
use eventsweep::config::CleanupSettings;
use eventsweep::events::{Event, EventStatus, EventStore};
use eventsweep::scheduler::SchedulerDriver;
use eventsweep::storage::open_pool;
use eventsweep::tasks::TaskStore;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn fixed_now() -> DateTime<Utc> {
    "2026-06-15T09:30:00Z".parse().unwrap()
}

fn test_app() -> (tempfile::TempDir, eventsweep::storage::Pool, axum::Router) {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("api.db");
    let pool = open_pool(path.to_str().unwrap()).unwrap();

    let clock = Arc::new(FixedClock::new(fixed_now()));
    let events = EventStore::new(pool.clone());
    let tasks = TaskStore::new(pool.clone());
    let engine = Arc::new(CleanupEngine::new(
        events,
        tasks.clone(),
        clock.clone(),
        CleanupSettings::default(),
    ));
    let scheduler = Arc::new(SchedulerDriver::new(
        tasks,
        clock,
        CleanupSettings::default(),
    ));

    let app = eventsweep::api::router(AppState {
        pool: pool.clone(),
        engine,
        scheduler,
    });
    (dir, pool, app)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_ok() {
    let (_dir, _pool, app) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_manual_trigger_returns_run_summary() {
    let (_dir, pool, app) = test_app();

    let store = EventStore::new(pool.clone());
    let expired = Event::new(
        "Stale workshop",
        EventStatus::Upcoming,
        Some(fixed_now() - Duration::days(2)),
        fixed_now(),
    );
    store.insert(&expired).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/cleanup")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["deleted"], 1);
    assert_eq!(json["data"]["failed"], 0);
    assert!(json["data"]["timestamp"].is_string());

    assert!(store.get(expired.id).unwrap().is_none());
}

#[tokio::test]
async fn test_status_before_any_scheduling() {
    let (_dir, _pool, app) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/cleanup/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["active"], false);
    assert!(json["data"]["last_run"].is_null());
}

#[tokio::test]
async fn test_schedule_then_status_roundtrip() {
    let (_dir, _pool, app) = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/cleanup/schedule")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "Cleanup schedule created");
    let next_run: DateTime<Utc> = json["data"]["next_run"].as_str().unwrap().parse().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/cleanup/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["data"]["active"], true);
    let status_next: DateTime<Utc> = json["data"]["next_run"].as_str().unwrap().parse().unwrap();
    assert_eq!(status_next, next_run);
    assert_eq!(json["data"]["config"]["run_time"], "02:00");
    assert_eq!(json["data"]["config"]["frequency"], "daily");
}

#[tokio::test]
async fn test_trigger_failure_maps_to_500() {
    let (_dir, pool, app) = test_app();

    // Break the scan path.
    pool.get().unwrap().execute_batch("DROP TABLE events").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/cleanup")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_unknown_route_falls_back_to_404() {
    let (_dir, _pool, app) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
