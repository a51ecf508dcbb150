//! In-process integration tests driving the full router.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use olsc_server::config::RuntimeConfig;
use olsc_server::server::build_router;
use olsc_server::state::AppState;
use tower::ServiceExt;

fn app() -> Router {
    build_router(AppState::new(RuntimeConfig::default()))
}

async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app
        .as_service()
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let mut app = app();
    let (status, json) = send(&mut app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn reading_an_unknown_clock_returns_the_zero_snapshot() {
    let mut app = app();
    let (status, json) = send(&mut app, get("/api/v1/clock/unknown")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["elapsed"], 0);
    assert_eq!(json["running"], false);
}

#[tokio::test]
async fn clock_lifecycle_over_http() {
    let mut app = app();

    let (status, json) = send(&mut app, post_empty("/api/v1/clock/m1/start")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["running"], true);
    assert_eq!(json["match_id"], "m1");

    let (status, json) = send(
        &mut app,
        post_json("/api/v1/clock/m1/pause", r#"{"reason":"Half time"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["running"], false);
    assert_eq!(json["paused_reason"], "Half time");

    // Resume clears the reason.
    let (status, json) = send(&mut app, post_empty("/api/v1/clock/m1/start")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["running"], true);
    assert!(json.get("paused_reason").is_none());

    // Finish without a body takes the default reason.
    let (status, json) = send(&mut app, post_empty("/api/v1/clock/m1/finish")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["finished"], true);
    assert_eq!(json["paused_reason"], "Match finished");

    // Terminal: a restart is rejected.
    let (status, _) = send(&mut app, post_empty("/api/v1/clock/m1/start")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn pausing_an_unknown_clock_is_not_found() {
    let mut app = app();
    let (status, _) = send(&mut app, post_empty("/api/v1/clock/unknown/pause")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&mut app, post_empty("/api/v1/clock/unknown/finish")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_clock_command_is_bad_request() {
    let mut app = app();
    send(&mut app, post_empty("/api/v1/clock/m1/start")).await;

    let (status, _) = send(
        &mut app,
        post_json("/api/v1/clock/m1/pause", "not-json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reset_deletes_the_clock_and_is_idempotent() {
    let mut app = app();
    send(&mut app, post_empty("/api/v1/clock/m1/start")).await;

    let request = Request::delete("/api/v1/clock/m1").body(Body::empty()).unwrap();
    let (status, _) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Back to the zero snapshot, and a finished flag no longer blocks.
    let (status, json) = send(&mut app, get("/api/v1/clock/m1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["elapsed"], 0);

    let request = Request::delete("/api/v1/clock/m1").body(Body::empty()).unwrap();
    let (status, _) = send(&mut app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn appending_before_the_feed_is_started_is_not_found() {
    let mut app = app();
    let (status, _) = send(
        &mut app,
        post_json(
            "/api/v1/feed/m1",
            r#"{"type":"goal","team":"home","minute":12}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feed_scenario_over_http() {
    let mut app = app();

    let (status, json) = send(&mut app, post_empty("/api/v1/feed/m1/start")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["home_score"], 0);
    assert_eq!(json["away_score"], 0);

    let (status, json) = send(
        &mut app,
        post_json(
            "/api/v1/feed/m1",
            r#"{"type":"goal","team":"home","minute":12,"player":"Kovač"}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["seq"], 0);
    assert_eq!(json["type"], "goal");

    send(
        &mut app,
        post_json(
            "/api/v1/feed/m1",
            r#"{"type":"goal","team":"away","minute":30,"points":3}"#,
        ),
    )
    .await;
    send(
        &mut app,
        post_json(
            "/api/v1/feed/m1",
            r#"{"type":"card","team":"away","minute":44,"color":"yellow"}"#,
        ),
    )
    .await;

    let (status, json) = send(&mut app, get("/api/v1/stats/m1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["home_score"], 1);
    assert_eq!(json["away_score"], 3);
    assert_eq!(json["away"]["yellow_cards"], 1);
    assert_eq!(json["events"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn invalid_events_never_reach_the_log() {
    let mut app = app();
    send(&mut app, post_empty("/api/v1/feed/m1/start")).await;

    // Unknown kind.
    let (status, _) = send(
        &mut app,
        post_json(
            "/api/v1/feed/m1",
            r#"{"type":"celebration","team":"home","minute":5}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown team.
    let (status, _) = send(
        &mut app,
        post_json(
            "/api/v1/feed/m1",
            r#"{"type":"goal","team":"neutral","minute":5}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, json) = send(&mut app, get("/api/v1/stats/m1")).await;
    assert!(json["events"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn appending_to_a_finished_match_is_a_conflict() {
    let mut app = app();
    send(&mut app, post_empty("/api/v1/clock/m1/start")).await;
    send(&mut app, post_empty("/api/v1/feed/m1/start")).await;
    send(&mut app, post_empty("/api/v1/clock/m1/finish")).await;

    let (status, _) = send(
        &mut app,
        post_json(
            "/api/v1/feed/m1",
            r#"{"type":"goal","team":"home","minute":95}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn restarting_the_feed_resets_score_and_log() {
    let mut app = app();
    send(&mut app, post_empty("/api/v1/feed/m1/start")).await;
    send(
        &mut app,
        post_json(
            "/api/v1/feed/m1",
            r#"{"type":"goal","team":"home","minute":10}"#,
        ),
    )
    .await;

    let (status, json) = send(&mut app, post_empty("/api/v1/feed/m1/start")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["home_score"], 0);
    assert!(json["events"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn stats_for_an_unknown_match_is_not_found() {
    let mut app = app();
    let (status, _) = send(&mut app, get("/api/v1/stats/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
