//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_bytes, body_json, build_app, build_test_app, create_body, get, post_json};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /api/health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_healthy_with_json() {
    let (app, _) = build_test_app();
    let response = get(app, "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
    assert_eq!(json["model"], "gemini/gemini-2.0-flash");
    assert_eq!(json["in_flight"], 0);
    assert_eq!(json["projects"]["completed"], 0);
}

// ---------------------------------------------------------------------------
// Test: health counters follow project outcomes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_counts_projects_by_status() {
    let (app, state) = build_test_app();
    post_json(app, "/api/projects", create_body("Counted")).await;

    let mut body = create_body("Also counted");
    body["api_key"] = serde_json::json!(common::INVALID_KEY);
    post_json(build_app(state.clone()), "/api/projects", body).await;

    let json = body_json(get(build_app(state), "/api/health").await).await;
    assert_eq!(json["projects"]["completed"], 1);
    assert_eq!(json["projects"]["failed"], 1);
    assert_eq!(json["projects"]["pending"], 0);
    assert_eq!(json["projects"]["in_progress"], 0);
}

// ---------------------------------------------------------------------------
// Test: the static frontend is served at the root
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_serves_frontend() {
    let (app, _) = build_test_app();
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"), "got {content_type}");
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("/api/projects"));
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let (app, _) = build_test_app();
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let (app, _) = build_test_app();
    let response = get(app, "/api/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let (app, _) = build_test_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/projects")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    let allow_origin = headers
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header")
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:5173");

    let allow_methods = headers
        .get("access-control-allow-methods")
        .expect("Missing Access-Control-Allow-Methods header")
        .to_str()
        .unwrap();
    assert!(
        allow_methods.contains("POST"),
        "Allow-Methods should contain POST, got: {allow_methods}"
    );
}
