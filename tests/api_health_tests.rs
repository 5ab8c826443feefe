//! 健康检查 API 集成测试

use axum::{
    body::Body,
    http::{Request, StatusCode},
};

mod common;
use common::{body_json, create_test_app, send};

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let response = send(&app, Request::builder().uri("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert!(json["uptime_secs"].is_number());
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let app = create_test_app();

    let response = send(&app, Request::builder().uri("/ready").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ready"], true);
    assert_eq!(json["checks"][0]["name"], "storage");
    assert_eq!(json["checks"][0]["status"], "healthy");
}

#[tokio::test]
async fn test_tracking_headers() {
    let app = create_test_app();

    let response = send(
        &app,
        Request::builder()
            .uri("/health")
            .header("x-trace-id", "trace-abc")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.headers()["x-trace-id"], "trace-abc");
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_test_app();

    let response = send(&app, Request::builder().uri("/nope").body(Body::empty()).unwrap()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "route not found");
}
