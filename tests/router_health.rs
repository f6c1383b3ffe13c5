//! End-to-end check that the health route is reachable through the
//! full axum `Router`/`tower::Service` stack, not just as a bare
//! handler function call.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;

use streamcore::presentation::http::handlers::health_handlers::health_check;

#[tokio::test]
async fn health_endpoint_returns_ok_status() {
    let app = Router::new().route("/health", get(health_check));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "streamcore");
}

#[tokio::test]
async fn unknown_route_returns_not_found() {
    let app = Router::new().route("/health", get(health_check));

    let response = app
        .oneshot(Request::builder().uri("/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
