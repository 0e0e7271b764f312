//! HTTP-level tests for the specimen API router

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use biosync_api::{build_router, AppState};
use biosync_common::db::init_memory_database;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> axum::Router {
    let pool = init_memory_database().await.unwrap();
    sqlx::query("INSERT INTO participants (biobank_id, created_at) VALUES ('Z1234', 0)")
        .execute(&pool)
        .await
        .unwrap();
    build_router(AppState::new(pool))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upsert_then_get_specimen() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/specimens",
            json!({
                "rlimsID": "sp-http",
                "orderID": "ord-1",
                "participantID": "Z1234",
                "testcode": "1ED04"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["rlimsID"], "sp-http");

    let response = app
        .oneshot(
            Request::get("/api/specimens/sp-http")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["testcode"], "1ED04");
    assert!(body["aliquots"].is_null());
}

#[tokio::test]
async fn test_get_unknown_specimen_is_404() {
    let app = app().await;
    let response = app
        .oneshot(
            Request::get("/api/specimens/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upsert_validation_is_400() {
    let app = app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/specimens",
            json!({"rlimsID": "sp-bad"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Missing fields: orderID, participantID, testcode");
}

#[tokio::test]
async fn test_batch_upsert_reports_inline_errors() {
    let app = app().await;
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/specimens",
            json!([
                {"rlimsID": "sp-a", "orderID": "o", "participantID": "Z1234", "testcode": "t"},
                {"rlimsID": "sp-b"}
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["summary"]["total_received"], 2);
    assert_eq!(body["summary"]["success_count"], 1);
    assert_eq!(body["errors"][0]["rlimsID"], "sp-b");
}

#[tokio::test]
async fn test_status_put_404_when_target_missing() {
    let app = app().await;
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/samples/missing/status",
            json!({"status": "In Circulation"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
