//! HTTP API tests over the full router with the in-memory backend.
//!
//! Requester identity arrives as `x-user-id` / `x-user-role` headers,
//! resolved by an upstream auth proxy in production.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use pressroom::routes;
use pressroom::state::AppState;
use pressroom::store::MemoryContentStore;

fn app() -> Router {
    let state = AppState::with_store(Arc::new(MemoryContentStore::new()));
    Router::new()
        .merge(routes::content::router())
        .merge(routes::recommend::router())
        .merge(routes::stats::router())
        .merge(routes::health::router())
        .with_state(state)
}

fn editor_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    identified_request(method, uri, body, Uuid::now_v7(), "editor")
}

fn identified_request(
    method: &str,
    uri: &str,
    body: Option<Value>,
    user_id: Uuid,
    role: &str,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .header("x-user-role", role)
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], true);
}

#[tokio::test]
async fn create_then_fetch_by_slug() {
    let app = app();

    let response = app
        .clone()
        .oneshot(editor_request(
            "POST",
            "/api/content",
            Some(json!({
                "title": "Launch Day",
                "body": "We shipped.",
                "is_published": true
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let created = body_json(response).await;
    assert_eq!(created["slug"], "launch-day");
    assert!(created["publish_date"].is_string());

    let response = app
        .oneshot(
            Request::get("/api/content/slug/launch-day")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["title"], "Launch Day");
}

#[tokio::test]
async fn anonymous_create_is_forbidden() {
    let response = app()
        .oneshot(
            Request::post("/api/content")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "title": "Nope", "body": "" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn validation_errors_carry_the_field() {
    let response = app()
        .oneshot(editor_request(
            "POST",
            "/api/content",
            Some(json!({ "title": "   ", "body": "" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["field"], "title");
}

#[tokio::test]
async fn draft_is_hidden_from_anonymous_but_not_its_author() {
    let app = app();
    let author_id = Uuid::now_v7();

    let response = app
        .clone()
        .oneshot(identified_request(
            "POST",
            "/api/content",
            Some(json!({ "title": "Secret Draft", "body": "wip" })),
            author_id,
            "author",
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Anonymous read by id is refused.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/content/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The author can read their own draft.
    let response = app
        .oneshot(identified_request(
            "GET",
            &format!("/api/content/{id}"),
            None,
            author_id,
            "author",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn preview_flow_over_http() {
    let app = app();

    let response = app
        .clone()
        .oneshot(editor_request(
            "POST",
            "/api/content",
            Some(json!({ "title": "Hidden Draft", "body": "draft body" })),
        ))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(editor_request(
            "POST",
            &format!("/api/content/{id}/preview-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    // The issued pair redeems to the restricted projection.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/content/{id}/preview/{token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let preview = body_json(response).await;
    assert_eq!(preview["title"], "Hidden Draft");
    assert!(preview.get("author_id").is_none());

    // A fabricated token is refused.
    let response = app
        .oneshot(
            Request::get(format!("/api/content/{id}/preview/fabricated"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn recommendations_endpoint_returns_related_items() {
    let app = app();

    for title in ["Launch Day", "Launch Party", "Quarterly Report"] {
        let response = app
            .clone()
            .oneshot(editor_request(
                "POST",
                "/api/content",
                Some(json!({ "title": title, "body": "b", "is_published": true })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/recommendations/launch-day")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let related = body_json(response).await;
    let slugs: Vec<&str> = related
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["launch-party"]);

    // Unknown slugs yield an empty list, not an error.
    let response = app
        .oneshot(
            Request::get("/api/recommendations/no-such-slug")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn stats_endpoint_is_public() {
    let app = app();

    app.clone()
        .oneshot(editor_request(
            "POST",
            "/api/content",
            Some(json!({ "title": "Post", "body": "b", "is_published": true })),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stats = body_json(response).await;
    assert_eq!(stats["total_published"], 1);
    assert_eq!(stats["recent_published"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_item_maps_to_not_found() {
    let response = app()
        .oneshot(editor_request(
            "PUT",
            &format!("/api/content/{}", Uuid::now_v7()),
            Some(json!({})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
