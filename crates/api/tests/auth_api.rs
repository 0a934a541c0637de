//! Integration tests for bearer-token write protection.
//!
//! Reads are always open. Writes are open too unless `API_WRITE_TOKEN` is
//! configured, in which case every mutating route demands a matching
//! `Authorization: Bearer <token>` header.

mod common;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use common::{body_json, get, post_json};
use sqlx::PgPool;
use tower::ServiceExt;

const TOKEN: &str = "sesame";

async fn post_json_with_auth(
    app: Router,
    path: &str,
    body: serde_json::Value,
    auth: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, auth)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
async fn writes_are_open_without_a_configured_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/tags",
        serde_json::json!({"name": "open-access"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../migrations")]
async fn write_without_header_returns_401(pool: PgPool) {
    let app = common::build_test_app_with_token(pool, TOKEN);
    let response = post_json(app, "/api/v1/tags", serde_json::json!({"name": "t"})).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], true);
    assert_eq!(json["message"], "Missing Authorization header");
}

#[sqlx::test(migrations = "../../migrations")]
async fn write_with_wrong_scheme_returns_401(pool: PgPool) {
    let app = common::build_test_app_with_token(pool, TOKEN);
    let response = post_json_with_auth(
        app,
        "/api/v1/tags",
        serde_json::json!({"name": "t"}),
        &format!("Basic {TOKEN}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "Invalid Authorization format. Expected: Bearer <token>"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn write_with_wrong_token_returns_401(pool: PgPool) {
    let app = common::build_test_app_with_token(pool, TOKEN);
    let response = post_json_with_auth(
        app,
        "/api/v1/tags",
        serde_json::json!({"name": "t"}),
        "Bearer wrong",
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Invalid token");
}

#[sqlx::test(migrations = "../../migrations")]
async fn write_with_correct_token_succeeds(pool: PgPool) {
    let app = common::build_test_app_with_token(pool, TOKEN);
    let response = post_json_with_auth(
        app,
        "/api/v1/tags",
        serde_json::json!({"name": "guarded"}),
        &format!("Bearer {TOKEN}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["name"], "guarded");
}

#[sqlx::test(migrations = "../../migrations")]
async fn reads_never_require_auth(pool: PgPool) {
    let app = common::build_test_app_with_token(pool, TOKEN);
    let response = get(app, "/api/v1/techniques").await;

    assert_eq!(response.status(), StatusCode::OK);
}
