//! HTTP-level integration tests for the supporting catalogue entities:
//! assurance goals, tags, and resource types.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_json, put_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Assurance goals
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn goal_crud_round_trip(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/assurance-goals",
        serde_json::json!({"name": "Fairness", "description": "Bias and parity."}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Fairness");
    assert_eq!(created["description"], "Bias and parity.");

    let app = common::build_test_app(pool.clone());
    let response = get(app, &format!("/api/v1/assurance-goals/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Partial update: only the description changes.
    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/assurance-goals/{id}"),
        serde_json::json!({"description": "Group and individual fairness."}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Fairness");
    assert_eq!(updated["description"], "Group and individual fairness.");

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/assurance-goals/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/assurance-goals/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn goal_create_requires_name(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/assurance-goals", serde_json::json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Validation failed");
    assert_eq!(json["details"]["name"][0], "This field is required.");
}

#[sqlx::test(migrations = "../../migrations")]
async fn goal_list_supports_search(pool: PgPool) {
    for name in ["Explainability", "Fairness", "Safety"] {
        let app = common::build_test_app(pool.clone());
        post_json(
            app,
            "/api/v1/assurance-goals",
            serde_json::json!({"name": name}),
        )
        .await;
    }

    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/assurance-goals").await).await;
    assert_eq!(json["count"], 3);
    assert_eq!(json["results"][0]["name"], "Explainability");

    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/assurance-goals?search=fair").await).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["results"][0]["name"], "Fairness");
}

#[sqlx::test(migrations = "../../migrations")]
async fn goal_delete_clears_use_case_links(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let goal = body_json(
        post_json(
            app,
            "/api/v1/assurance-goals",
            serde_json::json!({"name": "Robustness"}),
        )
        .await,
    )
    .await;
    let goal_id = goal["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/techniques",
        serde_json::json!({
            "name": "Noise Injection",
            "description": "Perturbs inputs to probe stability.",
            "assurance_goal_ids": [goal_id],
            "example_use_cases": [{
                "description": "Stress-testing a vision model.",
                "assurance_goal_id": goal_id,
            }],
        }),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/assurance-goals/{goal_id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The technique survives; the classification link is gone and the use
    // case keeps its row with the goal nulled.
    let app = common::build_test_app(pool);
    let json = body_json(get(app, "/api/v1/techniques/noise-injection").await).await;
    assert_eq!(json["assurance_goals"], serde_json::json!([]));
    assert_eq!(
        json["example_use_cases"][0]["assurance_goal_id"],
        serde_json::Value::Null
    );
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn tag_crud_round_trip(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/tags",
        serde_json::json!({"name": "post-hoc"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/tags/{id}"),
        serde_json::json!({"name": "post-hoc-explanation"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "post-hoc-explanation");

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/tags/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = delete(app, &format!("/api/v1/tags/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_tag_name_returns_409(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    post_json(app, "/api/v1/tags", serde_json::json!({"name": "intrinsic"})).await;

    let app = common::build_test_app(pool);
    let response = post_json(app, "/api/v1/tags", serde_json::json!({"name": "intrinsic"})).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], true);
}

// ---------------------------------------------------------------------------
// Resource types
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn resource_type_crud_round_trip(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/resource-types",
        serde_json::json!({"name": "Software Package", "icon": "package"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["icon"], "package");

    let app = common::build_test_app(pool.clone());
    let response = put_json(
        app,
        &format!("/api/v1/resource-types/{id}"),
        serde_json::json!({"icon": "box"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Software Package");
    assert_eq!(updated["icon"], "box");

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/resource-types/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get(app, &format!("/api/v1/resource-types/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../migrations")]
async fn referenced_resource_type_cannot_be_deleted(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/techniques",
        serde_json::json!({
            "name": "Model Cards",
            "description": "Structured model documentation.",
            "resources": [{
                "type": "Documentation",
                "title": "Model Cards for Model Reporting",
                "url": "https://example.org/model-cards",
            }],
        }),
    )
    .await;

    // The type was created on first use; find its id via the list.
    let app = common::build_test_app(pool.clone());
    let json = body_json(get(app, "/api/v1/resource-types?search=documentation").await).await;
    let id = json["results"][0]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete(app, &format!("/api/v1/resource-types/{id}")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        format!("Resource type {id} is referenced by 1 resource(s)")
    );

    // Deleting the technique releases the type.
    let app = common::build_test_app(pool.clone());
    delete(app, "/api/v1/techniques/model-cards").await;

    let app = common::build_test_app(pool);
    let response = delete(app, &format!("/api/v1/resource-types/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
