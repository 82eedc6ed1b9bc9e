//! Integration tests for the customers resource.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_default_app, get_req, post_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn create_and_fetch_a_customer(pool: PgPool) {
    let app = build_default_app(pool);

    let response = post_json(
        app.clone(),
        "/api/customers",
        json!({
            "name": "Jane",
            "phone": "010-1234-5678",
            "gender": "female",
            "body_shape": "wave",
            "height_bucket": "160-165cm",
            "weight_bucket": "50-55kg",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["data"]["id"].as_i64().unwrap();
    assert_eq!(json["data"]["name"], "Jane");
    assert_eq!(json["data"]["gender"], "female");
    assert_eq!(json["data"]["body_shape"], "wave");

    let fetched = get_req(app, &format!("/api/customers/{id}")).await;
    assert_eq!(fetched.status(), StatusCode::OK);
    let fetched_json = body_json(fetched).await;
    assert_eq!(fetched_json["data"]["id"].as_i64().unwrap(), id);
    assert_eq!(fetched_json["data"]["phone"], "010-1234-5678");
}

#[sqlx::test(migrations = "../../migrations")]
async fn nameless_intake_gets_a_placeholder_name(pool: PgPool) {
    let app = build_default_app(pool);

    let response = post_json(app, "/api/customers", json!({ "gender": "male" })).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let name = json["data"]["name"].as_str().unwrap();
    assert!(name.starts_with("guest-"), "got placeholder name {name}");
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_customer_returns_404(pool: PgPool) {
    let app = build_default_app(pool);

    let response = get_req(app, "/api/customers/4242").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

#[sqlx::test(migrations = "../../migrations")]
async fn listing_is_paged(pool: PgPool) {
    let app = build_default_app(pool);

    for i in 0..3 {
        let response = post_json(
            app.clone(),
            "/api/customers",
            json!({ "name": format!("customer-{i}") }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_req(app, "/api/customers?limit=2").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["limit"], 2);
    assert_eq!(json["pagination"]["offset"], 0);
}
