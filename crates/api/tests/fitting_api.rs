//! Integration tests for fitting job submission, background synthesis, and
//! result polling.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use bytes::Bytes;
use common::{
    body_json, build_test_app, get_req, poll_until_terminal, post_json, spawn_image_server,
    FakeStore, ScriptedProvider,
};
use serde_json::json;
use sqlx::PgPool;
use tokio::sync::Notify;

use aplfit_db::models::clothing_item::CreateClothingItem;
use aplfit_db::models::sample_clothing::CreateSampleClothing;
use aplfit_db::repositories::{ClothingItemRepo, SampleClothingRepo};

const PHOTO_URL: &str = "https://objects.test/customers/1/photo.jpg";

async fn seed_clothing_item(pool: &PgPool) -> i64 {
    ClothingItemRepo::create(
        pool,
        &CreateClothingItem {
            name: "Linen shirt".to_string(),
            description: Some("white linen shirt".to_string()),
            image_url: "https://objects.test/clothing/shirt.jpg".to_string(),
            image_key: "clothing/top/shirt.jpg".to_string(),
            thumbnail_url: None,
            category: "top".to_string(),
            color: "white".to_string(),
            hex_color: None,
            style: None,
            gender: Some("unisex".to_string()),
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Validation: rejected submissions must not create records
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn submission_without_photo_is_rejected_without_a_record(pool: PgPool) {
    let app = common::build_default_app(pool.clone());

    let response = post_json(
        app,
        "/api/fitting/create",
        json!({ "clothingItemId": "1" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fitting_records")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "a rejected submission must leave no record");
}

#[sqlx::test(migrations = "../../migrations")]
async fn submission_without_clothing_ref_is_rejected(pool: PgPool) {
    let app = common::build_default_app(pool);

    let response = post_json(
        app,
        "/api/fitting/create",
        json!({ "customerPhotoUrl": PHOTO_URL }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_clothing_item_returns_404_without_a_record(pool: PgPool) {
    let app = common::build_default_app(pool.clone());

    let response = post_json(
        app,
        "/api/fitting/create",
        json!({ "customerPhotoUrl": PHOTO_URL, "clothingItemId": "9999" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fitting_records")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn polling_an_unknown_record_returns_404(pool: PgPool) {
    let app = common::build_default_app(pool);

    let response = get_req(app, "/api/fitting/result/12345").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Success path: submit, observe processing, then completed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn successful_fitting_completes_with_a_stored_result(pool: PgPool) {
    let output_url = spawn_image_server(Bytes::from_static(b"synthetic-jpeg")).await;

    let gate = Arc::new(Notify::new());
    let store = Arc::new(FakeStore::new());
    let provider = Arc::new(ScriptedProvider::succeeding(&output_url).gated(gate.clone()));
    let app = build_test_app(pool.clone(), store.clone(), provider.clone());

    let item_id = seed_clothing_item(&pool).await;

    let response = post_json(
        app.clone(),
        "/api/fitting/create",
        json!({
            "customerPhotoUrl": PHOTO_URL,
            "clothingItemId": item_id.to_string(),
            "name": "Jane",
            "phone": "010-1234-5678",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "processing");
    let record_id = json["data"]["fittingRecordId"].as_i64().unwrap();

    // The provider is gated, so the first poll must still see processing.
    let poll = get_req(app.clone(), &format!("/api/fitting/result/{record_id}")).await;
    let poll_json = body_json(poll).await;
    assert_eq!(poll_json["data"]["status"], "processing");
    assert!(poll_json["data"]["result_url"].is_null());

    gate.notify_one();

    let terminal = poll_until_terminal(&app, record_id).await;
    let record = &terminal["data"];
    assert_eq!(record["status"], "completed");
    assert!(record["completed_at"].is_string());
    assert!(record["error_message"].is_null());
    assert!(record["error_code"].is_null());

    // The result was re-homed into our own storage, under the customer's
    // fitting-results folder.
    let result_key = record["result_key"].as_str().unwrap();
    let customer_id = record["customer_id"].as_i64().unwrap();
    assert!(result_key.starts_with(&format!("fitting-results/{customer_id}/")));
    assert!(store.contains(result_key));
    assert_eq!(
        record["result_url"].as_str().unwrap(),
        format!("https://objects.test/{result_key}")
    );

    // The provider saw the garment image and the composed prompt.
    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].person_image_url, PHOTO_URL);
    assert_eq!(
        calls[0].garment_image_url,
        "https://objects.test/clothing/shirt.jpg"
    );
    assert_eq!(calls[0].prompt, "white linen shirt for woman");

    // The item's usage counter was bumped.
    let item = ClothingItemRepo::find_by_id(&pool, item_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.fitting_count, 1);
}

// ---------------------------------------------------------------------------
// Failure path: provider error lands on the record, not the response
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn failed_synthesis_marks_the_record_failed(pool: PgPool) {
    let store = Arc::new(FakeStore::new());
    let provider = Arc::new(ScriptedProvider::failing("model rejected the input image"));
    let app = build_test_app(pool.clone(), store, provider);

    let item_id = seed_clothing_item(&pool).await;

    let response = post_json(
        app.clone(),
        "/api/fitting/create",
        json!({
            "customerPhotoUrl": PHOTO_URL,
            "clothingItemId": item_id.to_string(),
        }),
    )
    .await;

    // Submission succeeds even though the synthesis will fail.
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let record_id = json["data"]["fittingRecordId"].as_i64().unwrap();

    let terminal = poll_until_terminal(&app, record_id).await;
    let record = &terminal["data"];
    assert_eq!(record["status"], "failed");
    assert_eq!(record["error_code"], "FITTING_ERROR");
    let message = record["error_message"].as_str().unwrap();
    assert!(
        message.contains("model rejected the input image"),
        "error message should carry the provider failure, got: {message}"
    );
    assert!(record["result_url"].is_null());
    assert!(record["completed_at"].is_string());

    // A failed fitting must not bump the usage counter.
    let item = ClothingItemRepo::find_by_id(&pool, item_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.fitting_count, 0);
}

// ---------------------------------------------------------------------------
// Concurrent jobs settle independently
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn concurrent_jobs_reach_their_own_terminal_states(pool: PgPool) {
    let output_url = spawn_image_server(Bytes::from_static(b"synthetic-jpeg")).await;

    let store = Arc::new(FakeStore::new());
    let ok_app = build_test_app(
        pool.clone(),
        store.clone(),
        Arc::new(ScriptedProvider::succeeding(&output_url)),
    );
    let failing_app = build_test_app(
        pool.clone(),
        store,
        Arc::new(ScriptedProvider::failing("upstream timeout")),
    );

    let item_id = seed_clothing_item(&pool).await;

    let ok_response = post_json(
        ok_app.clone(),
        "/api/fitting/create",
        json!({
            "customerPhotoUrl": PHOTO_URL,
            "clothingItemId": item_id.to_string(),
            "name": "Jane",
            "phone": "010-1111-2222",
        }),
    )
    .await;
    let failing_response = post_json(
        failing_app,
        "/api/fitting/create",
        json!({
            "customerPhotoUrl": PHOTO_URL,
            "clothingItemId": item_id.to_string(),
            "name": "Mina",
            "phone": "010-3333-4444",
        }),
    )
    .await;

    let ok_id = body_json(ok_response).await["data"]["fittingRecordId"]
        .as_i64()
        .unwrap();
    let failing_id = body_json(failing_response).await["data"]["fittingRecordId"]
        .as_i64()
        .unwrap();
    assert_ne!(ok_id, failing_id);

    // Both apps share the pool, so either can poll both records.
    let ok_terminal = poll_until_terminal(&ok_app, ok_id).await;
    let failing_terminal = poll_until_terminal(&ok_app, failing_id).await;

    assert_eq!(ok_terminal["data"]["status"], "completed");
    assert_eq!(failing_terminal["data"]["status"], "failed");
}

// ---------------------------------------------------------------------------
// Catalog clothing: prompt comes from the seeded clothing_prompt
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn catalog_fitting_uses_the_seeded_prompt_and_body_attributes(pool: PgPool) {
    let output_url = spawn_image_server(Bytes::from_static(b"synthetic-jpeg")).await;

    let store = Arc::new(FakeStore::new());
    let provider = Arc::new(ScriptedProvider::succeeding(&output_url));
    let app = build_test_app(pool.clone(), store, provider.clone());

    let storage_key = "sample_clothes/female/wave/skirt/35.jpg";
    SampleClothingRepo::upsert(
        &pool,
        &CreateSampleClothing {
            storage_key: storage_key.to_string(),
            url: "https://objects.test/sample_clothes/female/wave/skirt/35.jpg".to_string(),
            name: "Pleated skirt".to_string(),
            category: "skirt".to_string(),
            color: Some("navy".to_string()),
            style: None,
            length: Some("mid".to_string()),
            gender: "female".to_string(),
            body_shape: Some("wave".to_string()),
            clothing_prompt: Some("navy pleated midi skirt".to_string()),
        },
    )
    .await
    .unwrap();

    let response = post_json(
        app.clone(),
        "/api/fitting/create",
        json!({
            "customerPhotoUrl": PHOTO_URL,
            "clothingRef": storage_key,
            "gender": "female",
            "bodyShape": "wave",
            "height": "160-165cm",
            "weight": "50-55kg",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let record_id = body_json(response).await["data"]["fittingRecordId"]
        .as_i64()
        .unwrap();

    let terminal = poll_until_terminal(&app, record_id).await;
    assert_eq!(terminal["data"]["status"], "completed");

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].prompt,
        "navy pleated midi skirt for woman, wave body shape, height 160-165cm, weight 50-55kg"
    );
    assert_eq!(
        calls[0].garment_image_url,
        "https://objects.test/sample_clothes/female/wave/skirt/35.jpg"
    );

    // Catalog usage counter was bumped.
    let row = SampleClothingRepo::find_by_key(&pool, storage_key)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.fitting_count, 1);
}

// ---------------------------------------------------------------------------
// Lazy customer creation and the (name, phone) merge key
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn repeat_submissions_reuse_the_customer_by_name_and_phone(pool: PgPool) {
    let output_url = spawn_image_server(Bytes::from_static(b"synthetic-jpeg")).await;

    let store = Arc::new(FakeStore::new());
    let provider = Arc::new(ScriptedProvider::succeeding(&output_url));
    let app = build_test_app(pool.clone(), store, provider);

    let item_id = seed_clothing_item(&pool).await;
    let submit = |app: axum::Router| {
        post_json(
            app,
            "/api/fitting/create",
            json!({
                "customerPhotoUrl": PHOTO_URL,
                "clothingItemId": item_id.to_string(),
                "name": "Jane",
                "phone": "010-1234-5678",
            }),
        )
    };

    let first = body_json(submit(app.clone()).await).await;
    let first_id = first["data"]["fittingRecordId"].as_i64().unwrap();
    poll_until_terminal(&app, first_id).await;

    let second = body_json(submit(app.clone()).await).await;
    let second_id = second["data"]["fittingRecordId"].as_i64().unwrap();
    poll_until_terminal(&app, second_id).await;

    let customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(customers, 1, "same name and phone must map to one customer");

    // Both records show up in that customer's history, newest first.
    let customer_id: i64 = sqlx::query_scalar("SELECT id FROM customers")
        .fetch_one(&pool)
        .await
        .unwrap();
    let history = get_req(app, &format!("/api/fitting/history/{customer_id}")).await;
    assert_eq!(history.status(), StatusCode::OK);
    let history_json = body_json(history).await;
    let records = history_json["data"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"].as_i64().unwrap(), second_id);
    assert_eq!(records[1]["id"].as_i64().unwrap(), first_id);
}
