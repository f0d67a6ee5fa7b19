//! Integration tests for the bulk variants: per-item validation on create,
//! single-transaction update, and ownership-scoped delete counts.

mod common;

use common::{fixtures, spawn_app};
use serde_json::{json, Value};

#[tokio::test]
async fn bulk_create_returns_every_aggregate_with_owner_set() {
    let app = spawn_app().await;
    let (user_id, token) = app.signup("owner@example.com", "USER").await;

    let response = app
        .client
        .post(app.url("/api/v1/metadata/bulk_create"))
        .bearer_auth(&token)
        .json(&json!([
            { "status": "DRAFT", "metadata_standard": "ISO 19115" },
            { "status": "DRAFT", "metadata_standard": "ISO 19115-2" }
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    let created = body.as_array().unwrap();
    assert_eq!(created.len(), 2);
    for item in created {
        assert_eq!(item["user_id"], user_id.to_string());
        assert_eq!(item["status"], "DRAFT");
    }
}

#[tokio::test]
async fn bulk_create_validation_errors_are_keyed_by_item_index() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let response = app
        .client
        .post(app.url("/api/v1/metadata/bulk_create"))
        .bearer_auth(&token)
        .json(&json!([
            { "status": "DRAFT" },
            { "status": "RETIRED" }
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"]["1.status"].is_array());

    // Nothing at all was created.
    assert_eq!(app.count_rows("metadata").await, 0);
}

#[tokio::test]
async fn bulk_update_applies_all_items() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let first = app
        .create_metadata(&token, &fixtures::minimal_metadata_payload())
        .await;
    let second = app
        .create_metadata(&token, &fixtures::minimal_metadata_payload())
        .await;

    let response = app
        .client
        .post(app.url("/api/v1/metadata/bulk_update"))
        .bearer_auth(&token)
        .json(&json!([
            { "id": first["id"], "status": "PUBLISHED" },
            { "id": second["id"], "status": "PUBLISHED" }
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    for item in body.as_array().unwrap() {
        assert_eq!(item["status"], "PUBLISHED");
    }
}

#[tokio::test]
async fn bulk_update_is_transactional() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let record = app
        .create_metadata(&token, &fixtures::minimal_metadata_payload())
        .await;

    // The second item references a record that does not exist, so the whole
    // batch rolls back.
    let response = app
        .client
        .post(app.url("/api/v1/metadata/bulk_update"))
        .bearer_auth(&token)
        .json(&json!([
            { "id": record["id"], "status": "PUBLISHED" },
            { "id": "00000000-0000-0000-0000-000000000042", "status": "PUBLISHED" }
        ]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let fetched: Value = app
        .get_metadata(&token, record["id"].as_str().unwrap())
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["status"], "DRAFT");
}

#[tokio::test]
async fn bulk_delete_reports_count_and_removes_aggregates() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let first = app
        .create_metadata(&token, &fixtures::minimal_metadata_payload())
        .await;
    let second = app
        .create_metadata(&token, &fixtures::full_metadata_payload())
        .await;

    let response = app
        .client
        .post(app.url("/api/v1/metadata/bulk_delete"))
        .bearer_auth(&token)
        .json(&json!({ "ids": [first["id"], second["id"]] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "deleted_count": 2 }));

    for id in [first["id"].as_str().unwrap(), second["id"].as_str().unwrap()] {
        assert_eq!(app.get_metadata(&token, id).await.status(), 404);
    }
    assert_eq!(app.count_rows("identification_info").await, 0);
}

#[tokio::test]
async fn bulk_delete_skips_foreign_and_unknown_ids() {
    let app = spawn_app().await;
    let (_, alice) = app.signup("alice@example.com", "USER").await;
    let (_, bob) = app.signup("bob@example.com", "USER").await;

    let alices = app
        .create_metadata(&alice, &fixtures::minimal_metadata_payload())
        .await;

    let response = app
        .client
        .post(app.url("/api/v1/metadata/bulk_delete"))
        .bearer_auth(&bob)
        .json(&json!({ "ids": [alices["id"], "00000000-0000-0000-0000-000000000042"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "deleted_count": 0 }));

    // Alice's record survived.
    assert_eq!(
        app.get_metadata(&alice, alices["id"].as_str().unwrap())
            .await
            .status(),
        200
    );
}
