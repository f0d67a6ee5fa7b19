//! Integration tests for the validation rules: every failing rule surfaces
//! in one aggregated field-keyed error map, and nothing is persisted.

mod common;

use chrono::{Duration, Utc};
use common::{fixtures, spawn_app};
use serde_json::{json, Value};

async fn create_expecting_errors(
    app: &common::TestApp,
    token: &str,
    payload: &Value,
) -> Value {
    let response = app.post_metadata(token, payload).await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    body["errors"].clone()
}

#[tokio::test]
async fn short_title_is_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let mut identification = fixtures::identification_payload();
    identification["title"] = json!("AB");
    let errors = create_expecting_errors(
        &app,
        &token,
        &json!({ "status": "DRAFT", "identification": identification }),
    )
    .await;
    assert!(errors["identification.title"].is_array());

    // Nothing persisted.
    assert_eq!(app.count_rows("metadata").await, 0);
    assert_eq!(app.count_rows("identification_info").await, 0);
}

#[tokio::test]
async fn bounding_box_requires_all_four_keys() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let mut identification = fixtures::identification_payload();
    identification["geographic_bounding_box"] =
        json!({ "north": 90.0, "south": -90.0, "east": 180.0 });
    let errors =
        create_expecting_errors(&app, &token, &json!({ "identification": identification })).await;
    assert!(errors["identification.geographic_bounding_box"].is_array());
}

#[tokio::test]
async fn bounding_box_rejects_extra_keys() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let mut bbox = fixtures::bounding_box();
    bbox["altitude"] = json!(100.0);
    let mut identification = fixtures::identification_payload();
    identification["geographic_bounding_box"] = bbox;
    let errors =
        create_expecting_errors(&app, &token, &json!({ "identification": identification })).await;
    assert!(errors["identification.geographic_bounding_box"].is_array());
}

#[tokio::test]
async fn negative_hierarchy_level_is_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let errors = create_expecting_errors(
        &app,
        &token,
        &json!({ "lineage": { "statement": "Digitized from maps", "hierarchy_level": -3 } }),
    )
    .await;
    assert!(errors["lineage.hierarchy_level"].is_array());
}

#[tokio::test]
async fn invalid_status_is_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let errors = create_expecting_errors(&app, &token, &json!({ "status": "RETIRED" })).await;
    assert!(errors["status"].is_array());
}

#[tokio::test]
async fn invalid_contact_email_is_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let errors = create_expecting_errors(
        &app,
        &token,
        &json!({ "contact": {
            "name": "Records Office",
            "organization": "Geo Institute",
            "email": "not-an-email",
            "role": "publisher"
        }}),
    )
    .await;
    assert!(errors["contact.email"].is_array());
}

#[tokio::test]
async fn future_production_date_is_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let mut identification = fixtures::identification_payload();
    identification["production_date"] = json!((Utc::now() + Duration::days(30)).to_rfc3339());
    let errors =
        create_expecting_errors(&app, &token, &json!({ "identification": identification })).await;
    assert!(errors["identification.production_date"].is_array());
}

#[tokio::test]
async fn multiple_failures_are_reported_together() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let mut identification = fixtures::identification_payload();
    identification["title"] = json!("AB");
    identification["spatial_rep_type"] = json!("CUBE");
    let errors = create_expecting_errors(
        &app,
        &token,
        &json!({
            "status": "RETIRED",
            "character_set": "ebcdic",
            "identification": identification
        }),
    )
    .await;
    assert!(errors["status"].is_array());
    assert!(errors["character_set"].is_array());
    assert!(errors["identification.title"].is_array());
    assert!(errors["identification.spatial_rep_type"].is_array());
}

#[tokio::test]
async fn character_set_is_stored_lowercased() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let body = app
        .create_metadata(
            &token,
            &json!({ "language": "FR", "character_set": "ISO-8859-1" }),
        )
        .await;
    assert_eq!(body["language"], "fr");
    assert_eq!(body["character_set"], "iso-8859-1");
}

#[tokio::test]
async fn patch_validation_failure_aborts_whole_update() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;

    let created = app
        .create_metadata(&token, &fixtures::minimal_metadata_payload())
        .await;
    let id = created["id"].as_str().unwrap();

    // A valid root change alongside an invalid nested change: nothing lands.
    let response = app
        .client
        .patch(app.url(&format!("/api/v1/metadata/{id}")))
        .bearer_auth(&token)
        .json(&json!({
            "metadata_standard": "ISO 19115-2",
            "identification": { "title": "AB" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let fetched: Value = app.get_metadata(&token, id).await.json().await.unwrap();
    assert_eq!(fetched["metadata_standard"], "ISO 19115");
}

#[tokio::test]
async fn duplicate_user_email_is_a_field_error() {
    let app = spawn_app().await;
    let (_, admin) = app.signup("root@example.com", "ADMIN").await;

    let response = app
        .client
        .post(app.url("/api/v1/users"))
        .bearer_auth(&admin)
        .json(&json!({
            "email": "root@example.com",
            "name": "Impostor",
            "password": "irrelevant-pass"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"]["email"].is_array());
}
