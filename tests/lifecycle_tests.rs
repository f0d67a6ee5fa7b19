//! Integration tests for the status lifecycle: DRAFT → PUBLISHED → ARCHIVED
//! with guard violations on every other transition.

mod common;

use common::{fixtures, spawn_app, TestApp};
use serde_json::{json, Value};

async fn create_draft(app: &TestApp, token: &str) -> String {
    let body = app
        .create_metadata(token, &fixtures::minimal_metadata_payload())
        .await;
    body["id"].as_str().unwrap().to_string()
}

async fn transition(app: &TestApp, token: &str, id: &str, action: &str) -> reqwest::Response {
    app.client
        .post(app.url(&format!("/api/v1/metadata/{id}/{action}")))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
}

async fn status_of(app: &TestApp, token: &str, id: &str) -> String {
    let body: Value = app.get_metadata(token, id).await.json().await.unwrap();
    body["status"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn publish_moves_draft_to_published() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;
    let id = create_draft(&app, &token).await;

    let response = transition(&app, &token, &id, "publish").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "metadata published" }));
    assert_eq!(status_of(&app, &token, &id).await, "PUBLISHED");
}

#[tokio::test]
async fn second_publish_is_a_guard_violation() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;
    let id = create_draft(&app, &token).await;

    assert_eq!(transition(&app, &token, &id, "publish").await.status(), 200);

    let response = transition(&app, &token, &id, "publish").await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Can only publish draft metadata" }));
    // state unchanged
    assert_eq!(status_of(&app, &token, &id).await, "PUBLISHED");
}

#[tokio::test]
async fn archive_requires_published() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;
    let id = create_draft(&app, &token).await;

    // Draft cannot be archived.
    let response = transition(&app, &token, &id, "archive").await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Can only archive published metadata" }));
    assert_eq!(status_of(&app, &token, &id).await, "DRAFT");

    // Published can.
    assert_eq!(transition(&app, &token, &id, "publish").await.status(), 200);
    let response = transition(&app, &token, &id, "archive").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "metadata archived" }));
    assert_eq!(status_of(&app, &token, &id).await, "ARCHIVED");
}

#[tokio::test]
async fn archived_records_accept_no_further_transitions() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;
    let id = create_draft(&app, &token).await;

    assert_eq!(transition(&app, &token, &id, "publish").await.status(), 200);
    assert_eq!(transition(&app, &token, &id, "archive").await.status(), 200);

    assert_eq!(transition(&app, &token, &id, "publish").await.status(), 400);
    assert_eq!(transition(&app, &token, &id, "archive").await.status(), 400);
    assert_eq!(status_of(&app, &token, &id).await, "ARCHIVED");
}

#[tokio::test]
async fn transitions_do_not_touch_sub_records() {
    let app = spawn_app().await;
    let (_, token) = app.signup("owner@example.com", "USER").await;
    let body = app
        .create_metadata(&token, &fixtures::full_metadata_payload())
        .await;
    let id = body["id"].as_str().unwrap().to_string();

    assert_eq!(transition(&app, &token, &id, "publish").await.status(), 200);

    let fetched: Value = app.get_metadata(&token, &id).await.json().await.unwrap();
    assert_eq!(fetched["status"], "PUBLISHED");
    assert_eq!(
        fetched["identification"]["title"],
        body["identification"]["title"]
    );
    assert_eq!(fetched["distribution"], body["distribution"]);
}
