//! Integration tests for authentication and user management.

mod common;

use common::{spawn_app, TEST_PASSWORD};
use serde_json::{json, Value};

#[tokio::test]
async fn login_returns_token_pair_and_user() {
    let app = spawn_app().await;
    let (user_id, _) = app.signup("analyst@example.com", "USER").await;

    let response = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": "analyst@example.com", "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["access_token"].as_str().is_some());
    assert!(body["refresh_token"].as_str().is_some());
    assert_eq!(body["user"]["id"], user_id.to_string());
    // password hashes never leave the server
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let app = spawn_app().await;
    app.create_user("analyst@example.com", "USER").await;

    let response = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": "analyst@example.com", "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn refresh_token_exchanges_for_new_pair() {
    let app = spawn_app().await;
    app.create_user("analyst@example.com", "USER").await;

    let login: Value = app
        .client
        .post(app.url("/api/v1/auth/login"))
        .json(&json!({ "email": "analyst@example.com", "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let response = app
        .client
        .post(app.url("/api/v1/auth/refresh"))
        .json(&json!({ "refresh_token": login["refresh_token"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(body["access_token"].as_str().is_some());
}

#[tokio::test]
async fn refresh_rejects_access_token() {
    let app = spawn_app().await;
    let (_, token) = app.signup("analyst@example.com", "USER").await;

    let response = app
        .client
        .post(app.url("/api/v1/auth/refresh"))
        .json(&json!({ "refresh_token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn me_returns_the_authenticated_user() {
    let app = spawn_app().await;
    let (user_id, token) = app.signup("analyst@example.com", "USER").await;

    let response = app
        .client
        .get(app.url("/api/v1/auth/me"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], user_id.to_string());
    assert_eq!(body["email"], "analyst@example.com");
}

#[tokio::test]
async fn usernames_derive_from_email_and_uniquify() {
    let app = spawn_app().await;
    let (_, admin) = app.signup("root@example.com", "ADMIN").await;

    let first: Value = app
        .client
        .post(app.url("/api/v1/users"))
        .bearer_auth(&admin)
        .json(&json!({ "email": "alice@example.com", "name": "Alice One" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = app
        .client
        .post(app.url("/api/v1/users"))
        .bearer_auth(&admin)
        .json(&json!({ "email": "alice@other.org", "name": "Alice Two" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first["username"], "alice");
    assert_eq!(second["username"], "alice1");
}

#[tokio::test]
async fn user_updates_are_scoped() {
    let app = spawn_app().await;
    let (alice_id, alice) = app.signup("alice@example.com", "USER").await;
    let (bob_id, bob) = app.signup("bob@example.com", "USER").await;

    // Bob cannot touch Alice's account; the id reads as missing.
    let response = app
        .client
        .patch(app.url(&format!("/api/v1/users/{alice_id}")))
        .bearer_auth(&bob)
        .json(&json!({ "name": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Users can update themselves.
    let response = app
        .client
        .patch(app.url(&format!("/api/v1/users/{bob_id}")))
        .bearer_auth(&bob)
        .json(&json!({ "organization": "New Org" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["organization"], "New Org");
    // untouched fields survive the partial update
    assert_eq!(body["name"], "Test User");
}

#[tokio::test]
async fn deleting_a_user_removes_their_aggregates() {
    let app = spawn_app().await;
    let (alice_id, alice) = app.signup("alice@example.com", "USER").await;
    let (_, admin) = app.signup("root@example.com", "ADMIN").await;

    app.create_metadata(&alice, &common::fixtures::full_metadata_payload())
        .await;

    let response = app
        .client
        .delete(app.url(&format!("/api/v1/users/{alice_id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    assert_eq!(app.count_rows("metadata").await, 0);
    assert_eq!(app.count_rows("identification_info").await, 0);
    assert_eq!(app.count_rows("point_of_contact").await, 0);
}

#[tokio::test]
async fn invalid_role_on_user_create_is_rejected() {
    let app = spawn_app().await;
    let (_, admin) = app.signup("root@example.com", "ADMIN").await;

    let response = app
        .client
        .post(app.url("/api/v1/users"))
        .bearer_auth(&admin)
        .json(&json!({ "email": "eve@example.com", "name": "Eve", "role": "SUPERUSER" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"]["role"].is_array());
}
