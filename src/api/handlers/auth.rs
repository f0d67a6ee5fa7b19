//! Authentication handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::user::User;
use crate::services::access::RequestContext;
use crate::services::auth_service::AuthService;
use crate::services::user_service::UserService;

/// Routes that do not require an authenticated caller
pub fn public_router() -> Router<SharedState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
}

/// Routes that require an authenticated caller
pub fn protected_router() -> Router<SharedState> {
    Router::new().route("/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: User,
}

/// Log in with email and password, receiving a token pair
async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let auth_service = AuthService::new(state.db.clone(), Arc::new(state.config.clone()));
    let (user, tokens) = auth_service
        .authenticate(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user,
    }))
}

/// Exchange a refresh token for a fresh token pair
async fn refresh(
    State(state): State<SharedState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<LoginResponse>> {
    let auth_service = AuthService::new(state.db.clone(), Arc::new(state.config.clone()));
    let (user, tokens) = auth_service.refresh_tokens(&payload.refresh_token).await?;

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        user,
    }))
}

/// Return the authenticated user's own record
async fn me(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<User>> {
    let ctx = RequestContext::from(&auth);
    let user = UserService::new(state.db.clone()).get(&ctx, auth.user_id).await?;
    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_deserialization() {
        let json = r#"{"email": "analyst@example.com", "password": "hunter22hunter22"}"#;
        let req: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.email, "analyst@example.com");
    }

    #[test]
    fn test_login_request_rejects_missing_password() {
        let json = r#"{"email": "analyst@example.com"}"#;
        assert!(serde_json::from_str::<LoginRequest>(json).is_err());
    }
}
