//! Authentication middleware.
//!
//! Extracts and validates the `Authorization: Bearer <jwt>` header and
//! stashes the resolved identity as a request extension. Handlers turn the
//! extension into an explicit [`RequestContext`] before calling services.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::services::access::RequestContext;
use crate::services::auth_service::{AuthService, Claims};

/// Extension that holds authenticated user information
#[derive(Debug, Clone)]
pub struct AuthExtension {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub organization: Option<String>,
}

impl From<Claims> for AuthExtension {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            organization: claims.organization,
        }
    }
}

impl From<&AuthExtension> for RequestContext {
    fn from(auth: &AuthExtension) -> Self {
        RequestContext::new(auth.user_id, auth.role, auth.organization.clone())
    }
}

/// Token extraction result
#[derive(Debug)]
enum ExtractedToken<'a> {
    Bearer(&'a str),
    None,
    Invalid,
}

fn extract_token(request: &Request) -> ExtractedToken<'_> {
    match request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(auth_header) => match auth_header.strip_prefix("Bearer ") {
            Some(token) => ExtractedToken::Bearer(token),
            None => ExtractedToken::Invalid,
        },
        None => ExtractedToken::None,
    }
}

/// Authentication middleware function - requires a valid access token
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    match extract_token(&request) {
        ExtractedToken::Bearer(token) => match auth_service.validate_access_token(token) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthExtension::from(claims));
                next.run(request).await
            }
            Err(_) => (StatusCode::UNAUTHORIZED, "Invalid or expired token").into_response(),
        },
        ExtractedToken::None => {
            (StatusCode::UNAUTHORIZED, "Missing authorization header").into_response()
        }
        ExtractedToken::Invalid => {
            (StatusCode::UNAUTHORIZED, "Invalid authorization header format").into_response()
        }
    }
}
