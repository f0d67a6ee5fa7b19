//! User management handlers.

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::user::User;
use crate::services::access::RequestContext;
use crate::services::user_service::{CreateUserRequest, UpdateUserRequest, UserService};

/// Create user routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

/// List users visible to the requester
async fn list_users(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<User>>> {
    let ctx = RequestContext::from(&auth);
    let users = UserService::new(state.db.clone()).list(&ctx).await?;
    Ok(Json(users))
}

/// Create a user
async fn create_user(
    State(state): State<SharedState>,
    Extension(_auth): Extension<AuthExtension>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = UserService::new(state.db.clone()).create(&payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Fetch a single user
async fn get_user(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>> {
    let ctx = RequestContext::from(&auth);
    let user = UserService::new(state.db.clone()).get(&ctx, id).await?;
    Ok(Json(user))
}

/// Partially update a user
async fn update_user(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>> {
    let ctx = RequestContext::from(&auth);
    let user = UserService::new(state.db.clone())
        .update(&ctx, id, &payload)
        .await?;
    Ok(Json(user))
}

/// Delete a user
async fn delete_user(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let ctx = RequestContext::from(&auth);
    UserService::new(state.db.clone()).delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
