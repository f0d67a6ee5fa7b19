//! Metadata aggregate handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::dto::{
    BulkDeleteRequest, BulkDeleteResponse, MetadataBulkUpdateItem, MetadataDetail,
    MetadataListQuery, MetadataPatch, MetadataPayload,
};
use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::Result;
use crate::services::access::RequestContext;
use crate::services::metadata_service::MetadataService;

/// Create metadata routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_metadata).post(create_metadata))
        .route("/bulk_create", post(bulk_create))
        .route("/bulk_update", post(bulk_update))
        .route("/bulk_delete", post(bulk_delete))
        .route(
            "/:id",
            get(get_metadata).patch(update_metadata).delete(delete_metadata),
        )
        .route("/:id/publish", post(publish_metadata))
        .route("/:id/archive", post(archive_metadata))
}

/// List visible metadata aggregates with optional status / date-range filters
async fn list_metadata(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Query(query): Query<MetadataListQuery>,
) -> Result<Json<Vec<MetadataDetail>>> {
    let ctx = RequestContext::from(&auth);
    let items = MetadataService::new(state.db.clone()).list(&ctx, &query).await?;
    Ok(Json(items))
}

/// Create a metadata aggregate owned by the requester
async fn create_metadata(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Json(payload): Json<MetadataPayload>,
) -> Result<(StatusCode, Json<MetadataDetail>)> {
    let ctx = RequestContext::from(&auth);
    let detail = MetadataService::new(state.db.clone())
        .create(&ctx, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Fetch one aggregate
async fn get_metadata(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<MetadataDetail>> {
    let ctx = RequestContext::from(&auth);
    let detail = MetadataService::new(state.db.clone()).get(&ctx, id).await?;
    Ok(Json(detail))
}

/// Partially update an aggregate (nested blocks upsert)
async fn update_metadata(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
    Json(patch): Json<MetadataPatch>,
) -> Result<Json<MetadataDetail>> {
    let ctx = RequestContext::from(&auth);
    let detail = MetadataService::new(state.db.clone())
        .update(&ctx, id, &patch)
        .await?;
    Ok(Json(detail))
}

/// Delete an aggregate and all of its sub-records
async fn delete_metadata(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let ctx = RequestContext::from(&auth);
    MetadataService::new(state.db.clone()).delete(&ctx, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Publish a draft record
async fn publish_metadata(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let ctx = RequestContext::from(&auth);
    MetadataService::new(state.db.clone()).publish(&ctx, id).await?;
    Ok(Json(json!({ "status": "metadata published" })))
}

/// Archive a published record
async fn archive_metadata(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let ctx = RequestContext::from(&auth);
    MetadataService::new(state.db.clone()).archive(&ctx, id).await?;
    Ok(Json(json!({ "status": "metadata archived" })))
}

/// Create several aggregates in one call
async fn bulk_create(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Json(payloads): Json<Vec<MetadataPayload>>,
) -> Result<(StatusCode, Json<Vec<MetadataDetail>>)> {
    let ctx = RequestContext::from(&auth);
    let created = MetadataService::new(state.db.clone())
        .bulk_create(&ctx, &payloads)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Apply several partial updates in one transaction
async fn bulk_update(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Json(items): Json<Vec<MetadataBulkUpdateItem>>,
) -> Result<Json<Vec<MetadataDetail>>> {
    let ctx = RequestContext::from(&auth);
    let updated = MetadataService::new(state.db.clone())
        .bulk_update(&ctx, &items)
        .await?;
    Ok(Json(updated))
}

/// Delete the visible subset of the given ids
async fn bulk_delete(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Json(payload): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>> {
    let ctx = RequestContext::from(&auth);
    let deleted_count = MetadataService::new(state.db.clone())
        .bulk_delete(&ctx, &payload.ids)
        .await?;
    Ok(Json(BulkDeleteResponse { deleted_count }))
}
