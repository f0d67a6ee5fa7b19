//! Read-only endpoints for the nine sub-record types.
//!
//! Mutations go through the metadata aggregate; these routes only expose
//! ownership-scoped listing and retrieval.

use axum::{
    extract::{Extension, Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::middleware::auth::AuthExtension;
use crate::api::SharedState;
use crate::error::Result;
use crate::models::contact::MetadataContact;
use crate::models::distribution::Distribution;
use crate::models::identification::{
    IdentificationInfo, PointOfContact, ResourceConstraints, TemporalExtent,
};
use crate::models::lineage::ResourceLineage;
use crate::models::quality::DataQuality;
use crate::models::reference_system::ReferenceSystem;
use crate::services::access::RequestContext;
use crate::services::record_service::RecordService;

/// Create the sub-record read routes
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/identification", get(list_identification))
        .route("/identification/:id", get(get_identification))
        .route("/contacts", get(list_points_of_contact))
        .route("/contacts/:id", get(get_point_of_contact))
        .route("/constraints", get(list_constraints))
        .route("/constraints/:id", get(get_constraints))
        .route("/temporal-extents", get(list_temporal_extents))
        .route("/temporal-extents/:id", get(get_temporal_extent))
        .route("/distributions", get(list_distributions))
        .route("/distributions/:id", get(get_distribution))
        .route("/lineages", get(list_lineages))
        .route("/lineages/:id", get(get_lineage))
        .route("/reference-systems", get(list_reference_systems))
        .route("/reference-systems/:id", get(get_reference_system))
        .route("/metadata-contacts", get(list_metadata_contacts))
        .route("/metadata-contacts/:id", get(get_metadata_contact))
        .route("/quality", get(list_quality))
        .route("/quality/:id", get(get_quality))
}

async fn list_identification(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<IdentificationInfo>>> {
    let ctx = RequestContext::from(&auth);
    let items = RecordService::new(state.db.clone()).list_identification(&ctx).await?;
    Ok(Json(items))
}

async fn get_identification(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<IdentificationInfo>> {
    let ctx = RequestContext::from(&auth);
    let item = RecordService::new(state.db.clone()).get_identification(&ctx, id).await?;
    Ok(Json(item))
}

async fn list_points_of_contact(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<PointOfContact>>> {
    let ctx = RequestContext::from(&auth);
    let items = RecordService::new(state.db.clone()).list_points_of_contact(&ctx).await?;
    Ok(Json(items))
}

async fn get_point_of_contact(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<PointOfContact>> {
    let ctx = RequestContext::from(&auth);
    let item = RecordService::new(state.db.clone()).get_point_of_contact(&ctx, id).await?;
    Ok(Json(item))
}

async fn list_constraints(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<ResourceConstraints>>> {
    let ctx = RequestContext::from(&auth);
    let items = RecordService::new(state.db.clone()).list_constraints(&ctx).await?;
    Ok(Json(items))
}

async fn get_constraints(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceConstraints>> {
    let ctx = RequestContext::from(&auth);
    let item = RecordService::new(state.db.clone()).get_constraints(&ctx, id).await?;
    Ok(Json(item))
}

async fn list_temporal_extents(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<TemporalExtent>>> {
    let ctx = RequestContext::from(&auth);
    let items = RecordService::new(state.db.clone()).list_temporal_extents(&ctx).await?;
    Ok(Json(items))
}

async fn get_temporal_extent(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<TemporalExtent>> {
    let ctx = RequestContext::from(&auth);
    let item = RecordService::new(state.db.clone()).get_temporal_extent(&ctx, id).await?;
    Ok(Json(item))
}

async fn list_distributions(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<Distribution>>> {
    let ctx = RequestContext::from(&auth);
    let items = RecordService::new(state.db.clone()).list_distributions(&ctx).await?;
    Ok(Json(items))
}

async fn get_distribution(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<Distribution>> {
    let ctx = RequestContext::from(&auth);
    let item = RecordService::new(state.db.clone()).get_distribution(&ctx, id).await?;
    Ok(Json(item))
}

async fn list_lineages(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<ResourceLineage>>> {
    let ctx = RequestContext::from(&auth);
    let items = RecordService::new(state.db.clone()).list_lineages(&ctx).await?;
    Ok(Json(items))
}

async fn get_lineage(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResourceLineage>> {
    let ctx = RequestContext::from(&auth);
    let item = RecordService::new(state.db.clone()).get_lineage(&ctx, id).await?;
    Ok(Json(item))
}

async fn list_reference_systems(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<ReferenceSystem>>> {
    let ctx = RequestContext::from(&auth);
    let items = RecordService::new(state.db.clone()).list_reference_systems(&ctx).await?;
    Ok(Json(items))
}

async fn get_reference_system(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReferenceSystem>> {
    let ctx = RequestContext::from(&auth);
    let item = RecordService::new(state.db.clone()).get_reference_system(&ctx, id).await?;
    Ok(Json(item))
}

async fn list_metadata_contacts(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<MetadataContact>>> {
    let ctx = RequestContext::from(&auth);
    let items = RecordService::new(state.db.clone()).list_metadata_contacts(&ctx).await?;
    Ok(Json(items))
}

async fn get_metadata_contact(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<MetadataContact>> {
    let ctx = RequestContext::from(&auth);
    let item = RecordService::new(state.db.clone()).get_metadata_contact(&ctx, id).await?;
    Ok(Json(item))
}

async fn list_quality(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<Vec<DataQuality>>> {
    let ctx = RequestContext::from(&auth);
    let items = RecordService::new(state.db.clone()).list_quality(&ctx).await?;
    Ok(Json(items))
}

async fn get_quality(
    State(state): State<SharedState>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<Uuid>,
) -> Result<Json<DataQuality>> {
    let ctx = RequestContext::from(&auth);
    let item = RecordService::new(state.db.clone()).get_quality(&ctx, id).await?;
    Ok(Json(item))
}
