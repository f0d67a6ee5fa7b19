//! Read-only access to the nine sub-record types.
//!
//! Sub-records mutate only through the aggregate update path; these queries
//! expose them for listing and retrieval. Every query joins up the entity's
//! ownership chain (directly, via its metadata root, or via identification →
//! metadata) and applies the one ownership predicate from
//! [`RequestContext::owner_filter`], so an out-of-scope row reads as missing.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::contact::MetadataContact;
use crate::models::distribution::Distribution;
use crate::models::identification::{
    IdentificationInfo, PointOfContact, ResourceConstraints, TemporalExtent,
};
use crate::models::lineage::ResourceLineage;
use crate::models::quality::DataQuality;
use crate::models::reference_system::ReferenceSystem;
use crate::services::access::RequestContext;

/// Ownership joins for entities hanging directly off the metadata root.
const VIA_METADATA: &str = "JOIN metadata m ON m.id = e.metadata_id";
/// Ownership joins for entities hanging off identification info.
const VIA_IDENTIFICATION: &str = "JOIN identification_info i ON i.id = e.identification_info_id \
                                  JOIN metadata m ON m.id = i.metadata_id";

/// Scoped read service for sub-records
pub struct RecordService {
    db: SqlitePool,
}

impl RecordService {
    /// Create a new record service
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn list_scoped<T>(&self, ctx: &RequestContext, table: &str, joins: &str) -> Result<Vec<T>>
    where
        T: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        let sql = format!(
            "SELECT e.* FROM {table} e {joins} \
             WHERE (?1 IS NULL OR m.user_id = ?1) \
             ORDER BY e.created_at DESC"
        );
        let rows = sqlx::query_as::<_, T>(&sql)
            .bind(ctx.owner_filter())
            .fetch_all(&self.db)
            .await?;
        Ok(rows)
    }

    async fn get_scoped<T>(
        &self,
        ctx: &RequestContext,
        table: &str,
        joins: &str,
        id: Uuid,
        entity: &str,
    ) -> Result<T>
    where
        T: Send + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        let sql = format!(
            "SELECT e.* FROM {table} e {joins} \
             WHERE e.id = ?1 AND (?2 IS NULL OR m.user_id = ?2)"
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .bind(ctx.owner_filter())
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{entity} not found")))
    }

    pub async fn list_identification(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<IdentificationInfo>> {
        self.list_scoped(ctx, "identification_info", VIA_METADATA).await
    }

    pub async fn get_identification(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<IdentificationInfo> {
        self.get_scoped(ctx, "identification_info", VIA_METADATA, id, "Identification info")
            .await
    }

    pub async fn list_points_of_contact(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<PointOfContact>> {
        self.list_scoped(ctx, "point_of_contact", VIA_IDENTIFICATION).await
    }

    pub async fn get_point_of_contact(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<PointOfContact> {
        self.get_scoped(ctx, "point_of_contact", VIA_IDENTIFICATION, id, "Point of contact")
            .await
    }

    pub async fn list_constraints(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ResourceConstraints>> {
        self.list_scoped(ctx, "resource_constraints", VIA_IDENTIFICATION).await
    }

    pub async fn get_constraints(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<ResourceConstraints> {
        self.get_scoped(
            ctx,
            "resource_constraints",
            VIA_IDENTIFICATION,
            id,
            "Resource constraints",
        )
        .await
    }

    pub async fn list_temporal_extents(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<TemporalExtent>> {
        self.list_scoped(ctx, "temporal_extent", VIA_IDENTIFICATION).await
    }

    pub async fn get_temporal_extent(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<TemporalExtent> {
        self.get_scoped(ctx, "temporal_extent", VIA_IDENTIFICATION, id, "Temporal extent")
            .await
    }

    pub async fn list_distributions(&self, ctx: &RequestContext) -> Result<Vec<Distribution>> {
        self.list_scoped(ctx, "distribution", VIA_METADATA).await
    }

    pub async fn get_distribution(&self, ctx: &RequestContext, id: Uuid) -> Result<Distribution> {
        self.get_scoped(ctx, "distribution", VIA_METADATA, id, "Distribution").await
    }

    pub async fn list_lineages(&self, ctx: &RequestContext) -> Result<Vec<ResourceLineage>> {
        self.list_scoped(ctx, "resource_lineage", VIA_METADATA).await
    }

    pub async fn get_lineage(&self, ctx: &RequestContext, id: Uuid) -> Result<ResourceLineage> {
        self.get_scoped(ctx, "resource_lineage", VIA_METADATA, id, "Resource lineage")
            .await
    }

    pub async fn list_reference_systems(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<ReferenceSystem>> {
        self.list_scoped(ctx, "reference_system", VIA_METADATA).await
    }

    pub async fn get_reference_system(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<ReferenceSystem> {
        self.get_scoped(ctx, "reference_system", VIA_METADATA, id, "Reference system")
            .await
    }

    pub async fn list_metadata_contacts(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<MetadataContact>> {
        self.list_scoped(ctx, "metadata_contact", VIA_METADATA).await
    }

    pub async fn get_metadata_contact(
        &self,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<MetadataContact> {
        self.get_scoped(ctx, "metadata_contact", VIA_METADATA, id, "Metadata contact")
            .await
    }

    pub async fn list_quality(&self, ctx: &RequestContext) -> Result<Vec<DataQuality>> {
        self.list_scoped(ctx, "data_quality", VIA_METADATA).await
    }

    pub async fn get_quality(&self, ctx: &RequestContext, id: Uuid) -> Result<DataQuality> {
        self.get_scoped(ctx, "data_quality", VIA_METADATA, id, "Data quality").await
    }
}
