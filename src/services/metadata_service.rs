//! Metadata aggregate service.
//!
//! Implements the aggregate persistence protocol: a metadata root and its
//! nested sub-records are created, merged, and deleted as one unit inside a
//! single transaction. Also hosts the lifecycle transitions (publish /
//! archive) and the bulk variants of the aggregate operations.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::api::dto::{
    ConstraintsPatch, ConstraintsPayload, DataQualityPatch, DataQualityPayload, DistributionPatch,
    DistributionPayload, IdentificationDetail, IdentificationPatch, IdentificationPayload,
    LineagePatch, LineagePayload, MetadataBulkUpdateItem, MetadataContactPatch,
    MetadataContactPayload, MetadataDetail, MetadataListQuery, MetadataPatch, MetadataPayload,
    PointOfContactPatch, PointOfContactPayload, ReferenceSystemPatch, ReferenceSystemPayload,
    TemporalExtentPatch, TemporalExtentPayload,
};
use crate::error::{AppError, FieldErrors, Result};
use crate::models::contact::MetadataContact;
use crate::models::distribution::Distribution;
use crate::models::identification::{
    IdentificationInfo, PointOfContact, ResourceConstraints, TemporalExtent,
};
use crate::models::lineage::ResourceLineage;
use crate::models::metadata::{Metadata, MetadataStatus};
use crate::models::quality::DataQuality;
use crate::models::reference_system::ReferenceSystem;
use crate::services::access::RequestContext;
use crate::services::validation;

/// Metadata aggregate service
pub struct MetadataService {
    db: SqlitePool,
}

impl MetadataService {
    /// Create a new metadata service
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a metadata aggregate owned by the requester.
    ///
    /// The owner is always `ctx.user_id`; any owner field a client smuggles
    /// into the payload is not part of the schema and is dropped on
    /// deserialization. Root and all supplied sub-records commit together.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        payload: &MetadataPayload,
    ) -> Result<MetadataDetail> {
        validation::validate_metadata_payload(payload)?;

        let mut tx = self.db.begin().await?;
        let detail = Self::create_in_tx(&mut tx, ctx, payload).await?;
        tx.commit().await?;

        tracing::info!(metadata_id = %detail.record.id, user_id = %ctx.user_id, "Metadata aggregate created");
        Ok(detail)
    }

    /// Fetch one aggregate from the requester's visible set.
    pub async fn get(&self, ctx: &RequestContext, id: Uuid) -> Result<MetadataDetail> {
        let mut conn = self.db.acquire().await?;
        let record = Self::fetch_root_scoped(&mut conn, ctx, id).await?;
        Self::load_detail(&mut conn, record).await
    }

    /// List visible aggregates, newest first. The date range filters on
    /// `created_at` and applies only when both bounds are present.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        query: &MetadataListQuery,
    ) -> Result<Vec<MetadataDetail>> {
        let mut conn = self.db.acquire().await?;
        let records = sqlx::query_as::<_, Metadata>(
            "SELECT * FROM metadata \
             WHERE (?1 IS NULL OR user_id = ?1) \
               AND (?2 IS NULL OR status = ?2) \
               AND (?3 IS NULL OR ?4 IS NULL OR created_at BETWEEN ?3 AND ?4) \
             ORDER BY created_at DESC",
        )
        .bind(ctx.owner_filter())
        .bind(query.status.clone())
        .bind(query.start_date)
        .bind(query.end_date)
        .fetch_all(&mut *conn)
        .await?;

        let mut details = Vec::with_capacity(records.len());
        for record in records {
            details.push(Self::load_detail(&mut conn, record).await?);
        }
        Ok(details)
    }

    /// Partially update an aggregate: fields present in the patch overwrite
    /// stored values, absent fields stay untouched, and nested blocks upsert
    /// their sub-record. The whole merge is one transaction.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        patch: &MetadataPatch,
    ) -> Result<MetadataDetail> {
        validation::validate_metadata_patch(patch)?;

        let mut tx = self.db.begin().await?;
        let detail = Self::update_in_tx(&mut tx, ctx, id, patch).await?;
        tx.commit().await?;
        Ok(detail)
    }

    /// Delete an aggregate and every nested sub-record. The cascade is an
    /// explicit ordered routine (grandchildren, children, root) in one
    /// transaction; there is no soft delete.
    pub async fn delete(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        let mut tx = self.db.begin().await?;
        let record = Self::fetch_root_scoped(&mut tx, ctx, id).await?;
        Self::delete_aggregate(&mut tx, record.id).await?;
        tx.commit().await?;

        tracing::info!(metadata_id = %id, "Metadata aggregate deleted");
        Ok(())
    }

    /// Publish a draft record. Guard: only DRAFT may be published.
    pub async fn publish(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        let mut conn = self.db.acquire().await?;
        let record = Self::fetch_root_scoped(&mut conn, ctx, id).await?;
        if record.status != MetadataStatus::Draft {
            return Err(AppError::Guard("Can only publish draft metadata".into()));
        }
        Self::set_status(&mut conn, id, MetadataStatus::Published).await
    }

    /// Archive a published record. Guard: only PUBLISHED may be archived.
    pub async fn archive(&self, ctx: &RequestContext, id: Uuid) -> Result<()> {
        let mut conn = self.db.acquire().await?;
        let record = Self::fetch_root_scoped(&mut conn, ctx, id).await?;
        if record.status != MetadataStatus::Published {
            return Err(AppError::Guard("Can only archive published metadata".into()));
        }
        Self::set_status(&mut conn, id, MetadataStatus::Archived).await
    }

    /// Create several aggregates. Every payload is validated up front with
    /// errors keyed by item index; each aggregate then commits on its own,
    /// owner set to the requester exactly as in single create.
    pub async fn bulk_create(
        &self,
        ctx: &RequestContext,
        payloads: &[MetadataPayload],
    ) -> Result<Vec<MetadataDetail>> {
        let mut errors = FieldErrors::new();
        for (index, payload) in payloads.iter().enumerate() {
            if let Err(AppError::Validation(item_errors)) =
                validation::validate_metadata_payload(payload)
            {
                errors.merge_prefixed(&index.to_string(), item_errors);
            }
        }
        errors.into_result()?;

        let mut created = Vec::with_capacity(payloads.len());
        for payload in payloads {
            let mut tx = self.db.begin().await?;
            let detail = Self::create_in_tx(&mut tx, ctx, payload).await?;
            tx.commit().await?;
            created.push(detail);
        }
        Ok(created)
    }

    /// Apply several partial updates in one transaction: an invisible id or
    /// a failing item aborts the whole batch with nothing applied.
    pub async fn bulk_update(
        &self,
        ctx: &RequestContext,
        items: &[MetadataBulkUpdateItem],
    ) -> Result<Vec<MetadataDetail>> {
        let mut errors = FieldErrors::new();
        for (index, item) in items.iter().enumerate() {
            if let Err(AppError::Validation(item_errors)) =
                validation::validate_metadata_patch(&item.patch)
            {
                errors.merge_prefixed(&index.to_string(), item_errors);
            }
        }
        errors.into_result()?;

        let mut tx = self.db.begin().await?;
        let mut updated = Vec::with_capacity(items.len());
        for item in items {
            updated.push(Self::update_in_tx(&mut tx, ctx, item.id, &item.patch).await?);
        }
        tx.commit().await?;
        Ok(updated)
    }

    /// Delete the visible subset of the given ids, cascading each aggregate.
    /// Returns how many root records were removed; ids outside the visible
    /// set are skipped exactly like ids that never existed.
    pub async fn bulk_delete(&self, ctx: &RequestContext, ids: &[Uuid]) -> Result<u64> {
        let mut tx = self.db.begin().await?;
        let mut deleted = 0u64;
        for &id in ids {
            let visible = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM metadata WHERE id = ?1 AND (?2 IS NULL OR user_id = ?2)",
            )
            .bind(id)
            .bind(ctx.owner_filter())
            .fetch_one(&mut *tx)
            .await?;
            if visible > 0 {
                Self::delete_aggregate(&mut tx, id).await?;
                deleted += 1;
            }
        }
        tx.commit().await?;
        Ok(deleted)
    }

    // -----------------------------------------------------------------------
    // Root helpers
    // -----------------------------------------------------------------------

    /// Fetch a root record, applying the ownership predicate. An id outside
    /// the visible set is indistinguishable from a missing one.
    async fn fetch_root_scoped(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        id: Uuid,
    ) -> Result<Metadata> {
        sqlx::query_as::<_, Metadata>(
            "SELECT * FROM metadata WHERE id = ?1 AND (?2 IS NULL OR user_id = ?2)",
        )
        .bind(id)
        .bind(ctx.owner_filter())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Metadata record not found".into()))
    }

    async fn set_status(
        conn: &mut SqliteConnection,
        id: Uuid,
        status: MetadataStatus,
    ) -> Result<()> {
        sqlx::query("UPDATE metadata SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status.as_str())
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;
        tracing::info!(metadata_id = %id, status = status.as_str(), "Metadata status changed");
        Ok(())
    }

    async fn create_in_tx(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        payload: &MetadataPayload,
    ) -> Result<MetadataDetail> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let status = payload.status.clone().unwrap_or_else(|| "DRAFT".into());

        sqlx::query(
            "INSERT INTO metadata (id, status, user_id, metadata_linkage, metadata_standard, \
             language, character_set, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(id)
        .bind(status)
        .bind(ctx.user_id)
        .bind(payload.metadata_linkage.clone())
        .bind(payload.metadata_standard.clone())
        .bind(payload.language.as_ref().map(|v| v.to_lowercase()))
        .bind(payload.character_set.as_ref().map(|v| v.to_lowercase()))
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if let Some(identification) = &payload.identification {
            Self::insert_identification(conn, id, identification, now).await?;
        }
        if let Some(distribution) = &payload.distribution {
            Self::insert_distribution(conn, id, distribution, now).await?;
        }
        if let Some(lineage) = &payload.lineage {
            Self::insert_lineage(conn, id, lineage, now).await?;
        }
        if let Some(reference_system) = &payload.reference_system {
            Self::insert_reference_system(conn, id, reference_system, now).await?;
        }
        if let Some(contact) = &payload.contact {
            Self::insert_contact(conn, id, contact, now).await?;
        }
        if let Some(quality) = &payload.quality {
            Self::insert_quality(conn, id, quality, now).await?;
        }

        let record = sqlx::query_as::<_, Metadata>("SELECT * FROM metadata WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        Self::load_detail(conn, record).await
    }

    async fn update_in_tx(
        conn: &mut SqliteConnection,
        ctx: &RequestContext,
        id: Uuid,
        patch: &MetadataPatch,
    ) -> Result<MetadataDetail> {
        let record = Self::fetch_root_scoped(conn, ctx, id).await?;
        let now = Utc::now();

        sqlx::query(
            "UPDATE metadata SET \
             status = COALESCE(?2, status), \
             metadata_linkage = COALESCE(?3, metadata_linkage), \
             metadata_standard = COALESCE(?4, metadata_standard), \
             language = COALESCE(?5, language), \
             character_set = COALESCE(?6, character_set), \
             updated_at = ?7 \
             WHERE id = ?1",
        )
        .bind(record.id)
        .bind(patch.status.clone())
        .bind(patch.metadata_linkage.clone())
        .bind(patch.metadata_standard.clone())
        .bind(patch.language.as_ref().map(|v| v.to_lowercase()))
        .bind(patch.character_set.as_ref().map(|v| v.to_lowercase()))
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if let Some(identification) = &patch.identification {
            Self::upsert_identification(conn, record.id, identification, now).await?;
        }
        if let Some(distribution) = &patch.distribution {
            Self::upsert_distribution(conn, record.id, distribution, now).await?;
        }
        if let Some(lineage) = &patch.lineage {
            Self::upsert_lineage(conn, record.id, lineage, now).await?;
        }
        if let Some(reference_system) = &patch.reference_system {
            Self::upsert_reference_system(conn, record.id, reference_system, now).await?;
        }
        if let Some(contact) = &patch.contact {
            Self::upsert_contact(conn, record.id, contact, now).await?;
        }
        if let Some(quality) = &patch.quality {
            Self::upsert_quality(conn, record.id, quality, now).await?;
        }

        let record = sqlx::query_as::<_, Metadata>("SELECT * FROM metadata WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        Self::load_detail(conn, record).await
    }

    /// Remove every sub-record, then the root. Grandchildren go first so no
    /// orphan ever references a deleted parent.
    pub(crate) async fn delete_aggregate(conn: &mut SqliteConnection, id: Uuid) -> Result<()> {
        for sql in [
            "DELETE FROM point_of_contact WHERE identification_info_id IN \
             (SELECT id FROM identification_info WHERE metadata_id = ?1)",
            "DELETE FROM resource_constraints WHERE identification_info_id IN \
             (SELECT id FROM identification_info WHERE metadata_id = ?1)",
            "DELETE FROM temporal_extent WHERE identification_info_id IN \
             (SELECT id FROM identification_info WHERE metadata_id = ?1)",
            "DELETE FROM identification_info WHERE metadata_id = ?1",
            "DELETE FROM distribution WHERE metadata_id = ?1",
            "DELETE FROM resource_lineage WHERE metadata_id = ?1",
            "DELETE FROM reference_system WHERE metadata_id = ?1",
            "DELETE FROM metadata_contact WHERE metadata_id = ?1",
            "DELETE FROM data_quality WHERE metadata_id = ?1",
            "DELETE FROM metadata WHERE id = ?1",
        ] {
            sqlx::query(sql).bind(id).execute(&mut *conn).await?;
        }
        Ok(())
    }

    /// Assemble the full aggregate for a root record.
    async fn load_detail(
        conn: &mut SqliteConnection,
        record: Metadata,
    ) -> Result<MetadataDetail> {
        let metadata_id = record.id;

        let info = sqlx::query_as::<_, IdentificationInfo>(
            "SELECT * FROM identification_info WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_optional(&mut *conn)
        .await?;

        let identification = match info {
            Some(info) => {
                let point_of_contact = sqlx::query_as::<_, PointOfContact>(
                    "SELECT * FROM point_of_contact WHERE identification_info_id = ?1",
                )
                .bind(info.id)
                .fetch_optional(&mut *conn)
                .await?;
                let constraints = sqlx::query_as::<_, ResourceConstraints>(
                    "SELECT * FROM resource_constraints WHERE identification_info_id = ?1",
                )
                .bind(info.id)
                .fetch_optional(&mut *conn)
                .await?;
                let temporal_extent = sqlx::query_as::<_, TemporalExtent>(
                    "SELECT * FROM temporal_extent WHERE identification_info_id = ?1",
                )
                .bind(info.id)
                .fetch_optional(&mut *conn)
                .await?;
                Some(IdentificationDetail {
                    info,
                    point_of_contact,
                    constraints,
                    temporal_extent,
                })
            }
            None => None,
        };

        let distribution = sqlx::query_as::<_, Distribution>(
            "SELECT * FROM distribution WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_optional(&mut *conn)
        .await?;
        let lineage = sqlx::query_as::<_, ResourceLineage>(
            "SELECT * FROM resource_lineage WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_optional(&mut *conn)
        .await?;
        let reference_system = sqlx::query_as::<_, ReferenceSystem>(
            "SELECT * FROM reference_system WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_optional(&mut *conn)
        .await?;
        let contact = sqlx::query_as::<_, MetadataContact>(
            "SELECT * FROM metadata_contact WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_optional(&mut *conn)
        .await?;
        let quality = sqlx::query_as::<_, DataQuality>(
            "SELECT * FROM data_quality WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(MetadataDetail {
            record,
            identification,
            distribution,
            lineage,
            reference_system,
            contact,
            quality,
        })
    }

    // -----------------------------------------------------------------------
    // Sub-record inserts (create path)
    // -----------------------------------------------------------------------

    async fn insert_identification(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        payload: &IdentificationPayload,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO identification_info (id, metadata_id, title, production_date, \
             edition_date, abstract, spatial_rep_type, equivalent_scale, \
             geographic_bounding_box, update_frequency, keywords, keyword_type, \
             topic_category, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        )
        .bind(id)
        .bind(metadata_id)
        .bind(payload.title.clone())
        .bind(payload.production_date)
        .bind(payload.edition_date)
        .bind(payload.abstract_text.clone())
        .bind(payload.spatial_rep_type.clone())
        .bind(payload.equivalent_scale)
        .bind(payload.geographic_bounding_box.clone())
        .bind(payload.update_frequency.clone())
        .bind(payload.keywords.clone())
        .bind(payload.keyword_type.clone())
        .bind(payload.topic_category.clone())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        if let Some(point_of_contact) = &payload.point_of_contact {
            Self::insert_point_of_contact(conn, id, point_of_contact, now).await?;
        }
        if let Some(constraints) = &payload.constraints {
            Self::insert_constraints(conn, id, constraints, now).await?;
        }
        if let Some(temporal_extent) = &payload.temporal_extent {
            Self::insert_temporal_extent(conn, id, temporal_extent, now).await?;
        }
        Ok(())
    }

    async fn insert_point_of_contact(
        conn: &mut SqliteConnection,
        identification_info_id: Uuid,
        payload: &PointOfContactPayload,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO point_of_contact (id, identification_info_id, name, organization, \
             email, phone, address, role, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(Uuid::new_v4())
        .bind(identification_info_id)
        .bind(payload.name.clone())
        .bind(payload.organization.clone())
        .bind(payload.email.clone())
        .bind(payload.phone.clone())
        .bind(payload.address.clone())
        .bind(payload.role.clone())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_constraints(
        conn: &mut SqliteConnection,
        identification_info_id: Uuid,
        payload: &ConstraintsPayload,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO resource_constraints (id, identification_info_id, access_constraints, \
             use_constraints, other_constraints, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(Uuid::new_v4())
        .bind(identification_info_id)
        .bind(payload.access_constraints.clone())
        .bind(payload.use_constraints.clone())
        .bind(payload.other_constraints.clone())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_temporal_extent(
        conn: &mut SqliteConnection,
        identification_info_id: Uuid,
        payload: &TemporalExtentPayload,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO temporal_extent (id, identification_info_id, start_date, end_date, \
             frequency, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(Uuid::new_v4())
        .bind(identification_info_id)
        .bind(payload.start_date)
        .bind(payload.end_date)
        .bind(payload.frequency.clone())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_distribution(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        payload: &DistributionPayload,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO distribution (id, metadata_id, name, address, phone_no, weblink, \
             format, distributor_email, order_process, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(Uuid::new_v4())
        .bind(metadata_id)
        .bind(payload.name.clone())
        .bind(payload.address.clone())
        .bind(payload.phone_no.clone())
        .bind(payload.weblink.clone())
        .bind(payload.format.clone())
        .bind(payload.distributor_email.clone())
        .bind(payload.order_process.clone())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_lineage(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        payload: &LineagePayload,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO resource_lineage (id, metadata_id, statement, hierarchy_level, \
             process_software, process_date, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(Uuid::new_v4())
        .bind(metadata_id)
        .bind(payload.statement.clone())
        .bind(payload.hierarchy_level)
        .bind(payload.process_software.clone())
        .bind(payload.process_date)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_reference_system(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        payload: &ReferenceSystemPayload,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO reference_system (id, metadata_id, identifier, code, created_at, \
             updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(Uuid::new_v4())
        .bind(metadata_id)
        .bind(payload.identifier.clone())
        .bind(payload.code.clone())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_contact(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        payload: &MetadataContactPayload,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO metadata_contact (id, metadata_id, name, organization, email, phone, \
             address, role, weblink, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(Uuid::new_v4())
        .bind(metadata_id)
        .bind(payload.name.clone())
        .bind(payload.organization.clone())
        .bind(payload.email.clone())
        .bind(payload.phone.clone())
        .bind(payload.address.clone())
        .bind(payload.role.clone())
        .bind(payload.weblink.clone())
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    async fn insert_quality(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        payload: &DataQualityPayload,
        now: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO data_quality (id, metadata_id, completeness_report, accuracy_report, \
             process_description, process_date, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(Uuid::new_v4())
        .bind(metadata_id)
        .bind(payload.completeness_report.clone())
        .bind(payload.accuracy_report.clone())
        .bind(payload.process_description.clone())
        .bind(payload.process_date)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Sub-record upserts (update path): merge into the existing child, or
    // create it when the block arrives for the first time.
    // -----------------------------------------------------------------------

    async fn upsert_identification(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        patch: &IdentificationPatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let existing = sqlx::query_as::<_, IdentificationInfo>(
            "SELECT * FROM identification_info WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_optional(&mut *conn)
        .await?;

        let identification_id = match existing {
            Some(info) => {
                sqlx::query(
                    "UPDATE identification_info SET \
                     title = COALESCE(?2, title), \
                     production_date = COALESCE(?3, production_date), \
                     edition_date = COALESCE(?4, edition_date), \
                     abstract = COALESCE(?5, abstract), \
                     spatial_rep_type = COALESCE(?6, spatial_rep_type), \
                     equivalent_scale = COALESCE(?7, equivalent_scale), \
                     geographic_bounding_box = COALESCE(?8, geographic_bounding_box), \
                     update_frequency = COALESCE(?9, update_frequency), \
                     keywords = COALESCE(?10, keywords), \
                     keyword_type = COALESCE(?11, keyword_type), \
                     topic_category = COALESCE(?12, topic_category), \
                     updated_at = ?13 \
                     WHERE id = ?1",
                )
                .bind(info.id)
                .bind(patch.title.clone())
                .bind(patch.production_date)
                .bind(patch.edition_date)
                .bind(patch.abstract_text.clone())
                .bind(patch.spatial_rep_type.clone())
                .bind(patch.equivalent_scale)
                .bind(patch.geographic_bounding_box.clone())
                .bind(patch.update_frequency.clone())
                .bind(patch.keywords.clone())
                .bind(patch.keyword_type.clone())
                .bind(patch.topic_category.clone())
                .bind(now)
                .execute(&mut *conn)
                .await?;
                info.id
            }
            None => {
                // First time this block appears: enough fields must be
                // present to create the sub-record outright.
                let mut errors = FieldErrors::new();
                for (key, present) in [
                    ("identification.title", patch.title.is_some()),
                    ("identification.production_date", patch.production_date.is_some()),
                    ("identification.abstract", patch.abstract_text.is_some()),
                    ("identification.spatial_rep_type", patch.spatial_rep_type.is_some()),
                    (
                        "identification.geographic_bounding_box",
                        patch.geographic_bounding_box.is_some(),
                    ),
                ] {
                    if !present {
                        errors.push(key, "This field is required");
                    }
                }
                match (
                    &patch.title,
                    &patch.production_date,
                    &patch.abstract_text,
                    &patch.spatial_rep_type,
                    &patch.geographic_bounding_box,
                ) {
                    (
                        Some(title),
                        Some(production_date),
                        Some(abstract_text),
                        Some(spatial_rep_type),
                        Some(geographic_bounding_box),
                    ) => {
                        let payload = IdentificationPayload {
                            title: title.clone(),
                            production_date: *production_date,
                            edition_date: patch.edition_date,
                            abstract_text: abstract_text.clone(),
                            spatial_rep_type: spatial_rep_type.clone(),
                            equivalent_scale: patch.equivalent_scale,
                            geographic_bounding_box: geographic_bounding_box.clone(),
                            update_frequency: patch.update_frequency.clone(),
                            keywords: patch
                                .keywords
                                .clone()
                                .unwrap_or_else(|| serde_json::Value::Array(Vec::new())),
                            keyword_type: patch.keyword_type.clone(),
                            topic_category: patch.topic_category.clone(),
                            point_of_contact: None,
                            constraints: None,
                            temporal_extent: None,
                        };
                        Self::insert_identification(conn, metadata_id, &payload, now).await?;
                        return Self::upsert_identification_children(
                            conn,
                            metadata_id,
                            patch,
                            now,
                        )
                        .await;
                    }
                    _ => return Err(AppError::Validation(errors)),
                }
            }
        };

        Self::upsert_identification_children_by_id(conn, identification_id, patch, now).await
    }

    async fn upsert_identification_children(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        patch: &IdentificationPatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let identification_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM identification_info WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_one(&mut *conn)
        .await?;
        Self::upsert_identification_children_by_id(conn, identification_id, patch, now).await
    }

    async fn upsert_identification_children_by_id(
        conn: &mut SqliteConnection,
        identification_id: Uuid,
        patch: &IdentificationPatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(point_of_contact) = &patch.point_of_contact {
            Self::upsert_point_of_contact(conn, identification_id, point_of_contact, now).await?;
        }
        if let Some(constraints) = &patch.constraints {
            Self::upsert_constraints(conn, identification_id, constraints, now).await?;
        }
        if let Some(temporal_extent) = &patch.temporal_extent {
            Self::upsert_temporal_extent(conn, identification_id, temporal_extent, now).await?;
        }
        Ok(())
    }

    async fn upsert_point_of_contact(
        conn: &mut SqliteConnection,
        identification_info_id: Uuid,
        patch: &PointOfContactPatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM point_of_contact WHERE identification_info_id = ?1",
        )
        .bind(identification_info_id)
        .fetch_one(&mut *conn)
        .await?;

        if exists > 0 {
            sqlx::query(
                "UPDATE point_of_contact SET \
                 name = COALESCE(?2, name), \
                 organization = COALESCE(?3, organization), \
                 email = COALESCE(?4, email), \
                 phone = COALESCE(?5, phone), \
                 address = COALESCE(?6, address), \
                 role = COALESCE(?7, role), \
                 updated_at = ?8 \
                 WHERE identification_info_id = ?1",
            )
            .bind(identification_info_id)
            .bind(patch.name.clone())
            .bind(patch.organization.clone())
            .bind(patch.email.clone())
            .bind(patch.phone.clone())
            .bind(patch.address.clone())
            .bind(patch.role.clone())
            .bind(now)
            .execute(&mut *conn)
            .await?;
            return Ok(());
        }

        let mut errors = FieldErrors::new();
        for (key, present) in [
            ("identification.point_of_contact.name", patch.name.is_some()),
            (
                "identification.point_of_contact.organization",
                patch.organization.is_some(),
            ),
            ("identification.point_of_contact.email", patch.email.is_some()),
            ("identification.point_of_contact.role", patch.role.is_some()),
        ] {
            if !present {
                errors.push(key, "This field is required");
            }
        }
        match (&patch.name, &patch.organization, &patch.email, &patch.role) {
            (Some(name), Some(organization), Some(email), Some(role)) => {
                let payload = PointOfContactPayload {
                    name: name.clone(),
                    organization: organization.clone(),
                    email: email.clone(),
                    phone: patch.phone.clone(),
                    address: patch.address.clone(),
                    role: role.clone(),
                };
                Self::insert_point_of_contact(conn, identification_info_id, &payload, now).await
            }
            _ => Err(AppError::Validation(errors)),
        }
    }

    async fn upsert_constraints(
        conn: &mut SqliteConnection,
        identification_info_id: Uuid,
        patch: &ConstraintsPatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM resource_constraints WHERE identification_info_id = ?1",
        )
        .bind(identification_info_id)
        .fetch_one(&mut *conn)
        .await?;

        if exists > 0 {
            sqlx::query(
                "UPDATE resource_constraints SET \
                 access_constraints = COALESCE(?2, access_constraints), \
                 use_constraints = COALESCE(?3, use_constraints), \
                 other_constraints = COALESCE(?4, other_constraints), \
                 updated_at = ?5 \
                 WHERE identification_info_id = ?1",
            )
            .bind(identification_info_id)
            .bind(patch.access_constraints.clone())
            .bind(patch.use_constraints.clone())
            .bind(patch.other_constraints.clone())
            .bind(now)
            .execute(&mut *conn)
            .await?;
            return Ok(());
        }

        let payload = ConstraintsPayload {
            access_constraints: patch.access_constraints.clone(),
            use_constraints: patch.use_constraints.clone(),
            other_constraints: patch.other_constraints.clone(),
        };
        Self::insert_constraints(conn, identification_info_id, &payload, now).await
    }

    async fn upsert_temporal_extent(
        conn: &mut SqliteConnection,
        identification_info_id: Uuid,
        patch: &TemporalExtentPatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM temporal_extent WHERE identification_info_id = ?1",
        )
        .bind(identification_info_id)
        .fetch_one(&mut *conn)
        .await?;

        if exists > 0 {
            sqlx::query(
                "UPDATE temporal_extent SET \
                 start_date = COALESCE(?2, start_date), \
                 end_date = COALESCE(?3, end_date), \
                 frequency = COALESCE(?4, frequency), \
                 updated_at = ?5 \
                 WHERE identification_info_id = ?1",
            )
            .bind(identification_info_id)
            .bind(patch.start_date)
            .bind(patch.end_date)
            .bind(patch.frequency.clone())
            .bind(now)
            .execute(&mut *conn)
            .await?;
            return Ok(());
        }

        match patch.start_date {
            Some(start_date) => {
                let payload = TemporalExtentPayload {
                    start_date,
                    end_date: patch.end_date,
                    frequency: patch.frequency.clone(),
                };
                Self::insert_temporal_extent(conn, identification_info_id, &payload, now).await
            }
            None => Err(AppError::field(
                "identification.temporal_extent.start_date",
                "This field is required",
            )),
        }
    }

    async fn upsert_distribution(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        patch: &DistributionPatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM distribution WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_one(&mut *conn)
        .await?;

        if exists > 0 {
            sqlx::query(
                "UPDATE distribution SET \
                 name = COALESCE(?2, name), \
                 address = COALESCE(?3, address), \
                 phone_no = COALESCE(?4, phone_no), \
                 weblink = COALESCE(?5, weblink), \
                 format = COALESCE(?6, format), \
                 distributor_email = COALESCE(?7, distributor_email), \
                 order_process = COALESCE(?8, order_process), \
                 updated_at = ?9 \
                 WHERE metadata_id = ?1",
            )
            .bind(metadata_id)
            .bind(patch.name.clone())
            .bind(patch.address.clone())
            .bind(patch.phone_no.clone())
            .bind(patch.weblink.clone())
            .bind(patch.format.clone())
            .bind(patch.distributor_email.clone())
            .bind(patch.order_process.clone())
            .bind(now)
            .execute(&mut *conn)
            .await?;
            return Ok(());
        }

        match &patch.name {
            Some(name) => {
                let payload = DistributionPayload {
                    name: name.clone(),
                    address: patch.address.clone(),
                    phone_no: patch.phone_no.clone(),
                    weblink: patch.weblink.clone(),
                    format: patch.format.clone(),
                    distributor_email: patch.distributor_email.clone(),
                    order_process: patch.order_process.clone(),
                };
                Self::insert_distribution(conn, metadata_id, &payload, now).await
            }
            None => Err(AppError::field("distribution.name", "This field is required")),
        }
    }

    async fn upsert_lineage(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        patch: &LineagePatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM resource_lineage WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_one(&mut *conn)
        .await?;

        if exists > 0 {
            sqlx::query(
                "UPDATE resource_lineage SET \
                 statement = COALESCE(?2, statement), \
                 hierarchy_level = COALESCE(?3, hierarchy_level), \
                 process_software = COALESCE(?4, process_software), \
                 process_date = COALESCE(?5, process_date), \
                 updated_at = ?6 \
                 WHERE metadata_id = ?1",
            )
            .bind(metadata_id)
            .bind(patch.statement.clone())
            .bind(patch.hierarchy_level)
            .bind(patch.process_software.clone())
            .bind(patch.process_date)
            .bind(now)
            .execute(&mut *conn)
            .await?;
            return Ok(());
        }

        let mut errors = FieldErrors::new();
        if patch.statement.is_none() {
            errors.push("lineage.statement", "This field is required");
        }
        if patch.hierarchy_level.is_none() {
            errors.push("lineage.hierarchy_level", "This field is required");
        }
        match (&patch.statement, patch.hierarchy_level) {
            (Some(statement), Some(hierarchy_level)) => {
                let payload = LineagePayload {
                    statement: statement.clone(),
                    hierarchy_level,
                    process_software: patch.process_software.clone(),
                    process_date: patch.process_date,
                };
                Self::insert_lineage(conn, metadata_id, &payload, now).await
            }
            _ => Err(AppError::Validation(errors)),
        }
    }

    async fn upsert_reference_system(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        patch: &ReferenceSystemPatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reference_system WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_one(&mut *conn)
        .await?;

        if exists > 0 {
            sqlx::query(
                "UPDATE reference_system SET \
                 identifier = COALESCE(?2, identifier), \
                 code = COALESCE(?3, code), \
                 updated_at = ?4 \
                 WHERE metadata_id = ?1",
            )
            .bind(metadata_id)
            .bind(patch.identifier.clone())
            .bind(patch.code.clone())
            .bind(now)
            .execute(&mut *conn)
            .await?;
            return Ok(());
        }

        let mut errors = FieldErrors::new();
        if patch.identifier.is_none() {
            errors.push("reference_system.identifier", "This field is required");
        }
        if patch.code.is_none() {
            errors.push("reference_system.code", "This field is required");
        }
        match (&patch.identifier, &patch.code) {
            (Some(identifier), Some(code)) => {
                let payload = ReferenceSystemPayload {
                    identifier: identifier.clone(),
                    code: code.clone(),
                };
                Self::insert_reference_system(conn, metadata_id, &payload, now).await
            }
            _ => Err(AppError::Validation(errors)),
        }
    }

    async fn upsert_contact(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        patch: &MetadataContactPatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM metadata_contact WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_one(&mut *conn)
        .await?;

        if exists > 0 {
            sqlx::query(
                "UPDATE metadata_contact SET \
                 name = COALESCE(?2, name), \
                 organization = COALESCE(?3, organization), \
                 email = COALESCE(?4, email), \
                 phone = COALESCE(?5, phone), \
                 address = COALESCE(?6, address), \
                 role = COALESCE(?7, role), \
                 weblink = COALESCE(?8, weblink), \
                 updated_at = ?9 \
                 WHERE metadata_id = ?1",
            )
            .bind(metadata_id)
            .bind(patch.name.clone())
            .bind(patch.organization.clone())
            .bind(patch.email.clone())
            .bind(patch.phone.clone())
            .bind(patch.address.clone())
            .bind(patch.role.clone())
            .bind(patch.weblink.clone())
            .bind(now)
            .execute(&mut *conn)
            .await?;
            return Ok(());
        }

        let mut errors = FieldErrors::new();
        for (key, present) in [
            ("contact.name", patch.name.is_some()),
            ("contact.organization", patch.organization.is_some()),
            ("contact.email", patch.email.is_some()),
            ("contact.role", patch.role.is_some()),
        ] {
            if !present {
                errors.push(key, "This field is required");
            }
        }
        match (&patch.name, &patch.organization, &patch.email, &patch.role) {
            (Some(name), Some(organization), Some(email), Some(role)) => {
                let payload = MetadataContactPayload {
                    name: name.clone(),
                    organization: organization.clone(),
                    email: email.clone(),
                    phone: patch.phone.clone(),
                    address: patch.address.clone(),
                    role: role.clone(),
                    weblink: patch.weblink.clone(),
                };
                Self::insert_contact(conn, metadata_id, &payload, now).await
            }
            _ => Err(AppError::Validation(errors)),
        }
    }

    async fn upsert_quality(
        conn: &mut SqliteConnection,
        metadata_id: Uuid,
        patch: &DataQualityPatch,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM data_quality WHERE metadata_id = ?1",
        )
        .bind(metadata_id)
        .fetch_one(&mut *conn)
        .await?;

        if exists > 0 {
            sqlx::query(
                "UPDATE data_quality SET \
                 completeness_report = COALESCE(?2, completeness_report), \
                 accuracy_report = COALESCE(?3, accuracy_report), \
                 process_description = COALESCE(?4, process_description), \
                 process_date = COALESCE(?5, process_date), \
                 updated_at = ?6 \
                 WHERE metadata_id = ?1",
            )
            .bind(metadata_id)
            .bind(patch.completeness_report.clone())
            .bind(patch.accuracy_report.clone())
            .bind(patch.process_description.clone())
            .bind(patch.process_date)
            .bind(now)
            .execute(&mut *conn)
            .await?;
            return Ok(());
        }

        let payload = DataQualityPayload {
            completeness_report: patch.completeness_report.clone(),
            accuracy_report: patch.accuracy_report.clone(),
            process_description: patch.process_description.clone(),
            process_date: patch.process_date,
        };
        Self::insert_quality(conn, metadata_id, &payload, now).await
    }
}
