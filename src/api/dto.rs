//! Shared Data Transfer Objects (DTOs) for API handlers.
//!
//! Create payloads carry required fields as such; patch payloads mark every
//! field optional so that "absent" means "leave untouched" (partial-update
//! law). Enumerated fields arrive as plain strings and are checked against
//! their allow-lists by the validation rules, so that a bad value surfaces as
//! a field-keyed error rather than a deserialization failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::contact::MetadataContact;
use crate::models::distribution::Distribution;
use crate::models::identification::{
    IdentificationInfo, PointOfContact, ResourceConstraints, TemporalExtent,
};
use crate::models::lineage::ResourceLineage;
use crate::models::metadata::Metadata;
use crate::models::quality::DataQuality;
use crate::models::reference_system::ReferenceSystem;

fn empty_keywords() -> Value {
    Value::Array(Vec::new())
}

// ---------------------------------------------------------------------------
// Create payloads
// ---------------------------------------------------------------------------

/// Root payload for creating a metadata aggregate. Ownership is never part of
/// the payload; the owner is always the authenticated requester.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataPayload {
    pub status: Option<String>,
    pub metadata_linkage: Option<String>,
    pub metadata_standard: Option<String>,
    pub language: Option<String>,
    pub character_set: Option<String>,
    pub identification: Option<IdentificationPayload>,
    pub distribution: Option<DistributionPayload>,
    pub lineage: Option<LineagePayload>,
    pub reference_system: Option<ReferenceSystemPayload>,
    pub contact: Option<MetadataContactPayload>,
    pub quality: Option<DataQualityPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentificationPayload {
    pub title: String,
    pub production_date: DateTime<Utc>,
    pub edition_date: Option<DateTime<Utc>>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub spatial_rep_type: String,
    pub equivalent_scale: Option<f64>,
    pub geographic_bounding_box: Value,
    pub update_frequency: Option<String>,
    #[serde(default = "empty_keywords")]
    pub keywords: Value,
    pub keyword_type: Option<String>,
    pub topic_category: Option<String>,
    pub point_of_contact: Option<PointOfContactPayload>,
    pub constraints: Option<ConstraintsPayload>,
    pub temporal_extent: Option<TemporalExtentPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointOfContactPayload {
    pub name: String,
    pub organization: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintsPayload {
    pub access_constraints: Option<String>,
    pub use_constraints: Option<String>,
    pub other_constraints: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemporalExtentPayload {
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistributionPayload {
    pub name: String,
    pub address: Option<String>,
    pub phone_no: Option<String>,
    pub weblink: Option<String>,
    pub format: Option<String>,
    pub distributor_email: Option<String>,
    pub order_process: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineagePayload {
    pub statement: String,
    pub hierarchy_level: i64,
    pub process_software: Option<String>,
    pub process_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceSystemPayload {
    pub identifier: String,
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataContactPayload {
    pub name: String,
    pub organization: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: String,
    pub weblink: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataQualityPayload {
    pub completeness_report: Option<String>,
    pub accuracy_report: Option<String>,
    pub process_description: Option<String>,
    pub process_date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Patch payloads (partial update; absent fields stay untouched)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataPatch {
    pub status: Option<String>,
    pub metadata_linkage: Option<String>,
    pub metadata_standard: Option<String>,
    pub language: Option<String>,
    pub character_set: Option<String>,
    pub identification: Option<IdentificationPatch>,
    pub distribution: Option<DistributionPatch>,
    pub lineage: Option<LineagePatch>,
    pub reference_system: Option<ReferenceSystemPatch>,
    pub contact: Option<MetadataContactPatch>,
    pub quality: Option<DataQualityPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentificationPatch {
    pub title: Option<String>,
    pub production_date: Option<DateTime<Utc>>,
    pub edition_date: Option<DateTime<Utc>>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub spatial_rep_type: Option<String>,
    pub equivalent_scale: Option<f64>,
    pub geographic_bounding_box: Option<Value>,
    pub update_frequency: Option<String>,
    pub keywords: Option<Value>,
    pub keyword_type: Option<String>,
    pub topic_category: Option<String>,
    pub point_of_contact: Option<PointOfContactPatch>,
    pub constraints: Option<ConstraintsPatch>,
    pub temporal_extent: Option<TemporalExtentPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointOfContactPatch {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConstraintsPatch {
    pub access_constraints: Option<String>,
    pub use_constraints: Option<String>,
    pub other_constraints: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemporalExtentPatch {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistributionPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone_no: Option<String>,
    pub weblink: Option<String>,
    pub format: Option<String>,
    pub distributor_email: Option<String>,
    pub order_process: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LineagePatch {
    pub statement: Option<String>,
    pub hierarchy_level: Option<i64>,
    pub process_software: Option<String>,
    pub process_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceSystemPatch {
    pub identifier: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataContactPatch {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub weblink: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataQualityPatch {
    pub completeness_report: Option<String>,
    pub accuracy_report: Option<String>,
    pub process_description: Option<String>,
    pub process_date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Bulk operation payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataBulkUpdateItem {
    pub id: Uuid,
    #[serde(flatten)]
    pub patch: MetadataPatch,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted_count: u64,
}

// ---------------------------------------------------------------------------
// List query parameters
// ---------------------------------------------------------------------------

/// Filters for the metadata list endpoint. The date range applies to
/// `created_at` and takes effect only when both bounds are supplied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataListQuery {
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Aggregate responses
// ---------------------------------------------------------------------------

/// Identification sub-record together with its three children.
#[derive(Debug, Clone, Serialize)]
pub struct IdentificationDetail {
    #[serde(flatten)]
    pub info: IdentificationInfo,
    pub point_of_contact: Option<PointOfContact>,
    pub constraints: Option<ResourceConstraints>,
    pub temporal_extent: Option<TemporalExtent>,
}

/// A full metadata aggregate: root record plus whichever sub-records exist.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataDetail {
    #[serde(flatten)]
    pub record: Metadata,
    pub identification: Option<IdentificationDetail>,
    pub distribution: Option<Distribution>,
    pub lineage: Option<ResourceLineage>,
    pub reference_system: Option<ReferenceSystem>,
    pub contact: Option<MetadataContact>,
    pub quality: Option<DataQuality>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_payload_minimal() {
        let payload: MetadataPayload = serde_json::from_value(json!({
            "status": "DRAFT",
            "metadata_standard": "ISO 19115"
        }))
        .unwrap();
        assert_eq!(payload.status.as_deref(), Some("DRAFT"));
        assert!(payload.identification.is_none());
    }

    #[test]
    fn test_identification_payload_keywords_default() {
        let payload: IdentificationPayload = serde_json::from_value(json!({
            "title": "Test Dataset",
            "production_date": "2024-01-01T00:00:00Z",
            "abstract": "A dataset abstract",
            "spatial_rep_type": "VECTOR",
            "geographic_bounding_box": {"north": 1.0, "south": 0.0, "east": 1.0, "west": 0.0}
        }))
        .unwrap();
        assert_eq!(payload.keywords, json!([]));
        assert_eq!(payload.abstract_text, "A dataset abstract");
    }

    #[test]
    fn test_bulk_update_item_flattens_patch() {
        let item: MetadataBulkUpdateItem = serde_json::from_value(json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "status": "PUBLISHED"
        }))
        .unwrap();
        assert_eq!(item.patch.status.as_deref(), Some("PUBLISHED"));
        assert!(item.patch.identification.is_none());
    }

    #[test]
    fn test_patch_absent_fields_stay_none() {
        let patch: MetadataPatch = serde_json::from_value(json!({
            "metadata_linkage": "https://example.com/meta"
        }))
        .unwrap();
        assert!(patch.status.is_none());
        assert_eq!(patch.metadata_linkage.as_deref(), Some("https://example.com/meta"));
    }
}
