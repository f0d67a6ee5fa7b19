//! Identification branch of the aggregate: IdentificationInfo and the three
//! sub-records hanging off it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Spatial representation type enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SpatialRepresentationType {
    Vector,
    Raster,
}

/// Dataset identification entity
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct IdentificationInfo {
    pub id: Uuid,
    pub metadata_id: Uuid,
    pub title: String,
    pub production_date: DateTime<Utc>,
    pub edition_date: Option<DateTime<Utc>>,
    #[sqlx(rename = "abstract")]
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub spatial_rep_type: SpatialRepresentationType,
    pub equivalent_scale: Option<f64>,
    /// Stored verbatim as submitted: `{"north": .., "south": .., "east": .., "west": ..}`
    pub geographic_bounding_box: serde_json::Value,
    pub update_frequency: Option<String>,
    pub keywords: serde_json::Value,
    pub keyword_type: Option<String>,
    pub topic_category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Point of contact for the identified resource
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PointOfContact {
    pub id: Uuid,
    pub identification_info_id: Uuid,
    pub name: String,
    pub organization: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Access/use constraints on the identified resource
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResourceConstraints {
    pub id: Uuid,
    pub identification_info_id: Uuid,
    pub access_constraints: Option<String>,
    pub use_constraints: Option<String>,
    pub other_constraints: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Temporal coverage of the identified resource
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TemporalExtent {
    pub id: Uuid,
    pub identification_info_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub frequency: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
