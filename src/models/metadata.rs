//! Metadata root record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a metadata record.
///
/// Records start in `Draft`; `publish` moves Draft → Published and `archive`
/// moves Published → Archived. Any other transition is a guard violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MetadataStatus {
    Draft,
    Published,
    Archived,
}

impl MetadataStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataStatus::Draft => "DRAFT",
            MetadataStatus::Published => "PUBLISHED",
            MetadataStatus::Archived => "ARCHIVED",
        }
    }
}

/// Root entity of a metadata aggregate. Owns the six direct sub-records
/// (identification in turn owns three more).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Metadata {
    pub id: Uuid,
    pub status: MetadataStatus,
    pub user_id: Uuid,
    pub metadata_linkage: Option<String>,
    pub metadata_standard: Option<String>,
    pub language: Option<String>,
    pub character_set: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
