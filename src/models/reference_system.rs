//! Reference system model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Spatial reference system, e.g. an EPSG code
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReferenceSystem {
    pub id: Uuid,
    pub metadata_id: Uuid,
    pub identifier: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
