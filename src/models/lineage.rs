//! Resource lineage model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Provenance statement for a dataset
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResourceLineage {
    pub id: Uuid,
    pub metadata_id: Uuid,
    pub statement: String,
    pub hierarchy_level: i64,
    pub process_software: Option<String>,
    pub process_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
