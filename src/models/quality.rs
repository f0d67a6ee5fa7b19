//! Data quality model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Quality reports attached to a metadata record
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DataQuality {
    pub id: Uuid,
    pub metadata_id: Uuid,
    pub completeness_report: Option<String>,
    pub accuracy_report: Option<String>,
    pub process_description: Option<String>,
    pub process_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
