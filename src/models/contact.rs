//! Metadata contact model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Contact responsible for the metadata record itself
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MetadataContact {
    pub id: Uuid,
    pub metadata_id: Uuid,
    pub name: String,
    pub organization: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: String,
    pub weblink: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
