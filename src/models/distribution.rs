//! Distribution model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Distributor and ordering information for a dataset
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Distribution {
    pub id: Uuid,
    pub metadata_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone_no: Option<String>,
    pub weblink: Option<String>,
    pub format: Option<String>,
    pub distributor_email: Option<String>,
    pub order_process: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
