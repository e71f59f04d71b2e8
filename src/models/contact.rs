use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    /// Weak reference; the company may live in this tenant or not exist at all
    pub company_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle states a contact moves through
pub const CONTACT_STATUSES: [&str; 4] = ["lead", "prospect", "customer", "inactive"];

pub fn is_valid_status(status: &str) -> bool {
    CONTACT_STATUSES.contains(&status)
}
