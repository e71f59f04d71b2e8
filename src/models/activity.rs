use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub activity_type: String,
    pub subject: String,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    pub contact_id: Option<Uuid>,
    pub deal_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const ACTIVITY_TYPES: [&str; 5] = ["call", "email", "meeting", "task", "note"];

pub fn is_valid_type(activity_type: &str) -> bool {
    ACTIVITY_TYPES.contains(&activity_type)
}
