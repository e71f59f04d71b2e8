use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A tenant. Everything else in the system is scoped to an organization id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub plan: String,
    pub status: String,
    /// Tenant preferences: currency, timezone, date format, feature flags
    pub settings: Value,
    pub billing_period_start: DateTime<Utc>,
    pub billing_period_end: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn default_settings() -> Value {
        serde_json::json!({
            "currency": "USD",
            "timezone": "UTC",
            "dateFormat": "YYYY-MM-DD",
            "features": {}
        })
    }
}
