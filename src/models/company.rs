use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub revenue: Option<f64>,
    pub location: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Company row joined with live contact/deal counts. Counts are always
/// derived by aggregation, never stored.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CompanyWithCounts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub company: Company,
    pub contact_count: i64,
    pub deal_count: i64,
}

/// Lightweight projection for dropdowns
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListItem {
    pub id: Uuid,
    pub name: String,
}
