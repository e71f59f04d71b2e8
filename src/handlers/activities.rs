use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{activity, Activity};
use crate::repositories::ActivityRepository;
use crate::validation;
use crate::AppState;

use super::{pagination_json, ListQuery};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActivityRequest {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub subject: String,
    pub status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub contact_id: Option<Uuid>,
    pub deal_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateActivityRequest {
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub subject: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub contact_id: Option<Uuid>,
    pub deal_id: Option<Uuid>,
}

fn validate_type(activity_type: &str) -> Result<(), ApiError> {
    if activity::is_valid_type(activity_type) {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "Unknown activity type: {}",
            activity_type
        )))
    }
}

/// GET /api/activities?page&limit
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.pagination();
    let result = ActivityRepository::new(state.db.pool().clone())
        .list(current.org_id(), page)
        .await?;

    Ok(Json(json!({
        "activities": result.rows,
        "pagination": pagination_json(page, result.total),
    })))
}

/// POST /api/activities
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<CreateActivityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;
    validate_type(&input.activity_type)?;
    validation::validate_name("Subject", &input.subject)?;

    let now = Utc::now();
    let activity = Activity {
        id: Uuid::new_v4(),
        organization_id: current.org_id(),
        activity_type: input.activity_type,
        subject: input.subject.trim().to_string(),
        status: input.status.unwrap_or_else(|| "pending".to_string()),
        due_date: input.due_date,
        contact_id: input.contact_id,
        deal_id: input.deal_id,
        created_at: now,
        updated_at: now,
    };

    let created = ActivityRepository::new(state.db.pool().clone())
        .insert(&activity)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/activities/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateActivityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;

    let repo = ActivityRepository::new(state.db.pool().clone());
    let mut activity = repo
        .find_by_id(current.org_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Activity not found"))?;

    if let Some(v) = input.activity_type {
        validate_type(&v)?;
        activity.activity_type = v;
    }
    if let Some(v) = input.subject {
        validation::validate_name("Subject", &v)?;
        activity.subject = v.trim().to_string();
    }
    if let Some(v) = input.status {
        activity.status = v;
    }
    if let Some(v) = input.due_date {
        activity.due_date = Some(v);
    }
    if let Some(v) = input.contact_id {
        activity.contact_id = Some(v);
    }
    if let Some(v) = input.deal_id {
        activity.deal_id = Some(v);
    }

    let updated = repo
        .update(&activity)
        .await?
        .ok_or_else(|| ApiError::not_found("Activity not found"))?;

    Ok(Json(updated))
}

/// DELETE /api/activities/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;

    let removed = ActivityRepository::new(state.db.pool().clone())
        .delete(current.org_id(), id)
        .await?;
    if !removed {
        return Err(ApiError::not_found("Activity not found"));
    }

    Ok(Json(json!({ "success": true, "message": "Activity deleted" })))
}
