use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::models::{Deal, DealStage};
use crate::repositories::DealRepository;
use crate::validation::{self, Pagination};
use crate::AppState;

use super::pagination_json;

/// Deals take one extra list parameter on top of the shared page/limit/search
#[derive(Debug, Deserialize)]
pub struct DealListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub stage: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDealRequest {
    pub title: String,
    pub value: Option<f64>,
    pub probability: Option<i32>,
    pub stage: Option<String>,
    pub contact_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDealRequest {
    pub title: Option<String>,
    pub value: Option<f64>,
    pub probability: Option<i32>,
    pub stage: Option<String>,
    pub contact_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
}

fn validate_stage(stage: &str) -> Result<(), ApiError> {
    if DealStage::parse(stage).is_some() {
        Ok(())
    } else {
        Err(ApiError::validation(format!("Unknown deal stage: {}", stage)))
    }
}

fn validate_value(value: f64) -> Result<(), ApiError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ApiError::validation("Deal value must be a non-negative number"))
    }
}

/// GET /api/deals?page&limit&search, or ?stage= for one whole pipeline
/// column (board-style, unpaginated)
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<DealListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = DealRepository::new(state.db.pool().clone());

    if let Some(stage) = query.stage.as_deref().filter(|s| !s.is_empty()) {
        let stage = DealStage::parse(stage)
            .ok_or_else(|| ApiError::validation(format!("Unknown deal stage: {}", stage)))?;
        let deals = repo.find_by_stage(current.org_id(), stage).await?;
        return Ok(Json(json!({ "deals": deals })));
    }

    let page = Pagination::from_query(query.page, query.limit);
    let search = query
        .search
        .as_deref()
        .map(validation::sanitize_search)
        .filter(|s| !s.is_empty());

    let result = repo
        .list(current.org_id(), page, search.as_deref())
        .await?;

    Ok(Json(json!({
        "deals": result.rows,
        "pagination": pagination_json(page, result.total),
    })))
}

/// GET /api/deals/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deal = DealRepository::new(state.db.pool().clone())
        .find_by_id(current.org_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Deal not found"))?;

    Ok(Json(deal))
}

/// POST /api/deals
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<CreateDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;
    validation::validate_name("Deal title", &input.title)?;

    let stage = input.stage.unwrap_or_else(|| DealStage::Lead.as_str().to_string());
    validate_stage(&stage)?;
    let value = input.value.unwrap_or(0.0);
    validate_value(value)?;

    let now = Utc::now();
    let deal = Deal {
        id: Uuid::new_v4(),
        organization_id: current.org_id(),
        title: input.title.trim().to_string(),
        value,
        probability: input.probability.unwrap_or(0).clamp(0, 100),
        stage,
        contact_id: input.contact_id,
        company_id: input.company_id,
        assigned_to: input.assigned_to,
        created_at: now,
        updated_at: now,
    };

    let created = DealRepository::new(state.db.pool().clone())
        .insert(&deal)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/deals/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDealRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;

    let repo = DealRepository::new(state.db.pool().clone());
    let mut deal = repo
        .find_by_id(current.org_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Deal not found"))?;

    if let Some(v) = input.title {
        validation::validate_name("Deal title", &v)?;
        deal.title = v.trim().to_string();
    }
    if let Some(v) = input.value {
        validate_value(v)?;
        deal.value = v;
    }
    if let Some(v) = input.probability {
        deal.probability = v.clamp(0, 100);
    }
    if let Some(v) = input.stage {
        validate_stage(&v)?;
        deal.stage = v;
    }
    if let Some(v) = input.contact_id {
        deal.contact_id = Some(v);
    }
    if let Some(v) = input.company_id {
        deal.company_id = Some(v);
    }
    if let Some(v) = input.assigned_to {
        deal.assigned_to = Some(v);
    }

    let updated = repo
        .update(&deal)
        .await?
        .ok_or_else(|| ApiError::not_found("Deal not found"))?;

    Ok(Json(updated))
}

/// DELETE /api/deals/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;

    let removed = DealRepository::new(state.db.pool().clone())
        .delete(current.org_id(), id)
        .await?;
    if !removed {
        return Err(ApiError::not_found("Deal not found"));
    }

    Ok(Json(json!({ "success": true, "message": "Deal deleted" })))
}
