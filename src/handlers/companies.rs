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
use crate::models::Company;
use crate::repositories::CompanyRepository;
use crate::validation;
use crate::AppState;

use super::{pagination_json, ListQuery};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequest {
    pub name: String,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub revenue: Option<f64>,
    pub location: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub revenue: Option<f64>,
    pub location: Option<String>,
    pub status: Option<String>,
}

/// GET /api/companies?page&limit&search - Page of companies with live
/// contact/deal counts
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.pagination();
    let search = query.search_term();

    let result = CompanyRepository::new(state.db.pool().clone())
        .list(current.org_id(), page, search.as_deref())
        .await?;

    Ok(Json(json!({
        "companies": result.rows,
        "pagination": pagination_json(page, result.total),
    })))
}

/// GET /api/companies/list - Lightweight (id, name) projection for dropdowns
pub async fn list_items(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let items = CompanyRepository::new(state.db.pool().clone())
        .list_items(current.org_id())
        .await?;
    Ok(Json(json!({ "companies": items })))
}

/// GET /api/companies/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let company = CompanyRepository::new(state.db.pool().clone())
        .find_by_id(current.org_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    Ok(Json(company))
}

/// POST /api/companies
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;
    validation::validate_name("Company name", &input.name)?;

    let now = Utc::now();
    let company = Company {
        id: Uuid::new_v4(),
        organization_id: current.org_id(),
        name: input.name.trim().to_string(),
        industry: input.industry,
        size: input.size,
        revenue: input.revenue,
        location: input.location,
        status: input.status.unwrap_or_else(|| "active".to_string()),
        created_at: now,
        updated_at: now,
    };

    let created = CompanyRepository::new(state.db.pool().clone())
        .insert(&company)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/companies/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;

    let repo = CompanyRepository::new(state.db.pool().clone());
    let mut company = repo
        .find_by_id(current.org_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    if let Some(v) = input.name {
        validation::validate_name("Company name", &v)?;
        company.name = v.trim().to_string();
    }
    if let Some(v) = input.industry {
        company.industry = Some(v);
    }
    if let Some(v) = input.size {
        company.size = Some(v);
    }
    if let Some(v) = input.revenue {
        company.revenue = Some(v);
    }
    if let Some(v) = input.location {
        company.location = Some(v);
    }
    if let Some(v) = input.status {
        company.status = v;
    }

    let updated = repo
        .update(&company)
        .await?
        .ok_or_else(|| ApiError::not_found("Company not found"))?;

    Ok(Json(updated))
}

/// DELETE /api/companies/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;

    let removed = CompanyRepository::new(state.db.pool().clone())
        .delete(current.org_id(), id)
        .await?;
    if !removed {
        return Err(ApiError::not_found("Company not found"));
    }

    Ok(Json(json!({ "success": true, "message": "Company deleted" })))
}
