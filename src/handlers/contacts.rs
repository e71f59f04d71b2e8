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
use crate::models::{contact, Contact};
use crate::repositories::ContactRepository;
use crate::validation;
use crate::AppState;

use super::{pagination_json, ListQuery};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub company_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub company_id: Option<Uuid>,
    pub tags: Option<Vec<String>>,
    pub status: Option<String>,
    pub assigned_to: Option<Uuid>,
}

fn validate_status(status: &str) -> Result<(), ApiError> {
    if contact::is_valid_status(status) {
        Ok(())
    } else {
        Err(ApiError::validation(format!("Unknown contact status: {}", status)))
    }
}

/// GET /api/contacts?page&limit&search
pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.pagination();
    let search = query.search_term();

    let result = ContactRepository::new(state.db.pool().clone())
        .list(current.org_id(), page, search.as_deref())
        .await?;

    Ok(Json(json!({
        "contacts": result.rows,
        "pagination": pagination_json(page, result.total),
    })))
}

/// GET /api/contacts/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let contact = ContactRepository::new(state.db.pool().clone())
        .find_by_id(current.org_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;

    Ok(Json(contact))
}

/// POST /api/contacts
pub async fn create(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;
    validation::validate_name("First name", &input.first_name)?;
    validation::validate_name("Last name", &input.last_name)?;
    if let Some(email) = &input.email {
        validation::validate_email(email)?;
    }
    let status = input.status.unwrap_or_else(|| "lead".to_string());
    validate_status(&status)?;

    let now = Utc::now();
    let contact = Contact {
        id: Uuid::new_v4(),
        organization_id: current.org_id(),
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        email: input.email.map(|e| e.trim().to_lowercase()),
        phone: input.phone,
        job_title: input.job_title,
        company_id: input.company_id,
        tags: input.tags.unwrap_or_default(),
        status,
        assigned_to: input.assigned_to,
        created_at: now,
        updated_at: now,
    };

    let created = ContactRepository::new(state.db.pool().clone())
        .insert(&contact)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/contacts/:id - Merge the partial update into the stored row
pub async fn update(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;

    let repo = ContactRepository::new(state.db.pool().clone());
    let mut contact = repo
        .find_by_id(current.org_id(), id)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;

    if let Some(v) = input.first_name {
        validation::validate_name("First name", &v)?;
        contact.first_name = v.trim().to_string();
    }
    if let Some(v) = input.last_name {
        validation::validate_name("Last name", &v)?;
        contact.last_name = v.trim().to_string();
    }
    if let Some(v) = input.email {
        validation::validate_email(&v)?;
        contact.email = Some(v.trim().to_lowercase());
    }
    if let Some(v) = input.phone {
        contact.phone = Some(v);
    }
    if let Some(v) = input.job_title {
        contact.job_title = Some(v);
    }
    if let Some(v) = input.company_id {
        contact.company_id = Some(v);
    }
    if let Some(v) = input.tags {
        contact.tags = v;
    }
    if let Some(v) = input.status {
        validate_status(&v)?;
        contact.status = v;
    }
    if let Some(v) = input.assigned_to {
        contact.assigned_to = Some(v);
    }

    let updated = repo
        .update(&contact)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact not found"))?;

    Ok(Json(updated))
}

/// DELETE /api/contacts/:id - Hard delete
pub async fn delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    current.require_write()?;

    let removed = ContactRepository::new(state.db.pool().clone())
        .delete(current.org_id(), id)
        .await?;
    if !removed {
        return Err(ApiError::not_found("Contact not found"));
    }

    Ok(Json(json!({ "success": true, "message": "Contact deleted" })))
}
