use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthService, LoginInput, RegisterInput};
use crate::AppState;

/// POST /api/auth/register - Create a tenant plus its admin user
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = AuthService::new(state.db.clone()).register(input).await?;
    Ok((StatusCode::CREATED, Json(payload)))
}

/// POST /api/auth/login - Authenticate credentials and issue a token
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = AuthService::new(state.db.clone()).login(input).await?;
    Ok(Json(payload))
}

/// GET /api/auth/verify - Return the caller's current user and organization.
/// The auth middleware has already re-fetched both from storage, so a
/// deactivated user never reaches this handler.
pub async fn verify(Extension(current): Extension<CurrentUser>) -> impl IntoResponse {
    Json(json!({
        "user": current.user.to_safe(),
        "organization": current.organization,
    }))
}
