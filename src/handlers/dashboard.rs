use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::services::DashboardService;
use crate::AppState;

/// GET /api/dashboard - Tenant summary statistics, computed on demand
pub async fn summary(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let data = DashboardService::new(state.db.clone())
        .summary(current.org_id())
        .await?;
    Ok(Json(data))
}
