use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth;
use crate::error::ApiError;
use crate::models::{Organization, Role, User};
use crate::services::AuthService;
use crate::AppState;

/// Authenticated caller attached to every protected request.
/// Sourced fresh from storage on each request, not from token claims, so
/// deactivation and role changes take effect before the token expires.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub user: User,
    pub organization: Organization,
}

impl CurrentUser {
    pub fn org_id(&self) -> uuid::Uuid {
        self.organization.id
    }

    /// Reject read-only callers on mutating routes
    pub fn require_write(&self) -> Result<(), ApiError> {
        let can_write = self.user.role().map(|r| r.can_write()).unwrap_or(false);
        if can_write {
            Ok(())
        } else {
            Err(ApiError::forbidden("Your role does not allow this action"))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.role() == Some(Role::Admin)
    }
}

/// Bearer-token authentication middleware for all /api routes except auth
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers)?;
    let claims = auth::decode_token(&token)?;

    let (user, organization) = AuthService::new(state.db.clone()).verify(&claims).await?;
    request
        .extensions_mut()
        .insert(CurrentUser { user, organization });

    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        )),
    }
}
