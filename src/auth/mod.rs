pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::error::ApiError;

/// Signed token payload: identity, tenant and role. The role and tenant in
/// here are a snapshot; protected routes re-fetch the user from storage so
/// deactivation and role changes take effect before the token expires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub organization_id: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(sub: Uuid, email: String, organization_id: Uuid, role: String, ttl_days: i64) -> Self {
        let now = Utc::now();
        Self {
            sub,
            email,
            organization_id,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::days(ttl_days)).timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token signing secret not configured")]
    MissingSecret,
    #[error("Token generation failed: {0}")]
    Generation(String),
    #[error("Invalid token: {0}")]
    Invalid(String),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => ApiError::unauthorized("Invalid or expired token"),
            other => {
                tracing::error!("Token error: {}", other);
                ApiError::internal("Authentication is unavailable")
            }
        }
    }
}

/// Issue a signed token using the configured secret and lifetime
pub fn issue_token(claims: &Claims) -> Result<String, TokenError> {
    issue_with_secret(claims, &config::config().auth.jwt_secret)
}

/// Verify signature and expiry, returning the embedded claims
pub fn decode_token(token: &str) -> Result<Claims, TokenError> {
    decode_with_secret(token, &config::config().auth.jwt_secret)
}

pub fn issue_with_secret(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Generation(e.to_string()))
}

pub fn decode_with_secret(token: &str, secret: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| TokenError::Invalid(e.to_string()))?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims() -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "a@acme.com".into(),
            Uuid::new_v4(),
            "admin".into(),
            7,
        )
    }

    #[test]
    fn issued_token_decodes_to_same_claims() {
        let claims = claims();
        let token = issue_with_secret(&claims, "test-secret").unwrap();
        let decoded = decode_with_secret(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.organization_id, claims.organization_id);
        assert_eq!(decoded.role, "admin");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_with_secret(&claims(), "secret-a").unwrap();
        assert!(matches!(
            decode_with_secret(&token, "secret-b"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            decode_with_secret("not.a.jwt", "test-secret"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        assert!(matches!(
            issue_with_secret(&claims(), ""),
            Err(TokenError::MissingSecret)
        ));
    }

    #[test]
    fn lifetime_is_seven_days() {
        let claims = claims();
        let ttl = claims.exp - claims.iat;
        assert_eq!(ttl, 7 * 24 * 60 * 60);
    }
}
