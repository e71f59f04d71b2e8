//! Password hashing. bcrypt with the configured cost factor (12 by
//! default); the plaintext is never stored or logged.

use crate::config;
use crate::error::ApiError;

pub fn hash(password: &str) -> Result<String, ApiError> {
    hash_with_cost(password, config::config().auth.bcrypt_cost)
}

pub fn hash_with_cost(password: &str, cost: u32) -> Result<String, ApiError> {
    bcrypt::hash(password, cost).map_err(|e| {
        tracing::error!("Password hashing failed: {}", e);
        ApiError::internal("An error occurred while processing your request")
    })
}

pub fn verify(password: &str, hashed: &str) -> Result<bool, ApiError> {
    bcrypt::verify(password, hashed).map_err(|e| {
        tracing::error!("Password verification failed: {}", e);
        ApiError::internal("An error occurred while processing your request")
    })
}
