pub mod auth;
pub mod rate_limit;

pub use auth::{require_auth, CurrentUser};
pub use rate_limit::RateLimiter;
