use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;

/// Fixed-window request limiter keyed by client IP. Enforced at the
/// boundary; core logic never sees rate-limited requests.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request for `key`; error once the window budget is spent
    pub fn check(&self, key: &str) -> Result<(), ApiError> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), ApiError> {
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| ApiError::internal("Rate limiter unavailable"))?;

        // Drop expired windows so the map stays bounded by clients active
        // within the current window, not every IP ever seen
        windows.retain(|_, (start, _)| now.duration_since(*start) < self.window);

        let entry = windows.entry(key.to_string()).or_insert((now, 0));
        if entry.1 >= self.limit {
            return Err(ApiError::too_many_requests(
                "Too many requests, please try again later",
            ));
        }

        entry.1 += 1;
        Ok(())
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    limiter.check(&key)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let t0 = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("1.2.3.4", t0).is_ok());
        }
        assert!(limiter.check_at("1.2.3.4", t0).is_err());

        // A different client has its own budget
        assert!(limiter.check_at("5.6.7.8", t0).is_ok());
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();

        assert!(limiter.check_at("1.2.3.4", t0).is_ok());
        assert!(limiter.check_at("1.2.3.4", t0).is_err());

        let later = t0 + Duration::from_secs(61);
        assert!(limiter.check_at("1.2.3.4", later).is_ok());
    }

    #[test]
    fn expired_windows_are_evicted() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let t0 = Instant::now();

        for i in 0..1000 {
            assert!(limiter.check_at(&format!("10.0.{}.{}", i / 256, i % 256), t0).is_ok());
        }
        assert_eq!(limiter.tracked(), 1000);

        // One request after expiry leaves only the active window behind
        let later = t0 + Duration::from_secs(61);
        assert!(limiter.check_at("fresh-client", later).is_ok());
        assert_eq!(limiter.tracked(), 1);
    }
}
