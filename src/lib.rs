pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Environment;
use crate::middleware::{rate_limit, require_auth, RateLimiter};

/// Process-wide state: the injected database handle. Constructed once in
/// main and passed into the router.
#[derive(Clone)]
pub struct AppState {
    pub db: db::Database,
}

pub fn router(state: AppState) -> Router {
    let cfg = config::config();
    let window = Duration::from_secs(cfg.api.rate_limit_window_secs);

    // Public auth routes carry the tight per-IP budget
    let mut auth_routes = Router::new()
        .route("/api/auth/register", axum::routing::post(handlers::auth::register))
        .route("/api/auth/login", axum::routing::post(handlers::auth::login));
    if cfg.api.enable_rate_limiting {
        let limiter = Arc::new(RateLimiter::new(cfg.api.auth_rate_limit, window));
        auth_routes = auth_routes.layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit::rate_limit,
        ));
    }

    let mut protected = Router::new()
        .route("/api/auth/verify", get(handlers::auth::verify))
        .route(
            "/api/contacts",
            get(handlers::contacts::list).post(handlers::contacts::create),
        )
        .route(
            "/api/contacts/:id",
            get(handlers::contacts::get)
                .put(handlers::contacts::update)
                .delete(handlers::contacts::delete),
        )
        .route("/api/companies/list", get(handlers::companies::list_items))
        .route(
            "/api/companies",
            get(handlers::companies::list).post(handlers::companies::create),
        )
        .route(
            "/api/companies/:id",
            get(handlers::companies::get)
                .put(handlers::companies::update)
                .delete(handlers::companies::delete),
        )
        .route(
            "/api/deals",
            get(handlers::deals::list).post(handlers::deals::create),
        )
        .route(
            "/api/deals/:id",
            get(handlers::deals::get)
                .put(handlers::deals::update)
                .delete(handlers::deals::delete),
        )
        .route(
            "/api/activities",
            get(handlers::activities::list).post(handlers::activities::create),
        )
        .route(
            "/api/activities/:id",
            axum::routing::put(handlers::activities::update)
                .delete(handlers::activities::delete),
        )
        .route("/api/dashboard", get(handlers::dashboard::summary))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));
    if cfg.api.enable_rate_limiting {
        let limiter = Arc::new(RateLimiter::new(cfg.api.general_rate_limit, window));
        protected = protected.layer(axum::middleware::from_fn_with_state(
            limiter,
            rate_limit::rate_limit,
        ));
    }

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .merge(auth_routes)
        .merge(protected)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive in development only; elsewhere origins come from config
fn cors_layer() -> CorsLayer {
    let cfg = config::config();
    if cfg.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cfg
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
