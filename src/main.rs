use std::net::SocketAddr;

use crm_api::db::Database;
use crm_api::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = crm_api::config::config();
    tracing::info!("Starting CRM API in {:?} mode", config.environment);

    let db = Database::connect().unwrap_or_else(|e| panic!("database setup failed: {}", e));
    if let Err(e) = db.ensure_schema().await {
        // Keep serving; /api/health reports degraded until the database is back
        tracing::warn!("Schema bootstrap failed, continuing without it: {}", e);
    }

    let app = crm_api::router(AppState { db });

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("CRM API listening on http://{}", bind_addr);

    // Connect info feeds the per-IP rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server");
}
