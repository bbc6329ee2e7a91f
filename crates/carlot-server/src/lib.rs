//! Carlot server library logic.

pub mod api;
pub mod api_cars;
pub mod config;

use axum::{extract::DefaultBodyLimit, routing::get, Extension, Json, Router};
use carlot_db::{BootstrapError, DbPool, PoolError};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: DbPool,
}

/// Errors that stop the server before it accepts traffic.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("failed to get database connection for bootstrap: {0}")]
    Connection(#[from] r2d2::Error),
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}

/// Opens the pool described by `config` and resets the `cars` table.
///
/// The table is dropped, recreated and seeded before this returns, so the
/// resulting state is ready to serve.
///
/// # Errors
///
/// Returns `StartupError` if the database cannot be opened or bootstrapped.
pub fn init_state(config: &config::DatabaseConfig) -> Result<AppState, StartupError> {
    let pool = carlot_db::create_pool(&config.path, config.runtime_settings())?;

    {
        let conn = pool.get()?;
        let seeded = carlot_db::bootstrap(&conn)?;
        tracing::info!(path = %config.path, seeded, "database bootstrapped");
    }

    Ok(AppState { pool })
}

/// Maximum request body size (64 KiB). Car bodies are a few dozen bytes.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/cars",
            get(api_cars::list_cars_handler)
                .post(api_cars::create_car_handler)
                .put(api_cars::replace_car_handler),
        )
        .route("/cars/average", get(api_cars::average_handler))
        .route("/cars/average-sql", get(api_cars::average_sql_handler))
        .route("/cars/newest", get(api_cars::newest_handler))
        .route("/cars/newest-sql", get(api_cars::newest_sql_handler))
        .route(
            "/cars/{plate}",
            get(api_cars::get_car_handler)
                .patch(api_cars::patch_car_handler)
                .delete(api_cars::delete_car_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
