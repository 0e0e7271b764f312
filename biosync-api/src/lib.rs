//! biosync-api library - Registry specimen API service
//!
//! Accepts nested specimen upserts from the lab's API pipeline and exposes
//! the narrower point-update surface (status, disposal, attributes, single
//! aliquots) used by downstream integrations.

use axum::Router;
use sqlx::SqlitePool;

pub mod api;
pub mod payload;
pub mod service;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post, put};
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/api/specimens", post(api::specimens::upsert_specimens))
        .route("/api/specimens/:rlims_id", get(api::specimens::get_specimen))
        .route(
            "/api/samples/:rlims_id/status",
            put(api::samples::put_status),
        )
        .route(
            "/api/samples/:rlims_id/disposal-status",
            put(api::samples::put_disposal_status),
        )
        .route(
            "/api/specimens/:rlims_id/attributes/:name",
            put(api::attributes::put_attribute).delete(api::attributes::delete_attribute),
        )
        .route(
            "/api/specimens/:parent_rlims_id/aliquots/:rlims_id",
            put(api::aliquots::put_aliquot),
        )
        .route("/api/participants", post(api::participants::post_participant))
        .route("/health", get(api::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
