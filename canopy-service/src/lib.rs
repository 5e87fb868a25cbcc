//! Canopy Service Library
//!
//! HTTP handlers, response envelopes and router for the tree detection API.
//! This library is used by both the canopy-service binary and the
//! integration tests, so both drive exactly the same app.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use canopy::TreeDb;

/// Application state shared across handlers.
pub struct AppState {
    /// Read-only handle to the tree detection database.
    pub db: TreeDb,
    /// Echo internal error text in 500 bodies (development only).
    pub expose_errors: bool,
}

/// Build the API router over the given state.
///
/// Middleware (CORS, request tracing) is layered on by the caller.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/api/info", get(handlers::api_info))
        .route("/api/species", get(handlers::list_species))
        .route("/api/trees", get(handlers::list_trees))
        .route("/api/trees/area", get(handlers::trees_in_area))
        .route("/api/trees/:tree_id", get(handlers::get_tree))
        .route("/api/trees/species/:species_id", get(handlers::trees_by_species))
        .route("/api/images", get(handlers::list_images))
        .route("/api/stats", get(handlers::get_stats))
        .fallback(handlers::endpoint_not_found)
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    AreaQuery, AreaResponse, ErrorResponse, ImageListResponse, PaginationQuery,
    SpeciesListResponse, SpeciesTreePageResponse, StatsResponse, TreeDetailResponse,
    TreePageResponse,
};
