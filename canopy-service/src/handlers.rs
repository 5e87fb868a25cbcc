//! HTTP request handlers for the tree detection API.
//!
//! Every handler follows the same shape: extract and validate parameters,
//! make exactly one call into the data-access layer, and wrap the result in
//! the standard `{"success": ...}` envelope. Validation failures are client
//! errors (400/404) raised here; data-access failures become a generic 500.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use canopy::{
    AreaBounds, ImageRecord, SpeciesRecord, Statistics, StoreError, TreeDetail, TreeSummary,
};

use crate::AppState;

/// Pagination parameters for listing endpoints.
///
/// Both are optional; defaults are page 1, 50 per page. Values that are
/// present but non-numeric fail extraction and are rejected with 400 rather
/// than silently defaulted.
#[derive(Debug, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Query parameters for the area-search endpoint.
///
/// All four bounds are required. Presence is tested with `Option::is_some`,
/// so a coordinate of exactly 0.0 is a supplied value, not a missing one.
#[derive(Debug, Deserialize)]
pub struct AreaQuery {
    pub lat_min: Option<f64>,
    pub lat_max: Option<f64>,
    pub lon_min: Option<f64>,
    pub lon_max: Option<f64>,
}

/// Failure envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// `GET /api/species` response.
#[derive(Debug, Serialize)]
pub struct SpeciesListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<SpeciesRecord>,
}

/// `GET /api/trees` response.
#[derive(Debug, Serialize)]
pub struct TreePageResponse {
    pub success: bool,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
    pub count: usize,
    pub data: Vec<TreeSummary>,
}

/// `GET /api/trees/species/{species_id}` response.
#[derive(Debug, Serialize)]
pub struct SpeciesTreePageResponse {
    pub success: bool,
    pub species_id: i64,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
    pub count: usize,
    pub data: Vec<TreeSummary>,
}

/// `GET /api/trees/{id}` response.
#[derive(Debug, Serialize)]
pub struct TreeDetailResponse {
    pub success: bool,
    pub data: TreeDetail,
}

/// `GET /api/trees/area` response.
#[derive(Debug, Serialize)]
pub struct AreaResponse {
    pub success: bool,
    pub area: AreaBounds,
    pub count: usize,
    pub data: Vec<TreeSummary>,
}

/// `GET /api/images` response.
#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<ImageRecord>,
}

/// `GET /api/stats` response.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: Statistics,
}

/// Service banner at `/`.
pub async fn home() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Tree Detection API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "api_info": "/api/info",
            "documentation": "See /api/info for all endpoints"
        }
    }))
}

/// Endpoint map at `/api/info`.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Tree Detection API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "species": "/api/species",
            "trees": "/api/trees?page=1&per_page=50",
            "tree_by_id": "/api/trees/{id}",
            "trees_by_species": "/api/trees/species/{species_id}",
            "area_search": "/api/trees/area?lat_min=9.93&lat_max=9.94&lon_min=-84.09&lon_max=-84.08",
            "images": "/api/images",
            "statistics": "/api/stats"
        }
    }))
}

/// `GET /api/species` - all species with their tree counts.
pub async fn list_species(State(state): State<Arc<AppState>>) -> Response {
    match state.db.all_species().await {
        Ok(species) => (
            StatusCode::OK,
            Json(SpeciesListResponse {
                success: true,
                count: species.len(),
                data: species,
            }),
        )
            .into_response(),
        Err(e) => internal_error(&state, e),
    }
}

/// `GET /api/trees?page=1&per_page=50` - paginated tree listing.
pub async fn list_trees(
    State(state): State<Arc<AppState>>,
    params: Result<Query<PaginationQuery>, QueryRejection>,
) -> Response {
    let (page, per_page) = match parse_pagination(params) {
        Ok(p) => p,
        Err(response) => return response,
    };

    tracing::debug!(page, per_page, "Tree listing query");

    match state.db.trees_paginated(page, per_page).await {
        Ok(result) => (
            StatusCode::OK,
            Json(TreePageResponse {
                success: true,
                page: result.page,
                per_page: result.per_page,
                total: result.total,
                total_pages: result.total_pages,
                count: result.items.len(),
                data: result.items,
            }),
        )
            .into_response(),
        Err(e) => internal_error(&state, e),
    }
}

/// `GET /api/trees/{id}` - full detail for one tree.
pub async fn get_tree(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let Path(tree_id) = match path {
        Ok(path) => path,
        Err(_) => return bad_request("Invalid tree id: must be an integer"),
    };

    match state.db.tree_by_id(tree_id).await {
        Ok(Some(tree)) => (
            StatusCode::OK,
            Json(TreeDetailResponse {
                success: true,
                data: tree,
            }),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                success: false,
                error: format!("Tree with ID {tree_id} not found"),
            }),
        )
            .into_response(),
        Err(e) => internal_error(&state, e),
    }
}

/// `GET /api/trees/species/{species_id}` - paginated listing of one species.
pub async fn trees_by_species(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    params: Result<Query<PaginationQuery>, QueryRejection>,
) -> Response {
    let Path(species_id) = match path {
        Ok(path) => path,
        Err(_) => return bad_request("Invalid species id: must be an integer"),
    };
    let (page, per_page) = match parse_pagination(params) {
        Ok(p) => p,
        Err(response) => return response,
    };

    tracing::debug!(species_id, page, per_page, "Trees-by-species query");

    match state.db.trees_by_species(species_id, page, per_page).await {
        Ok(result) => (
            StatusCode::OK,
            Json(SpeciesTreePageResponse {
                success: true,
                species_id,
                page: result.page,
                per_page: result.per_page,
                total: result.total,
                total_pages: result.total_pages,
                count: result.items.len(),
                data: result.items,
            }),
        )
            .into_response(),
        Err(e) => internal_error(&state, e),
    }
}

/// `GET /api/trees/area?lat_min=..&lat_max=..&lon_min=..&lon_max=..` -
/// unpaginated search inside an axis-aligned coordinate box.
pub async fn trees_in_area(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AreaQuery>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(query) => query,
        Err(_) => return bad_request("Invalid coordinates: lat/lon bounds must be numeric"),
    };

    let (Some(lat_min), Some(lat_max), Some(lon_min), Some(lon_max)) =
        (params.lat_min, params.lat_max, params.lon_min, params.lon_max)
    else {
        return bad_request("Required parameters: lat_min, lat_max, lon_min, lon_max");
    };

    if lat_min >= lat_max || lon_min >= lon_max {
        return bad_request("Invalid ranges: lat_min < lat_max and lon_min < lon_max required");
    }

    let bounds = AreaBounds {
        lat_min,
        lat_max,
        lon_min,
        lon_max,
    };

    tracing::debug!(
        lat_min = bounds.lat_min,
        lat_max = bounds.lat_max,
        lon_min = bounds.lon_min,
        lon_max = bounds.lon_max,
        "Area search"
    );

    match state.db.trees_in_area(&bounds).await {
        Ok(trees) => (
            StatusCode::OK,
            Json(AreaResponse {
                success: true,
                area: bounds,
                count: trees.len(),
                data: trees,
            }),
        )
            .into_response(),
        Err(e) => internal_error(&state, e),
    }
}

/// `GET /api/images` - all processed images, most detections first.
pub async fn list_images(State(state): State<Arc<AppState>>) -> Response {
    match state.db.all_images().await {
        Ok(images) => (
            StatusCode::OK,
            Json(ImageListResponse {
                success: true,
                count: images.len(),
                data: images,
            }),
        )
            .into_response(),
        Err(e) => internal_error(&state, e),
    }
}

/// `GET /api/stats` - aggregate statistics.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Response {
    match state.db.statistics().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(StatsResponse {
                success: true,
                data: stats,
            }),
        )
            .into_response(),
        Err(e) => internal_error(&state, e),
    }
}

/// Fallback for unmatched paths.
pub async fn endpoint_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            error: "Endpoint not found. See /api/info for available endpoints".to_string(),
        }),
    )
        .into_response()
}

/// Extract and bounds-check pagination parameters.
fn parse_pagination(
    params: Result<Query<PaginationQuery>, QueryRejection>,
) -> Result<(u32, u32), Response> {
    let Query(params) = params
        .map_err(|_| bad_request("Invalid parameters: page and per_page must be integers"))?;

    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(50);

    if page < 1 || per_page < 1 || per_page > 100 {
        return Err(bad_request(
            "Invalid parameters: page >= 1, 1 <= per_page <= 100",
        ));
    }

    Ok((page, per_page))
}

/// 400 envelope with a message naming the failed constraint.
fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            success: false,
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// 500 envelope. The underlying error is logged, never echoed to the client
/// unless the development-mode flag is set.
fn internal_error(state: &AppState, e: StoreError) -> Response {
    tracing::error!(error = %e, "Data access failed");

    let message = if state.expose_errors {
        e.to_string()
    } else {
        "Internal server error".to_string()
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            success: false,
            error: message,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_query_deserialize() {
        let query: PaginationQuery = serde_json::from_str(r#"{"page": 2, "per_page": 25}"#).unwrap();
        assert_eq!(query.page, Some(2));
        assert_eq!(query.per_page, Some(25));

        let query: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert!(query.page.is_none());
        assert!(query.per_page.is_none());
    }

    #[test]
    fn test_area_query_zero_is_present() {
        let query: AreaQuery =
            serde_json::from_str(r#"{"lat_min": 0.0, "lat_max": 1.0, "lon_min": 0.0, "lon_max": 1.0}"#)
                .unwrap();
        assert_eq!(query.lat_min, Some(0.0));
        assert_eq!(query.lon_min, Some(0.0));
    }

    #[test]
    fn test_error_response_serialize() {
        let response = ErrorResponse {
            success: false,
            error: "Tree with ID 9999 not found".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("9999"));
    }
}
