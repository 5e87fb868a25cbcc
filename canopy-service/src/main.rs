//! Canopy Service - HTTP query API over a tree detection database.
//!
//! Read-only JSON API serving species, tree, image and statistics queries
//! from a SQLite database produced by the detection pipeline.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CANOPY_DB_PATH` | Path to the tree detection SQLite database | Required |
//! | `CANOPY_PORT` | HTTP server port | 8080 |
//! | `CANOPY_EXPOSE_ERRORS` | Echo internal error text in 500 bodies (dev only) | false |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /` - Service banner
//! - `GET /api/info` - Endpoint map
//! - `GET /api/species` - Species with tree counts
//! - `GET /api/trees?page=X&per_page=Y` - Paginated tree listing
//! - `GET /api/trees/{id}` - Single tree detail
//! - `GET /api/trees/species/{species_id}` - Trees of one species
//! - `GET /api/trees/area?lat_min=..&lat_max=..&lon_min=..&lon_max=..` - Area search
//! - `GET /api/images` - Processed images
//! - `GET /api/stats` - Aggregate statistics

use std::net::SocketAddr;
use std::sync::Arc;

use canopy::TreeDb;
use canopy_service::{router, AppState};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canopy_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("CANOPY_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let expose_errors = std::env::var("CANOPY_EXPOSE_ERRORS")
        .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    // The database is required configuration: refuse to start without it
    // rather than failing on the first request.
    let db_path = std::env::var("CANOPY_DB_PATH").map_err(|_| {
        "CANOPY_DB_PATH is not set; point it at the tree detection database file"
    })?;

    let db = TreeDb::open(&db_path).await?;

    tracing::info!(
        db_path = %db_path,
        port = port,
        expose_errors = expose_errors,
        "Starting canopy service"
    );

    let state = Arc::new(AppState { db, expose_errors });

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
