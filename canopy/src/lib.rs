//! # Canopy - Tree Detection Query Library
//!
//! Read-only query layer over a SQLite database of geotagged tree detections
//! produced by an aerial-imagery detection pipeline.
//!
//! The database holds three base tables — `species`, `images`, `trees` — plus
//! a denormalized view `trees_full_info` joining trees to their species and
//! source image. This crate never writes to it: every operation is a
//! parameterized SELECT mapped into plain serializable records.
//!
//! ## Quick Start
//!
//! ```ignore
//! use canopy::TreeDb;
//!
//! let db = TreeDb::open("tree_detection.db").await?;
//!
//! // Paginated listing
//! let page = db.trees_paginated(1, 50).await?;
//! println!("{} of {} trees", page.items.len(), page.total);
//!
//! // Axis-aligned area search
//! let bounds = canopy::AreaBounds {
//!     lat_min: 9.93, lat_max: 9.94,
//!     lon_min: -84.09, lon_max: -84.08,
//! };
//! let trees = db.trees_in_area(&bounds).await?;
//! ```
//!
//! ## Schema Expectations
//!
//! The database file is created and populated by the ingestion pipeline, not
//! by this crate. Opening a path that does not exist fails immediately with
//! [`StoreError::DatabaseNotFound`] so a misconfigured service refuses to
//! start instead of failing per request.

pub mod error;
pub mod models;
pub mod pagination;
pub mod store;

// Re-export main types at crate root for convenience
pub use error::{Result, StoreError};
pub use models::{
    AreaBounds, ConfidenceStats, ImageRecord, SpeciesCount, SpeciesRecord, Statistics, TreeDetail,
    TreeSummary,
};
pub use pagination::Page;
pub use store::TreeDb;
