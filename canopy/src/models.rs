//! Record types returned by the query layer.
//!
//! Every multi-row operation returns records already shaped for direct JSON
//! serialization; callers never see raw driver rows and never re-join or
//! re-aggregate.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A species together with the number of detected trees referencing it.
///
/// Produced by a LEFT JOIN, so a species with no detections still appears
/// with `tree_count` 0.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SpeciesRecord {
    pub species_id: i64,
    pub common_name: String,
    pub scientific_name: String,
    /// Typical adult height in meters.
    pub average_height_m: f64,
    /// Typical crown diameter in meters.
    pub crown_diameter_m: f64,
    pub description: Option<String>,
    pub tree_count: i64,
}

/// One row of the `trees_full_info` view: a detected tree flattened with its
/// species names and source image filename. Used by every listing and search
/// operation.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TreeSummary {
    pub tree_id: i64,
    pub species_name: String,
    pub scientific_name: String,
    pub gps_lat: f64,
    pub gps_lon: f64,
    /// Model-assigned probability in [0,1] that this detection is a real tree.
    pub detection_confidence: f64,
    pub estimated_height_m: f64,
    pub source_image: String,
}

/// Full detail for a single tree, including its normalized bounding box
/// within the source image.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TreeDetail {
    pub tree_id: i64,
    pub image_id: i64,
    pub species_id: i64,
    pub species_name: String,
    pub scientific_name: String,
    /// Bounding box center/size, normalized to [0,1] of the source image.
    pub bbox_x_center: f64,
    pub bbox_y_center: f64,
    pub bbox_width: f64,
    pub bbox_height: f64,
    pub gps_lat: f64,
    pub gps_lon: f64,
    pub detection_confidence: f64,
    pub estimated_height_m: f64,
    pub estimated_crown_diameter_m: f64,
    /// ISO-8601 timestamp of the detection run.
    pub detection_date: String,
    pub source_image: String,
}

/// A processed source image and its detection summary.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ImageRecord {
    pub image_id: i64,
    pub filename: String,
    /// Pixel dimensions of the source image.
    pub width: i64,
    pub height: i64,
    pub gps_center_lat: f64,
    pub gps_center_lon: f64,
    pub meters_per_pixel: f64,
    /// Denormalized counter maintained by the ingestion pipeline.
    pub total_trees_detected: i64,
    pub coverage_area_m2: f64,
    /// ISO-8601 timestamp of image processing.
    pub processing_date: String,
}

/// An axis-aligned latitude/longitude rectangle for area search.
///
/// Bounds are inclusive on both axes independently; this is a coordinate box
/// test, not a great-circle or polygon test.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AreaBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

/// Per-species slice of the statistics aggregate.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SpeciesCount {
    pub common_name: String,
    /// Number of detected trees of this species.
    pub count: i64,
    /// Average detection confidence as a percentage, rounded to two decimals.
    /// `None` for species with no detections.
    pub avg_confidence: Option<f64>,
}

/// Detection-confidence aggregate across all trees, each value a percentage
/// rounded to two decimals.
#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceStats {
    pub avg_confidence: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

/// The full statistics bundle served by `/api/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
    pub total_trees: i64,
    pub total_images: i64,
    /// total_trees / total_images rounded to one decimal; 0.0 when there are
    /// no images.
    pub average_trees_per_image: f64,
    /// Per-species counts ordered by count descending.
    pub species_distribution: Vec<SpeciesCount>,
    /// `None` (serialized as null) when there are no trees at all.
    pub confidence_stats: Option<ConfidenceStats>,
}
