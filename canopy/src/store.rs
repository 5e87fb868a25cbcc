//! Read-only access to the tree detection database.
//!
//! This module provides [`TreeDb`], a handle over a SQLite connection pool
//! exposing one method per read intent. Each call checks a connection out of
//! the pool for exactly the duration of its queries; a failed query returns
//! the connection on drop, so errors never leak connections.
//!
//! The database is opened read-only: this layer never creates, mutates, or
//! deletes anything.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use crate::error::{Result, StoreError};
use crate::models::{
    AreaBounds, ConfidenceStats, ImageRecord, SpeciesCount, SpeciesRecord, Statistics, TreeDetail,
    TreeSummary,
};
use crate::pagination::Page;

/// Handle to the tree detection database.
///
/// Cheap to clone; all clones share one connection pool.
///
/// # Example
///
/// ```ignore
/// use canopy::TreeDb;
///
/// let db = TreeDb::open("tree_detection.db").await?;
/// let total = db.total_tree_count().await?;
/// println!("{total} trees detected");
/// ```
#[derive(Debug, Clone)]
pub struct TreeDb {
    pool: SqlitePool,
}

impl TreeDb {
    /// Open the database at `path` read-only.
    ///
    /// Fails with [`StoreError::DatabaseNotFound`] if the file does not
    /// exist, so a misconfigured deployment is caught at startup rather than
    /// on the first request.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(StoreError::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .journal_mode(SqliteJournalMode::Delete);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    // ------------------------------------------------------------------
    // Species
    // ------------------------------------------------------------------

    /// All species with their detected-tree counts, in insertion order.
    ///
    /// LEFT JOIN semantics: a species with no detections appears with
    /// `tree_count` 0.
    pub async fn all_species(&self) -> Result<Vec<SpeciesRecord>> {
        let species = sqlx::query_as::<_, SpeciesRecord>(
            r#"
            SELECT
                s.species_id,
                s.common_name,
                s.scientific_name,
                s.average_height_m,
                s.crown_diameter_m,
                s.description,
                COUNT(t.tree_id) AS tree_count
            FROM species s
            LEFT JOIN trees t ON s.species_id = t.species_id
            GROUP BY s.species_id
            ORDER BY s.species_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(species)
    }

    // ------------------------------------------------------------------
    // Trees
    // ------------------------------------------------------------------

    /// Total number of detected trees.
    pub async fn total_tree_count(&self) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trees")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    /// One page of the full tree listing, ordered by `tree_id`.
    ///
    /// `total` is counted over the whole table, so a page past the end is an
    /// empty page with the correct totals. Assumes `page >= 1` and
    /// `per_page >= 1` (validated at the API boundary).
    pub async fn trees_paginated(&self, page: u32, per_page: u32) -> Result<Page<TreeSummary>> {
        let total = self.total_tree_count().await?;

        let trees = sqlx::query_as::<_, TreeSummary>(
            r#"
            SELECT
                tree_id,
                species_name,
                scientific_name,
                gps_lat,
                gps_lon,
                detection_confidence,
                estimated_height_m,
                source_image
            FROM trees_full_info
            ORDER BY tree_id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(i64::from(per_page))
        .bind(Page::<TreeSummary>::offset(page, per_page))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(page, per_page, total, trees))
    }

    /// Full detail for one tree, or `None` if no such tree exists.
    ///
    /// Inner joins against species and images: a tree with a dangling
    /// foreign key is not retrievable and yields `None`, not an error.
    pub async fn tree_by_id(&self, tree_id: i64) -> Result<Option<TreeDetail>> {
        let tree = sqlx::query_as::<_, TreeDetail>(
            r#"
            SELECT
                t.tree_id,
                t.image_id,
                t.species_id,
                s.common_name AS species_name,
                s.scientific_name,
                t.bbox_x_center,
                t.bbox_y_center,
                t.bbox_width,
                t.bbox_height,
                t.gps_lat,
                t.gps_lon,
                t.detection_confidence,
                t.estimated_height_m,
                t.estimated_crown_diameter_m,
                t.detection_date,
                i.filename AS source_image
            FROM trees t
            JOIN species s ON t.species_id = s.species_id
            JOIN images i ON t.image_id = i.image_id
            WHERE t.tree_id = ?
            "#,
        )
        .bind(tree_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tree)
    }

    /// One page of trees of the given species, ordered by `tree_id`.
    ///
    /// `total` counts only trees of that species. An unknown species yields
    /// an empty page with total 0, not an error.
    pub async fn trees_by_species(
        &self,
        species_id: i64,
        page: u32,
        per_page: u32,
    ) -> Result<Page<TreeSummary>> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trees WHERE species_id = ?")
                .bind(species_id)
                .fetch_one(&self.pool)
                .await?;

        let trees = sqlx::query_as::<_, TreeSummary>(
            r#"
            SELECT
                tree_id,
                species_name,
                scientific_name,
                gps_lat,
                gps_lon,
                detection_confidence,
                estimated_height_m,
                source_image
            FROM trees_full_info
            WHERE species_id = ?
            ORDER BY tree_id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(species_id)
        .bind(i64::from(per_page))
        .bind(Page::<TreeSummary>::offset(page, per_page))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(page, per_page, total, trees))
    }

    /// All trees whose GPS position falls inside the given box, ordered by
    /// `tree_id`. Bounds are inclusive on both axes.
    pub async fn trees_in_area(&self, bounds: &AreaBounds) -> Result<Vec<TreeSummary>> {
        let trees = sqlx::query_as::<_, TreeSummary>(
            r#"
            SELECT
                tree_id,
                species_name,
                scientific_name,
                gps_lat,
                gps_lon,
                detection_confidence,
                estimated_height_m,
                source_image
            FROM trees_full_info
            WHERE gps_lat BETWEEN ? AND ?
              AND gps_lon BETWEEN ? AND ?
            ORDER BY tree_id
            "#,
        )
        .bind(bounds.lat_min)
        .bind(bounds.lat_max)
        .bind(bounds.lon_min)
        .bind(bounds.lon_max)
        .fetch_all(&self.pool)
        .await?;

        Ok(trees)
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    /// All processed images, ordered by detected-tree count descending.
    pub async fn all_images(&self) -> Result<Vec<ImageRecord>> {
        let images = sqlx::query_as::<_, ImageRecord>(
            r#"
            SELECT
                image_id,
                filename,
                width,
                height,
                gps_center_lat,
                gps_center_lon,
                meters_per_pixel,
                total_trees_detected,
                coverage_area_m2,
                processing_date
            FROM images
            ORDER BY total_trees_detected DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    /// Aggregate statistics over trees, images and species.
    pub async fn statistics(&self) -> Result<Statistics> {
        let total_trees = self.total_tree_count().await?;
        let total_images = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM images")
            .fetch_one(&self.pool)
            .await?;

        let species_distribution = sqlx::query_as::<_, SpeciesCount>(
            r#"
            SELECT
                s.common_name,
                COUNT(t.tree_id) AS count,
                ROUND(AVG(t.detection_confidence) * 100, 2) AS avg_confidence
            FROM species s
            LEFT JOIN trees t ON s.species_id = t.species_id
            GROUP BY s.species_id
            ORDER BY count DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let confidence = sqlx::query_as::<_, ConfidenceRow>(
            r#"
            SELECT
                ROUND(AVG(detection_confidence) * 100, 2) AS avg_confidence,
                ROUND(MIN(detection_confidence) * 100, 2) AS min_confidence,
                ROUND(MAX(detection_confidence) * 100, 2) AS max_confidence
            FROM trees
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let average_trees_per_image = if total_images > 0 {
            (total_trees as f64 / total_images as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };

        Ok(Statistics {
            total_trees,
            total_images,
            average_trees_per_image,
            species_distribution,
            confidence_stats: confidence.into_stats(),
        })
    }
}

/// Aggregates over an empty `trees` table are all NULL; collapse that into
/// an absent [`ConfidenceStats`].
#[derive(FromRow)]
struct ConfidenceRow {
    avg_confidence: Option<f64>,
    min_confidence: Option<f64>,
    max_confidence: Option<f64>,
}

impl ConfidenceRow {
    fn into_stats(self) -> Option<ConfidenceStats> {
        match (self.avg_confidence, self.min_confidence, self.max_confidence) {
            (Some(avg), Some(min), Some(max)) => Some(ConfidenceStats {
                avg_confidence: avg,
                min_confidence: min,
                max_confidence: max,
            }),
            _ => None,
        }
    }
}
