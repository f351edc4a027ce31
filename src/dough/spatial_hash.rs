//! Uniform spatial hash grid over the dough's bounding volume.
//!
//! Maps world positions into fixed-size cells and keeps a bucket of vertex
//! indices per occupied cell. Queries are broad-phase: they return every
//! payload in the cells covering the query region, with no exact distance
//! or containment filter — callers narrow the candidates themselves.

use std::collections::HashMap;
use std::fmt;

use bevy::math::bounding::Aabb3d;
use bevy::math::{IVec3, Vec3, Vec3A};
use bevy_log::warn;
use serde::{Deserialize, Serialize};

/// Spatial hash table for broad-phase neighbor queries over dough vertices.
///
/// The grid is sized once against the bounds it is constructed with and
/// never grows. Positions outside the bounds are not rejected — they are
/// clamped into the nearest edge cell, so boundary buckets can accumulate
/// out-of-bounds clusters. Passing non-finite positions is a precondition
/// violation and not guarded against.
#[derive(Debug, Clone)]
pub struct SpatialHash {
    /// Cell hash to payload bucket. Bucket order is insertion order and
    /// duplicates are permitted.
    table: HashMap<i32, Vec<usize>>,
    cell_size: f32,
    bounds: Aabb3d,
    /// Cell counts per axis, each at least 1 even for flat bounds.
    grid_size: IVec3,
}

impl SpatialHash {
    /// Builds a grid over `bounds` with the given cell size.
    ///
    /// # Panics
    /// Panics if `cell_size` is not strictly positive.
    pub fn new(bounds: Aabb3d, cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "spatial hash cell size must be positive");

        let size = bounds.max - bounds.min;
        let raw = IVec3::new(
            (size.x / cell_size).ceil() as i32,
            (size.y / cell_size).ceil() as i32,
            (size.z / cell_size).ceil() as i32,
        );
        // A zero-extent bounds axis (a flat sheet has no Y extent) would
        // yield zero cells and break the clamp below, so every axis keeps
        // at least one cell.
        let grid_size = raw.max(IVec3::ONE);
        if grid_size != raw {
            warn!(
                "spatial hash bounds have a degenerate axis, clamping grid size {raw} to {grid_size}"
            );
        }

        Self {
            table: HashMap::new(),
            cell_size,
            bounds,
            grid_size,
        }
    }

    /// Empties every bucket while keeping keys and allocated capacity.
    pub fn clear(&mut self) {
        for bucket in self.table.values_mut() {
            bucket.clear();
        }
    }

    /// Inserts a payload (typically a vertex index) at a world position.
    /// Positions outside the bounds land in the nearest edge cell.
    pub fn insert(&mut self, position: Vec3, payload: usize) {
        let hash = self.cell_to_hash(self.world_to_grid(position));
        self.table.entry(hash).or_default().push(payload);
    }

    /// Collects every payload whose cell overlaps the sphere's covering
    /// cell range into `results` (cleared first).
    ///
    /// Broad-phase only: candidates are not filtered against the radius,
    /// so anything sharing a covering cell is returned.
    pub fn query_sphere(&self, center: Vec3, radius: f32, results: &mut Vec<usize>) {
        let extent = Vec3::splat(radius);
        self.query_cell_range(center - extent, center + extent, results);
    }

    /// Collects every payload whose cell overlaps the box's covering cell
    /// range into `results` (cleared first). Broad-phase, like
    /// [`query_sphere`](Self::query_sphere).
    pub fn query_box(&self, center: Vec3, half_extents: Vec3, results: &mut Vec<usize>) {
        self.query_cell_range(center - half_extents, center + half_extents, results);
    }

    fn query_cell_range(&self, min_pos: Vec3, max_pos: Vec3, results: &mut Vec<usize>) {
        results.clear();

        let min_cell = self.world_to_grid(min_pos);
        let max_cell = self.world_to_grid(max_pos);

        for x in min_cell.x..=max_cell.x {
            for y in min_cell.y..=max_cell.y {
                for z in min_cell.z..=max_cell.z {
                    let hash = self.cell_to_hash(IVec3::new(x, y, z));
                    if let Some(bucket) = self.table.get(&hash) {
                        results.extend_from_slice(bucket);
                    }
                }
            }
        }
    }

    /// World position to (unclamped) grid cell coordinates.
    fn world_to_grid(&self, world_pos: Vec3) -> IVec3 {
        let local = Vec3A::from(world_pos) - self.bounds.min;

        IVec3::new(
            (local.x / self.cell_size).floor() as i32,
            (local.y / self.cell_size).floor() as i32,
            (local.z / self.cell_size).floor() as i32,
        )
    }

    /// Grid cell to bucket key. Clamps into `[0, grid_size - 1]` per axis
    /// first, so every key corresponds to a cell inside the grid.
    fn cell_to_hash(&self, cell: IVec3) -> i32 {
        let cell = cell.clamp(IVec3::ZERO, self.grid_size - IVec3::ONE);

        cell.x + cell.y * self.grid_size.x + cell.z * self.grid_size.x * self.grid_size.y
    }

    /// Snapshot of the table's occupancy for diagnostics.
    pub fn stats(&self) -> SpatialHashStats {
        let mut total_entries = 0;
        let mut occupied_cells = 0;
        let mut max_entries_per_cell = 0;

        for bucket in self.table.values() {
            if bucket.is_empty() {
                continue;
            }
            total_entries += bucket.len();
            occupied_cells += 1;
            max_entries_per_cell = max_entries_per_cell.max(bucket.len());
        }

        let total_cells =
            self.grid_size.x as usize * self.grid_size.y as usize * self.grid_size.z as usize;
        let load_factor = if total_cells > 0 {
            occupied_cells as f32 / total_cells as f32
        } else {
            0.0
        };

        SpatialHashStats {
            total_entries,
            occupied_cells,
            total_cells,
            max_entries_per_cell,
            load_factor,
            cell_size: self.cell_size,
        }
    }
}

/// Occupancy counters for a [`SpatialHash`], for tooling and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialHashStats {
    /// Payload count summed over all buckets.
    pub total_entries: usize,
    /// Number of non-empty buckets.
    pub occupied_cells: usize,
    /// Theoretical cell count of the whole grid.
    pub total_cells: usize,
    /// Size of the fullest bucket.
    pub max_entries_per_cell: usize,
    /// `occupied_cells / total_cells`, 0 for an empty grid.
    pub load_factor: f32,
    /// Configured cell size.
    pub cell_size: f32,
}

impl fmt::Display for SpatialHashStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "spatial hash: {} entries in {}/{} cells (load: {:.2}, max/cell: {}, cell size: {})",
            self.total_entries,
            self.occupied_cells,
            self.total_cells,
            self.load_factor,
            self.max_entries_per_cell,
            self.cell_size
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_bounds() -> Aabb3d {
        Aabb3d::new(Vec3::ZERO, Vec3::splat(5.0))
    }

    #[test]
    fn grid_size_covers_bounds() {
        let hash = SpatialHash::new(test_bounds(), 1.0);
        assert_eq!(hash.grid_size, IVec3::splat(10));

        let coarse = SpatialHash::new(test_bounds(), 4.0);
        assert_eq!(coarse.grid_size, IVec3::splat(3));
    }

    #[test]
    fn flat_bounds_keep_one_cell_per_axis() {
        // A sheet lying in the XZ plane has zero Y extent.
        let bounds = Aabb3d::new(Vec3::ZERO, Vec3::new(5.0, 0.0, 5.0));
        let hash = SpatialHash::new(bounds, 1.0);

        assert_eq!(hash.grid_size, IVec3::new(10, 1, 10));
    }

    #[test]
    #[should_panic(expected = "cell size must be positive")]
    fn zero_cell_size_panics() {
        SpatialHash::new(test_bounds(), 0.0);
    }

    #[test]
    fn query_finds_payload_in_same_cell() {
        let mut hash = SpatialHash::new(test_bounds(), 1.0);
        hash.insert(Vec3::new(0.5, 0.5, 0.5), 7);

        let mut results = Vec::new();
        hash.query_sphere(Vec3::new(0.5, 0.5, 0.5), 0.1, &mut results);
        assert_eq!(results, vec![7]);

        hash.query_box(Vec3::new(0.5, 0.5, 0.5), Vec3::splat(0.1), &mut results);
        assert_eq!(results, vec![7]);
    }

    #[test]
    fn query_excludes_unrelated_cells() {
        let mut hash = SpatialHash::new(test_bounds(), 1.0);
        hash.insert(Vec3::new(-4.5, -4.5, -4.5), 1);
        hash.insert(Vec3::new(4.5, 4.5, 4.5), 2);

        let mut results = Vec::new();
        hash.query_sphere(Vec3::new(-4.5, -4.5, -4.5), 0.25, &mut results);
        assert_eq!(results, vec![1]);
    }

    #[test]
    fn query_is_broad_phase() {
        let mut hash = SpatialHash::new(test_bounds(), 1.0);
        // Same cell, but well outside a 0.01 radius around the center.
        hash.insert(Vec3::new(0.9, 0.9, 0.9), 3);

        let mut results = Vec::new();
        hash.query_sphere(Vec3::new(0.1, 0.1, 0.1), 0.01, &mut results);
        assert_eq!(results, vec![3]);
    }

    #[test]
    fn clear_empties_every_bucket() {
        let mut hash = SpatialHash::new(test_bounds(), 1.0);
        hash.insert(Vec3::new(0.5, 0.5, 0.5), 1);
        hash.insert(Vec3::new(2.5, 2.5, 2.5), 2);

        hash.clear();

        let mut results = Vec::new();
        hash.query_sphere(Vec3::ZERO, 10.0, &mut results);
        assert!(results.is_empty());

        // A fresh insert is visible again.
        hash.insert(Vec3::new(0.5, 0.5, 0.5), 9);
        hash.query_sphere(Vec3::new(0.5, 0.5, 0.5), 0.1, &mut results);
        assert_eq!(results, vec![9]);
    }

    #[test]
    fn duplicate_inserts_are_kept() {
        let mut hash = SpatialHash::new(test_bounds(), 1.0);
        hash.insert(Vec3::new(0.5, 0.5, 0.5), 4);
        hash.insert(Vec3::new(0.5, 0.5, 0.5), 4);

        let mut results = Vec::new();
        hash.query_sphere(Vec3::new(0.5, 0.5, 0.5), 0.1, &mut results);
        assert_eq!(results, vec![4, 4]);
    }

    #[test]
    fn out_of_bounds_positions_clamp_to_edge_cells() {
        let mut hash = SpatialHash::new(test_bounds(), 1.0);
        hash.insert(Vec3::splat(100.0), 11);

        // Query far outside on the same side: both clamp into the same
        // edge cell, so the payload is found and nothing faults.
        let mut results = Vec::new();
        hash.query_sphere(Vec3::splat(500.5), 0.2, &mut results);
        assert_eq!(results, vec![11]);

        // The opposite corner clamps to a different edge cell.
        hash.query_sphere(Vec3::splat(-500.5), 0.2, &mut results);
        assert!(results.is_empty());
    }

    #[test]
    fn stats_report_occupancy() {
        let mut hash = SpatialHash::new(test_bounds(), 1.0);
        hash.insert(Vec3::new(0.5, 0.5, 0.5), 1);
        hash.insert(Vec3::new(0.5, 0.5, 0.5), 2);
        hash.insert(Vec3::new(2.5, 2.5, 2.5), 3);

        let stats = hash.stats();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.occupied_cells, 2);
        assert_eq!(stats.total_cells, 1000);
        assert_eq!(stats.max_entries_per_cell, 2);
        assert!((stats.load_factor - 0.002).abs() < f32::EPSILON);
        assert_eq!(stats.cell_size, 1.0);
    }

    #[test]
    fn cleared_buckets_do_not_count_as_occupied() {
        let mut hash = SpatialHash::new(test_bounds(), 1.0);
        hash.insert(Vec3::new(0.5, 0.5, 0.5), 1);
        hash.clear();

        let stats = hash.stats();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.occupied_cells, 0);
        assert_eq!(stats.max_entries_per_cell, 0);
        assert_eq!(stats.load_factor, 0.0);
    }

    #[test]
    fn stats_display_is_one_line() {
        let hash = SpatialHash::new(test_bounds(), 1.0);
        let line = hash.stats().to_string();

        assert!(line.starts_with("spatial hash:"));
        assert!(!line.contains('\n'));
    }
}
