use bevy::math::bounding::Aabb3d;
use bevy::math::{IVec2, Vec3, Vec3A};
use bevy_log::debug;

use super::lod::LodLevel;
use super::spatial_hash::SpatialHash;
use super::vertex::DoughVertex;
use crate::constants::DEFAULT_CELL_SIZE;

/// One dough sheet: the vertex grid, its triangle topology, and the
/// spatial hash used to answer proximity queries over the vertices.
///
/// Topology (`triangles`, grid dimensions, vertex rest positions) is fixed
/// at construction; the driver mutates per-vertex deformation state and
/// explicitly refreshes the derived data it needs (`update_bounds`,
/// `update_average_progress`, `update_spatial_hash`). Nothing is
/// recomputed implicitly.
#[derive(Debug, Clone)]
pub struct DoughInstance {
    /// Row-major vertex grid, `index = y * grid_width + x`.
    pub vertices: Vec<DoughVertex>,
    /// Triangle indices into `vertices`, two triangles per grid quad.
    pub triangles: Vec<u32>,
    /// Axis-aligned bounds over vertex rest positions, refreshed by
    /// [`update_bounds`](Self::update_bounds).
    pub bounds: Aabb3d,
    /// Level-of-detail tag assigned by the host; never interpreted here.
    pub lod_level: LodLevel,
    /// Spatial hash over the vertex set, rebuilt by
    /// [`update_spatial_hash`](Self::update_spatial_hash).
    pub spatial_hash: SpatialHash,
    pub grid_width: i32,
    pub grid_height: i32,
    average_progress: f32,
}

impl DoughInstance {
    /// Builds a `width × height` sheet centered at `center`, spanning
    /// `size` world units along both local axes in the XZ plane.
    ///
    /// # Panics
    /// Panics if either dimension is below 1 or `size` is not strictly
    /// positive.
    pub fn new(width: i32, height: i32, center: Vec3, size: f32) -> Self {
        assert!(width >= 1 && height >= 1, "dough grid dimensions must be at least 1");
        assert!(size > 0.0, "dough size must be positive");

        let vertices = build_vertices(width, height, center, size);
        let triangles = build_triangles(width, height);
        let bounds = rest_bounds(&vertices).unwrap_or(Aabb3d::new(center, Vec3::ZERO));
        let spatial_hash = SpatialHash::new(bounds, DEFAULT_CELL_SIZE);

        debug!(
            "built {width}x{height} dough at {center}: {} vertices, {} triangle indices",
            vertices.len(),
            triangles.len()
        );

        Self {
            vertices,
            triangles,
            bounds,
            lod_level: LodLevel::default(),
            spatial_hash,
            grid_width: width,
            grid_height: height,
            average_progress: 0.0,
        }
    }

    /// Recomputes `bounds` as the tight axis-aligned box over all vertex
    /// rest positions. Deform offsets are deliberately ignored: the
    /// spatial hash is sized against rest positions, and the two must
    /// agree. No-op if there are no vertices.
    pub fn update_bounds(&mut self) {
        if let Some(bounds) = rest_bounds(&self.vertices) {
            self.bounds = bounds;
        }
    }

    /// Recomputes the average stretch progress over all vertices. No-op
    /// (value left unchanged) if there are no vertices.
    pub fn update_average_progress(&mut self) {
        if self.vertices.is_empty() {
            return;
        }

        let sum: f32 = self.vertices.iter().map(|v| v.stretch_progress).sum();
        self.average_progress = sum / self.vertices.len() as f32;
    }

    /// Average stretch progress in `[0, 100]`, as of the last
    /// [`update_average_progress`](Self::update_average_progress) call.
    #[inline]
    pub fn average_progress(&self) -> f32 {
        self.average_progress
    }

    /// Linear index for grid coordinate `(x, y)`, or `None` when the
    /// coordinate lies outside the grid.
    pub fn vertex_index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || x >= self.grid_width || y < 0 || y >= self.grid_height {
            return None;
        }

        Some((y * self.grid_width + x) as usize)
    }

    /// Grid coordinate of the vertex at `vertex_index`, or `None` when
    /// the index is out of range.
    pub fn grid_position(&self, vertex_index: usize) -> Option<IVec2> {
        self.vertices.get(vertex_index).map(|v| v.grid_index)
    }

    /// Vertex at grid coordinate `(x, y)`, if in range.
    pub fn vertex(&self, x: i32, y: i32) -> Option<&DoughVertex> {
        self.vertex_index(x, y).map(|i| &self.vertices[i])
    }

    /// Mutable vertex at grid coordinate `(x, y)`, if in range. This is
    /// the driver's write surface for deformation state.
    pub fn vertex_mut(&mut self, x: i32, y: i32) -> Option<&mut DoughVertex> {
        self.vertex_index(x, y).map(|i| &mut self.vertices[i])
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of vertices that have reached the lock threshold.
    pub fn locked_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.is_locked()).count()
    }

    /// Rebuilds the spatial hash from scratch: every vertex's rest
    /// position is inserted keyed by its linear index.
    ///
    /// Rest positions, not current positions, on purpose: broad-phase
    /// candidates stay keyed to the undeformed sheet layout, so moving a
    /// vertex via `deform_offset` alone does not change query results.
    /// Drivers that need deformed-space queries must narrow candidates
    /// against `current_position()` themselves.
    pub fn update_spatial_hash(&mut self) {
        self.spatial_hash.clear();
        for (index, vertex) in self.vertices.iter().enumerate() {
            self.spatial_hash.insert(vertex.initial_position, index);
        }
    }
}

fn build_vertices(width: i32, height: i32, center: Vec3, size: f32) -> Vec<DoughVertex> {
    let mut vertices = Vec::with_capacity((width * height) as usize);

    for y in 0..height {
        for x in 0..width {
            // Fraction along each axis; a single-row or single-column
            // axis is degenerate and sits at the midpoint.
            let fx = if width > 1 { x as f32 / (width - 1) as f32 } else { 0.5 };
            let fy = if height > 1 { y as f32 / (height - 1) as f32 } else { 0.5 };

            let position = center + Vec3::new((fx - 0.5) * size, 0.0, (fy - 0.5) * size);
            vertices.push(DoughVertex::new(position, IVec2::new(x, y)));
        }
    }

    vertices
}

fn build_triangles(width: i32, height: i32) -> Vec<u32> {
    let quad_count = ((width - 1) * (height - 1)).max(0) as usize;
    let mut triangles = Vec::with_capacity(quad_count * 6);

    for y in 0..height - 1 {
        for x in 0..width - 1 {
            let bottom_left = (y * width + x) as u32;
            let bottom_right = bottom_left + 1;
            let top_left = ((y + 1) * width + x) as u32;
            let top_right = top_left + 1;

            // Winding is load-bearing for downstream normal generation.
            triangles.extend_from_slice(&[bottom_left, top_left, bottom_right]);
            triangles.extend_from_slice(&[bottom_right, top_left, top_right]);
        }
    }

    triangles
}

fn rest_bounds(vertices: &[DoughVertex]) -> Option<Aabb3d> {
    let first = Vec3A::from(vertices.first()?.initial_position);
    let mut min = first;
    let mut max = first;

    for vertex in vertices {
        let position = Vec3A::from(vertex.initial_position);
        min = min.min(position);
        max = max.max(position);
    }

    Some(Aabb3d { min, max })
}
