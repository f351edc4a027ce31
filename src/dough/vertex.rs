use bevy::math::{IVec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_THICKNESS, STRETCH_LOCK_THRESHOLD};

/// A single deformable point of a dough sheet.
///
/// The rest position and grid index are fixed at construction; everything
/// else is driver-writable deformation state. Vertices have no identity of
/// their own — they live in the owning [`DoughInstance`](super::DoughInstance)
/// vertex array and are addressed by linear index (`y * grid_width + x`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoughVertex {
    /// Rest-frame position, never mutated after construction.
    pub initial_position: Vec3,
    /// Displacement applied on top of the rest position while deforming.
    pub deform_offset: Vec3,
    /// Velocity of this vertex, advisory state for dynamic response.
    pub velocity: Vec3,
    /// Cumulative stretch in `[0, 100]`. The model does not clamp writes.
    pub stretch_progress: f32,
    /// Local height of the sheet at this vertex.
    pub thickness: f32,
    /// `(x, y)` coordinate of this vertex in the logical grid.
    pub grid_index: IVec2,
}

impl DoughVertex {
    pub fn new(initial_position: Vec3, grid_index: IVec2) -> Self {
        Self {
            initial_position,
            deform_offset: Vec3::ZERO,
            velocity: Vec3::ZERO,
            stretch_progress: 0.0,
            thickness: DEFAULT_THICKNESS,
            grid_index,
        }
    }

    /// True once stretch progress has reached the lock threshold; a locked
    /// vertex is treated as immovable by the driver.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.stretch_progress >= STRETCH_LOCK_THRESHOLD
    }

    /// World position after deformation.
    #[inline]
    pub fn current_position(&self) -> Vec3 {
        self.initial_position + self.deform_offset
    }
}
