//! Dough mesh data model and spatial queries.
//!
//! A dough sheet is a `width × height` grid of vertices laid out in the
//! local XZ plane. Vertices carry a rest position fixed at construction
//! plus mutable deformation state (offset, velocity, stretch progress,
//! thickness) that the physics driver writes every tick. The instance also
//! owns the derived triangle topology and a [`SpatialHash`] over the
//! vertex set so collision code can ask "which vertices are near here?"
//! without scanning the whole grid.
//!
//! ## Update cycle
//! 1. Driver mutates vertex deformation fields.
//! 2. Driver calls [`DoughInstance::update_spatial_hash`] (and
//!    [`DoughInstance::update_average_progress`] when it needs the
//!    aggregate) — nothing is recomputed implicitly.
//! 3. Collision code issues [`SpatialHash::query_sphere`] /
//!    [`SpatialHash::query_box`] broad-phase queries and narrows the
//!    candidates itself.

pub mod instance;
pub mod lod;
pub mod spatial_hash;
pub mod vertex;

pub use instance::DoughInstance;
pub use lod::LodLevel;
pub use spatial_hash::{SpatialHash, SpatialHashStats};
pub use vertex::DoughVertex;
