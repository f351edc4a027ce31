//! Deformable sheet ("dough") simulation core.
//!
//! Provides the data model a dough physics driver operates on: a regular
//! grid mesh of deformable vertices, the triangle topology derived from it,
//! and a spatial hash grid for broad-phase proximity queries over the
//! vertex set. The force/contact generation, rendering and networking all
//! live in the host game; this crate only owns the state and the queries.

pub mod constants;
pub mod dough;

pub use constants::*;
pub use dough::{DoughInstance, DoughVertex, LodLevel, SpatialHash, SpatialHashStats};
