/// Stretch progress at which a vertex locks in place and stops responding
/// to deformation. Tuned against the dough shader's tear-off visuals.
pub const STRETCH_LOCK_THRESHOLD: f32 = 98.7;

/// Nominal top of the stretch progress scale. The model does not clamp
/// writes to this value; it is the scale drivers are expected to use.
pub const MAX_STRETCH_PROGRESS: f32 = 100.0;

/// Thickness a vertex starts with before any deformation.
pub const DEFAULT_THICKNESS: f32 = 1.0;

/// Cell size the dough instance sizes its spatial hash with.
pub const DEFAULT_CELL_SIZE: f32 = 1.0;
