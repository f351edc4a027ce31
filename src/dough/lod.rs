/// Level of Detail (LOD) tag for dough meshes.
///
/// Assigned by the host's LOD selection policy and carried on the
/// instance; the simulation core stores it but never interprets it.
/// - LOD 0: full vertex grid is rendered
/// - LOD 1: reduced grid for distant dough

/// Level of Detail for dough rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
pub enum LodLevel {
    #[default]
    Lod0, // Full detail
    Lod1, // Reduced detail for distant instances
}

impl LodLevel {
    /// Determine LOD level from squared distance to the dough instance.
    ///
    /// Distances are squared to avoid sqrt in per-frame selection.
    pub fn from_distance_squared(distance_sq: f32, lod0_threshold_sq: f32) -> Self {
        if distance_sq <= lod0_threshold_sq {
            LodLevel::Lod0
        } else {
            LodLevel::Lod1
        }
    }
}
