//! # Geometry Builder
//!
//! Builds the bifurcated pipe in the x-z plane:
//!
//! ```text
//!                                ╱ branch A
//!                         cone A╱
//! ═══════ main ═══════ (0,0,0)
//!                         cone B╲
//!                                ╲ branch B
//! ```
//!
//! The main pipe runs from `(-len1, 0, 0)` to the origin. Each cone starts
//! at the origin with radius `radius1` and ends at `(conelen, 0, ±conelen)`
//! with radius `radius2`, where its branch pipe takes over for a further
//! `(len2, 0, ±len2)`.

use pipemesh_geometry::{ConstructionError, ConstructionResult, DimTag, Kernel};
use tracing::info;

use crate::parameters::PipeParameters;

/// Adds the five primitives and fuses them into one volume.
///
/// Cylinders are the fuse objects and cones the tools; both are consumed,
/// so only the returned handle stays valid.
///
/// # Errors
///
/// [`ConstructionError::DegeneratePrimitive`] for non-positive radii or
/// lengths, [`ConstructionError::DisjointFuse`] when the parts do not form
/// one solid.
pub fn build_bifurcation(kernel: &mut Kernel, params: &PipeParameters) -> ConstructionResult<DimTag> {
    let PipeParameters {
        radius1: r1,
        radius2: r2,
        len1,
        len2,
        conelen,
        ..
    } = *params;

    let main = kernel.add_cylinder(-len1, 0.0, 0.0, len1, 0.0, 0.0, r1)?;
    let branch_a = kernel.add_cylinder(conelen, 0.0, conelen, len2, 0.0, len2, r2)?;
    let branch_b = kernel.add_cylinder(conelen, 0.0, -conelen, len2, 0.0, -len2, r2)?;
    let cone_a = kernel.add_cone(0.0, 0.0, 0.0, conelen, 0.0, conelen, r1, r2)?;
    let cone_b = kernel.add_cone(0.0, 0.0, 0.0, conelen, 0.0, -conelen, r1, r2)?;

    let cylinders = [main, branch_a, branch_b].map(DimTag::volume);
    let cones = [cone_a, cone_b].map(DimTag::volume);
    let (fused, _) = kernel.fuse(&cylinders, &cones, true, true)?;
    let fused = fused.first().copied().ok_or(ConstructionError::EmptyFuse)?;

    info!(volume = %fused, "built bifurcation");
    Ok(fused)
}
