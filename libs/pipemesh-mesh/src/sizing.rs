//! # Element Sizing
//!
//! Resolves the uniform target edge length from the options and the solid.
//!
//! ```text
//! base = diagonal / DEFAULT_SIZE_DIVISIONS
//! base = min(base, min_feature / FEATURE_RESOLUTION)   if extend-from-boundary
//! h    = clamp(base * factor, MeshSizeMin, MeshSizeMax)
//! ```

use crate::error::{MeshGenerationError, MeshResult};
use crate::options::{Options, MESH_SIZE_MIN};
use config::constants::{DEFAULT_SIZE_DIVISIONS, FEATURE_RESOLUTION};
use pipemesh_geometry::Solid;

/// Computes the edge length used to mesh `solid`.
///
/// # Errors
///
/// - [`MeshGenerationError::InvalidOption`] when `MeshSizeMin > MeshSizeMax`
/// - [`MeshGenerationError::ResolutionTooCoarse`] when the length exceeds
///   the smallest feature of the solid
pub fn target_edge_length(options: &Options, solid: &Solid) -> MeshResult<f64> {
    let (min, max) = (options.mesh_size_min(), options.mesh_size_max());
    if min > max {
        return Err(MeshGenerationError::invalid_option(
            MESH_SIZE_MIN,
            format!("{min} exceeds Mesh.MeshSizeMax {max}"),
        ));
    }

    let feature = solid.min_feature_size();
    let mut base = solid.diagonal() / DEFAULT_SIZE_DIVISIONS;
    if options.extend_from_boundary() {
        base = base.min(feature / FEATURE_RESOLUTION);
    }
    let h = (base * options.mesh_size_factor()).clamp(min, max);

    if h <= 0.0 || !h.is_finite() {
        return Err(MeshGenerationError::invalid_option(
            MESH_SIZE_MIN,
            format!("resolved edge length {h} is not positive"),
        ));
    }
    if h > feature {
        return Err(MeshGenerationError::ResolutionTooCoarse {
            edge_length: h,
            feature_size: feature,
        });
    }
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{MESH_SIZE_EXTEND_FROM_BOUNDARY, MESH_SIZE_FACTOR, MESH_SIZE_MAX};
    use approx::assert_relative_eq;
    use glam::DVec3;
    use pipemesh_geometry::Frustum;

    fn pipe() -> Solid {
        // Diagonal sqrt(4 + 0.04 + 0.04), smallest feature the 0.1 radius
        Solid::from_part(Frustum::cylinder(DVec3::ZERO, DVec3::X * 2.0, 0.1).expect("cylinder"))
    }

    fn fixed(edge: f64) -> Options {
        let mut options = Options::default();
        options.set_number(MESH_SIZE_EXTEND_FROM_BOUNDARY, 0.0).expect("valid");
        options.set_number(MESH_SIZE_MAX, edge).expect("valid");
        options.set_number(MESH_SIZE_MIN, edge).expect("valid");
        options
    }

    #[test]
    fn test_fixed_size_is_used_verbatim() {
        assert_relative_eq!(target_edge_length(&fixed(0.02), &pipe()).expect("size"), 0.02);
    }

    #[test]
    fn test_default_sizing_follows_features() {
        let h = target_edge_length(&Options::default(), &pipe()).expect("size");
        assert_relative_eq!(h, 0.1 / FEATURE_RESOLUTION);
    }

    #[test]
    fn test_unbounded_size_uses_diagonal() {
        let mut options = Options::default();
        options.set_number(MESH_SIZE_EXTEND_FROM_BOUNDARY, 0.0).expect("valid");
        options.set_number(MESH_SIZE_MAX, 0.05).expect("valid");
        // diagonal / 10 ≈ 0.202 clamped by the maximum
        assert_relative_eq!(target_edge_length(&options, &pipe()).expect("size"), 0.05);
    }

    #[test]
    fn test_factor_scales_before_clamp() {
        let mut options = Options::default();
        options.set_number(MESH_SIZE_FACTOR, 0.5).expect("valid");
        let h = target_edge_length(&options, &pipe()).expect("size");
        assert_relative_eq!(h, 0.5 * 0.1 / FEATURE_RESOLUTION);
    }

    #[test]
    fn test_too_coarse() {
        let err = target_edge_length(&fixed(0.15), &pipe()).unwrap_err();
        assert_eq!(
            err,
            MeshGenerationError::ResolutionTooCoarse {
                edge_length: 0.15,
                feature_size: 0.1
            }
        );
    }

    #[test]
    fn test_min_above_max() {
        let mut options = fixed(0.02);
        options.set_number(MESH_SIZE_MIN, 0.03).expect("valid");
        assert!(matches!(
            target_edge_length(&options, &pipe()),
            Err(MeshGenerationError::InvalidOption { .. })
        ));
    }
}
