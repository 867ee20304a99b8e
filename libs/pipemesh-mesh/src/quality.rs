//! # Element Quality
//!
//! Orientation and shape measures of tetrahedra.
//!
//! Orientation signs come from the adaptive exact predicate in `robust`, so
//! a tetrahedron is never misclassified as valid because of round-off.

use glam::DVec3;
use robust::{orient3d, Coord3D};

#[inline]
fn coord(p: DVec3) -> Coord3D<f64> {
    Coord3D {
        x: p.x,
        y: p.y,
        z: p.z,
    }
}

/// Six times the signed volume of `(a, b, c, d)`, positive when `d` lies on
/// the side of `(a, b, c)` given by the right-hand rule.
///
/// The sign is exact.
#[inline]
pub fn orientation(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> f64 {
    // orient3d is positive when d lies below the plane of (a, b, c)
    -orient3d(coord(a), coord(b), coord(c), coord(d))
}

/// Signed volume of a tetrahedron.
#[inline]
pub fn signed_volume(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> f64 {
    (b - a).dot((c - a).cross(d - a)) / 6.0
}

/// Mean ratio quality in `[0, 1]`: 1 for the regular tetrahedron, 0 for
/// flat or inverted ones.
///
/// ```text
/// q = 12 · (3 |V|)^(2/3) / Σ l²
/// ```
pub fn mean_ratio(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> f64 {
    let volume = signed_volume(a, b, c, d);
    if volume <= 0.0 {
        return 0.0;
    }
    let squares = (b - a).length_squared()
        + (c - a).length_squared()
        + (d - a).length_squared()
        + (c - b).length_squared()
        + (d - b).length_squared()
        + (d - c).length_squared();
    if squares <= 0.0 {
        return 0.0;
    }
    (12.0 * (3.0 * volume).powf(2.0 / 3.0) / squares).min(1.0)
}

/// Mean ratio of a tetrahedron given by node indices.
#[inline]
pub fn tetrahedron_quality(nodes: &[DVec3], tet: [usize; 4]) -> f64 {
    mean_ratio(nodes[tet[0]], nodes[tet[1]], nodes[tet[2]], nodes[tet[3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn regular() -> [DVec3; 4] {
        [
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(-1.0, 1.0, -1.0),
            DVec3::new(1.0, -1.0, -1.0),
            DVec3::new(-1.0, -1.0, 1.0),
        ]
    }

    #[test]
    fn test_orientation_sign() {
        let (a, b, c, d) = (DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z);
        assert!(orientation(a, b, c, d) > 0.0);
        assert!(orientation(a, c, b, d) < 0.0);
        assert_eq!(orientation(a, b, c, DVec3::new(0.3, 0.3, 0.0)), 0.0);
        assert_relative_eq!(orientation(a, b, c, d), 6.0 * signed_volume(a, b, c, d));
    }

    #[test]
    fn test_regular_tetrahedron_is_ideal() {
        let [a, b, c, d] = regular();
        let q = mean_ratio(a, b, c, d);
        assert_relative_eq!(q, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_and_inverted() {
        let [a, b, c, d] = regular();
        assert_eq!(mean_ratio(a, c, b, d), 0.0);
        let flat = DVec3::new(0.5, 0.5, 0.0);
        assert_eq!(mean_ratio(DVec3::ZERO, DVec3::X, DVec3::Y, flat), 0.0);
    }

    #[test]
    fn test_sliver_scores_low() {
        let q = mean_ratio(
            DVec3::ZERO,
            DVec3::X,
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.01),
        );
        assert!(q > 0.0 && q < 0.1);
    }
}
