//! # Convex Overlap Test (GJK)
//!
//! Gilbert-Johnson-Keerthi intersection test on shapes described by their
//! support mapping. The test evolves a simplex inside the Minkowski
//! difference `A - B` and reports overlap once the simplex encloses the
//! origin.
//!
//! ## Example
//!
//! ```rust
//! use pipemesh_geometry::{intersects, Frustum};
//! use glam::DVec3;
//!
//! let a = Frustum::cylinder(DVec3::ZERO, DVec3::X, 0.5).unwrap();
//! let b = Frustum::cylinder(DVec3::new(0.5, 0.0, 0.0), DVec3::Z, 0.2).unwrap();
//! assert!(intersects(&a, &b, 0.0));
//! ```

use config::constants::{EPSILON, GJK_MAX_ITERATIONS};
use glam::DVec3;

/// Convex shape described by its support mapping.
pub trait SupportMap {
    /// Farthest point of the shape in direction `dir`.
    fn support(&self, dir: DVec3) -> DVec3;
}

// =============================================================================
// SIMPLEX
// =============================================================================

/// Simplex in the Minkowski difference; `a` is always the newest point.
struct Simplex {
    a: DVec3,
    b: DVec3,
    c: DVec3,
    d: DVec3,
    len: usize,
}

impl Simplex {
    /// Reduces a triangle to the feature closest to the origin.
    fn update_triangle(&mut self) -> DVec3 {
        let (a, b, c) = (self.a, self.b, self.c);
        let n = (b - a).cross(c - a);
        let ao = -a;

        self.len = 2;
        if (b - a).cross(n).dot(ao) > 0.0 {
            // Closest to edge AB
            self.c = a;
            return (b - a).cross(ao).cross(b - a);
        }
        if n.cross(c - a).dot(ao) > 0.0 {
            // Closest to edge AC
            self.b = a;
            return (c - a).cross(ao).cross(c - a);
        }

        self.len = 3;
        if n.dot(ao) > 0.0 {
            self.d = c;
            self.c = b;
            self.b = a;
            n
        } else {
            self.d = b;
            self.b = a;
            -n
        }
    }

    /// Checks the faces of a tetrahedron; `None` means it contains the
    /// origin.
    fn update_tetrahedron(&mut self) -> Option<DVec3> {
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        let abc = (b - a).cross(c - a);
        let acd = (c - a).cross(d - a);
        let adb = (d - a).cross(b - a);
        let ao = -a;

        self.len = 3;
        if abc.dot(ao) > 0.0 {
            self.d = c;
            self.c = b;
            self.b = a;
            return Some(abc);
        }
        if acd.dot(ao) > 0.0 {
            self.b = a;
            return Some(acd);
        }
        if adb.dot(ao) > 0.0 {
            self.c = d;
            self.d = b;
            self.b = a;
            return Some(adb);
        }
        None
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Returns true when `a`, grown by `margin`, overlaps `b`.
///
/// A positive margin makes shapes that merely touch (shared faces, tangent
/// walls) count as intersecting.
pub fn intersects<A, B>(a: &A, b: &B, margin: f64) -> bool
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let support = |dir: DVec3| {
        a.support(dir) - b.support(-dir) + dir.normalize_or_zero() * margin
    };
    let tiny = EPSILON * EPSILON;

    let mut dir = a.support(DVec3::X) - b.support(DVec3::X);
    if dir.length_squared() < tiny {
        dir = DVec3::X;
    }

    let c = support(dir);
    dir = -c;
    if dir.length_squared() < tiny {
        return true;
    }
    let b_point = support(dir);
    if b_point.dot(dir) < 0.0 {
        return false;
    }

    // Search perpendicular to the segment, towards the origin
    let segment = c - b_point;
    dir = segment.cross(-b_point).cross(segment);
    if dir.length_squared() < tiny {
        dir = segment.cross(DVec3::X);
        if dir.length_squared() < tiny {
            dir = segment.cross(DVec3::Z);
        }
    }

    let mut simplex = Simplex {
        a: DVec3::ZERO,
        b: b_point,
        c,
        d: DVec3::ZERO,
        len: 2,
    };

    for _ in 0..GJK_MAX_ITERATIONS {
        simplex.a = support(dir);
        if simplex.a.dot(dir) < 0.0 {
            return false;
        }
        simplex.len += 1;
        if simplex.len == 3 {
            dir = simplex.update_triangle();
        } else {
            match simplex.update_tetrahedron() {
                Some(next) => dir = next,
                None => return true,
            }
        }
        if dir.length_squared() < tiny {
            // Origin lies on the current simplex
            return true;
        }
    }

    tracing::debug!("GJK did not converge in {GJK_MAX_ITERATIONS} iterations");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ball {
        center: DVec3,
        radius: f64,
    }

    impl SupportMap for Ball {
        fn support(&self, dir: DVec3) -> DVec3 {
            self.center + dir.normalize_or_zero() * self.radius
        }
    }

    fn ball(x: f64, y: f64, z: f64, radius: f64) -> Ball {
        Ball {
            center: DVec3::new(x, y, z),
            radius,
        }
    }

    #[test]
    fn test_overlapping_balls() {
        assert!(intersects(&ball(0.0, 0.0, 0.0, 1.0), &ball(1.5, 0.0, 0.0, 1.0), 0.0));
        assert!(intersects(&ball(0.0, 0.0, 0.0, 1.0), &ball(1.0, 1.0, 1.0, 1.0), 0.0));
    }

    #[test]
    fn test_separated_balls() {
        assert!(!intersects(&ball(0.0, 0.0, 0.0, 1.0), &ball(2.5, 0.0, 0.0, 1.0), 0.0));
        assert!(!intersects(&ball(0.0, 0.0, 0.0, 1.0), &ball(2.0, 2.0, 2.0, 1.0), 0.0));
    }

    #[test]
    fn test_margin_bridges_small_gap() {
        let a = ball(0.0, 0.0, 0.0, 1.0);
        let b = ball(2.001, 0.0, 0.0, 1.0);
        assert!(!intersects(&a, &b, 0.0));
        assert!(intersects(&a, &b, 0.01));
    }

    #[test]
    fn test_contained_shape() {
        assert!(intersects(&ball(0.0, 0.0, 0.0, 2.0), &ball(0.1, 0.2, 0.0, 0.5), 0.0));
    }
}
