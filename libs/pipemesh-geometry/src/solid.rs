//! # Solids
//!
//! A solid is the union of convex frustum parts. Fusing solids concatenates
//! their parts; the implicit union needs no surface intersection.

use crate::gjk::intersects;
use crate::primitives::{Frustum, Patch};
use glam::DVec3;

/// An end disc of a part that is not covered by any other part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opening {
    /// Index of the part owning the disc
    pub part: usize,
    /// Which end of the part
    pub patch: Patch,
    /// Disc centre
    pub center: DVec3,
    /// Disc radius
    pub radius: f64,
}

/// A solid made of one or more convex parts.
///
/// # Example
///
/// ```rust
/// use pipemesh_geometry::{Frustum, Solid};
/// use glam::DVec3;
///
/// let part = Frustum::cylinder(DVec3::ZERO, DVec3::X, 0.25).unwrap();
/// let solid = Solid::from_part(part);
/// assert_eq!(solid.openings(1e-9).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    parts: Vec<Frustum>,
}

impl Solid {
    /// Creates a solid from a single part.
    pub fn from_part(part: Frustum) -> Self {
        Self { parts: vec![part] }
    }

    /// Creates the union of several parts.
    pub fn from_parts(parts: Vec<Frustum>) -> Self {
        Self { parts }
    }

    /// Returns the parts of the union.
    #[inline]
    pub fn parts(&self) -> &[Frustum] {
        &self.parts
    }

    /// Signed distance of the union: the minimum over all parts.
    ///
    /// Exact outside the solid and wherever a single part is closest;
    /// inside overlaps it is a lower bound, which keeps the sign correct.
    pub fn signed_distance(&self, p: DVec3) -> f64 {
        self.parts
            .iter()
            .map(|part| part.signed_distance(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        self.parts.iter().map(Frustum::bounding_box).fold(
            (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
            |(min, max), (lo, hi)| (min.min(lo), max.max(hi)),
        )
    }

    /// Length of the bounding-box diagonal.
    pub fn diagonal(&self) -> f64 {
        let (min, max) = self.bounding_box();
        (max - min).length()
    }

    /// Smallest feature size over all parts.
    pub fn min_feature_size(&self) -> f64 {
        self.parts
            .iter()
            .map(Frustum::min_feature_size)
            .fold(f64::INFINITY, f64::min)
    }

    /// Sum of part volumes (overlaps counted twice).
    pub fn volume_upper_bound(&self) -> f64 {
        self.parts.iter().map(Frustum::volume).sum()
    }

    /// Part whose surface is closest to `p`, and the patch of that part.
    pub fn closest_patch(&self, p: DVec3) -> Option<(usize, Patch)> {
        self.parts
            .iter()
            .enumerate()
            .map(|(index, part)| (index, part.signed_distance(p).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| (index, self.parts[index].closest_patch(p)))
    }

    /// Groups parts into connected components.
    ///
    /// Two parts are connected when they overlap or lie within `margin` of
    /// each other. Components are listed in order of their first part.
    pub fn components(&self, margin: f64) -> Vec<Vec<usize>> {
        let mut parent: Vec<usize> = (0..self.parts.len()).collect();

        fn find(parent: &mut [usize], mut i: usize) -> usize {
            while parent[i] != i {
                parent[i] = parent[parent[i]];
                i = parent[i];
            }
            i
        }

        for i in 0..self.parts.len() {
            for j in (i + 1)..self.parts.len() {
                if find(&mut parent, i) == find(&mut parent, j) {
                    continue;
                }
                if intersects(&self.parts[i], &self.parts[j], margin) {
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    parent[ri.max(rj)] = ri.min(rj);
                }
            }
        }

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut roots: Vec<usize> = Vec::new();
        for i in 0..self.parts.len() {
            let root = find(&mut parent, i);
            match roots.iter().position(|&r| r == root) {
                Some(slot) => groups[slot].push(i),
                None => {
                    roots.push(root);
                    groups.push(vec![i]);
                }
            }
        }
        groups
    }

    /// End discs whose centre is not inside or on another part.
    ///
    /// For a pipe network these are the inlets and outlets.
    pub fn openings(&self, tolerance: f64) -> Vec<Opening> {
        let mut openings = Vec::new();
        for (index, part) in self.parts.iter().enumerate() {
            for patch in [Patch::Base, Patch::Top] {
                let Some((center, radius)) = part.cap(patch) else {
                    continue;
                };
                if radius <= tolerance {
                    continue;
                }
                let covered = self
                    .parts
                    .iter()
                    .enumerate()
                    .any(|(other, p)| other != index && p.signed_distance(center) <= tolerance);
                if !covered {
                    openings.push(Opening {
                        part: index,
                        patch,
                        center,
                        radius,
                    });
                }
            }
        }
        openings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cylinder(from: DVec3, axis: DVec3, radius: f64) -> Frustum {
        Frustum::cylinder(from, axis, radius).expect("cylinder succeeds")
    }

    #[test]
    fn test_union_distance_is_minimum() {
        let solid = Solid::from_parts(vec![
            cylinder(DVec3::ZERO, DVec3::X, 0.5),
            cylinder(DVec3::new(5.0, 0.0, 0.0), DVec3::X, 0.5),
        ]);
        assert_relative_eq!(solid.signed_distance(DVec3::new(0.5, 0.0, 0.0)), -0.5);
        assert_relative_eq!(solid.signed_distance(DVec3::new(5.5, 0.0, 0.0)), -0.5);
        assert!(solid.signed_distance(DVec3::new(3.0, 0.0, 0.0)) > 0.0);
    }

    #[test]
    fn test_components_split_on_gap() {
        let solid = Solid::from_parts(vec![
            cylinder(DVec3::ZERO, DVec3::X, 0.5),
            cylinder(DVec3::new(5.0, 0.0, 0.0), DVec3::X, 0.5),
            cylinder(DVec3::new(0.5, 0.0, 0.0), DVec3::Z * 2.0, 0.25),
        ]);
        let components = solid.components(1e-6);
        assert_eq!(components, vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn test_touching_parts_are_connected() {
        // End disc of the first part coincides with the base of the second
        let solid = Solid::from_parts(vec![
            cylinder(DVec3::ZERO, DVec3::X, 0.5),
            cylinder(DVec3::X, DVec3::X, 0.5),
        ]);
        assert_eq!(solid.components(1e-6).len(), 1);
    }

    #[test]
    fn test_openings_skip_covered_caps() {
        let solid = Solid::from_parts(vec![
            cylinder(DVec3::ZERO, DVec3::X, 0.5),
            cylinder(DVec3::X, DVec3::X, 0.5),
        ]);
        let openings = solid.openings(1e-9);
        assert_eq!(openings.len(), 2);
        assert_eq!((openings[0].part, openings[0].patch), (0, Patch::Base));
        assert_eq!((openings[1].part, openings[1].patch), (1, Patch::Top));
    }

    #[test]
    fn test_bounding_box_and_feature_size() {
        let solid = Solid::from_parts(vec![
            cylinder(DVec3::ZERO, DVec3::X, 0.5),
            cylinder(DVec3::ZERO, DVec3::Y * 3.0, 0.1),
        ]);
        let (min, max) = solid.bounding_box();
        assert_relative_eq!(min.x, -0.1);
        assert_relative_eq!(max.y, 3.0);
        assert_relative_eq!(solid.min_feature_size(), 0.1);
    }

    #[test]
    fn test_closest_patch() {
        let solid = Solid::from_parts(vec![
            cylinder(DVec3::ZERO, DVec3::X, 0.5),
            cylinder(DVec3::new(5.0, 0.0, 0.0), DVec3::X, 0.5),
        ]);
        assert_eq!(
            solid.closest_patch(DVec3::new(6.0, 0.1, 0.0)),
            Some((1, Patch::Top))
        );
    }
}
