//! Clipping of lattice tetrahedra against the zero level set.
//!
//! A tetrahedron straddling the surface is cut by the plane through its cut
//! points and zero-valued vertices. The negative part is a convex polytope
//! whose faces are the clipped tetrahedron faces plus the cap on the
//! cutting plane. It is split into tetrahedra by pulling: every face not
//! containing the smallest vertex id is fanned from its own smallest id and
//! joined to that vertex.

use super::{CutPoints, NodeField};
use crate::quality::orientation;
use glam::DVec3;
use pipemesh_geometry::Solid;

/// Faces of a tetrahedron as local vertex triples.
const FACES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];

/// Edges of a tetrahedron as local vertex pairs.
const EDGES: [[usize; 2]; 6] = [[0, 1], [0, 2], [0, 3], [1, 2], [1, 3], [2, 3]];

/// What clipping did to one lattice tetrahedron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clipped {
    /// No part lies inside the solid.
    Outside,
    /// Kept unchanged.
    Whole,
    /// Replaced by pieces; `degenerate` flat pieces were discarded.
    Pieces { degenerate: usize },
    /// Entirely inside but turned inside out by snapping.
    Inverted,
}

/// Clips lattice tetrahedra against a conformed node field.
pub struct Clipper<'a> {
    field: &'a NodeField,
    cuts: &'a CutPoints,
    solid: &'a Solid,
    /// Six times the smallest piece volume kept
    min_orientation: f64,
}

impl<'a> Clipper<'a> {
    pub fn new(
        field: &'a NodeField,
        cuts: &'a CutPoints,
        solid: &'a Solid,
        min_orientation: f64,
    ) -> Self {
        Self {
            field,
            cuts,
            solid,
            min_orientation,
        }
    }

    /// Value of a node; cut points lie on the surface.
    #[inline]
    fn value(&self, node: usize) -> f64 {
        if node < self.field.len() {
            self.field.values[node]
        } else {
            0.0
        }
    }

    #[inline]
    fn position(&self, node: usize) -> DVec3 {
        if node < self.field.len() {
            self.field.positions[node]
        } else {
            self.cuts.position(node)
        }
    }

    fn orientation_of(&self, tet: [usize; 4]) -> f64 {
        let [a, b, c, d] = tet.map(|node| self.position(node));
        orientation(a, b, c, d)
    }

    /// Clips `tet`, appending the tetrahedra that stay to `out`.
    pub fn clip(&self, tet: [usize; 4], out: &mut Vec<[usize; 4]>) -> Clipped {
        let values = tet.map(|node| self.value(node));
        let negative = values.iter().any(|v| *v < 0.0);
        let positive = values.iter().any(|v| *v > 0.0);

        match (negative, positive) {
            (false, true) => Clipped::Outside,
            (false, false) => {
                // All four nodes on the surface: keep the tet if it lies inside
                let centroid = tet.iter().map(|n| self.position(*n)).sum::<DVec3>() / 4.0;
                if self.solid.signed_distance(centroid) < 0.0 {
                    self.keep(tet, out)
                } else {
                    Clipped::Outside
                }
            }
            (true, false) => self.keep(tet, out),
            (true, true) => self.split(tet, values, out),
        }
    }

    fn keep(&self, tet: [usize; 4], out: &mut Vec<[usize; 4]>) -> Clipped {
        if self.orientation_of(tet) <= 0.0 {
            return Clipped::Inverted;
        }
        out.push(tet);
        Clipped::Whole
    }

    fn split(&self, tet: [usize; 4], values: [f64; 4], out: &mut Vec<[usize; 4]>) -> Clipped {
        let mut faces: Vec<Vec<usize>> = Vec::with_capacity(5);

        for face in FACES {
            let mut polygon = Vec::with_capacity(4);
            for m in 0..3 {
                let (p, q) = (face[m], face[(m + 1) % 3]);
                if values[p] <= 0.0 {
                    polygon.push(tet[p]);
                }
                if let Some(cut) = self.cut(tet, values, p, q) {
                    polygon.push(cut);
                }
            }
            if polygon.len() >= 3 {
                faces.push(polygon);
            }
        }

        let cap = self.cap(tet, values);
        if cap.len() >= 3 {
            faces.push(cap);
        }

        let mut seen: Vec<Vec<usize>> = Vec::with_capacity(faces.len());
        faces.retain(|face| {
            let mut key = face.clone();
            key.sort_unstable();
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });

        let Some(apex) = faces.iter().flatten().copied().min() else {
            return Clipped::Outside;
        };

        let mut degenerate = 0;
        for face in faces.iter().filter(|face| !face.contains(&apex)) {
            let start = face
                .iter()
                .enumerate()
                .min_by_key(|(_, node)| **node)
                .map_or(0, |(index, _)| index);
            let n = face.len();
            for i in 1..n - 1 {
                let mut piece = [
                    apex,
                    face[start],
                    face[(start + i) % n],
                    face[(start + i + 1) % n],
                ];
                let volume = self.orientation_of(piece);
                if volume.abs() <= self.min_orientation {
                    degenerate += 1;
                    continue;
                }
                if volume < 0.0 {
                    piece.swap(2, 3);
                }
                out.push(piece);
            }
        }
        Clipped::Pieces { degenerate }
    }

    fn cut(&self, tet: [usize; 4], values: [f64; 4], p: usize, q: usize) -> Option<usize> {
        let (vp, vq) = (values[p], values[q]);
        if (vp < 0.0 && vq > 0.0) || (vp > 0.0 && vq < 0.0) {
            self.cuts.get(tet[p], tet[q])
        } else {
            None
        }
    }

    /// Vertices of the cutting plane polygon in rotational order.
    fn cap(&self, tet: [usize; 4], values: [f64; 4]) -> Vec<usize> {
        let mut cap: Vec<usize> = (0..4).filter(|i| values[*i] == 0.0).map(|i| tet[i]).collect();
        for [p, q] in EDGES {
            if let Some(cut) = self.cut(tet, values, p, q) {
                cap.push(cut);
            }
        }
        if cap.len() < 4 {
            return cap;
        }

        let mean = |sign: f64| {
            let points: Vec<DVec3> = (0..4)
                .filter(|i| values[*i] * sign > 0.0)
                .map(|i| self.position(tet[i]))
                .collect();
            points.iter().sum::<DVec3>() / points.len() as f64
        };
        let normal = (mean(1.0) - mean(-1.0)).normalize_or_zero();
        if normal == DVec3::ZERO {
            return cap;
        }
        let u = normal.any_orthonormal_vector();
        let v = normal.cross(u);

        let centre = cap.iter().map(|n| self.position(*n)).sum::<DVec3>() / cap.len() as f64;
        let mut keyed: Vec<(f64, usize)> = cap
            .into_iter()
            .map(|node| {
                let d = self.position(node) - centre;
                (d.dot(v).atan2(d.dot(u)), node)
            })
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        keyed.into_iter().map(|(_, node)| node).collect()
    }
}
