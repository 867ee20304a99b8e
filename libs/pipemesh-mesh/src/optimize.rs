//! # Mesh Optimization
//!
//! Quality-guarded node relocation after stuffing:
//!
//! 1. **Projection**: boundary nodes move onto the exact surface with one
//!    Newton step along the signed-distance gradient.
//! 2. **Smoothing**: interior nodes move to the centroid of their neighbours
//!    for a fixed number of Gauss-Seidel sweeps.
//!
//! A move is accepted only if every incident tetrahedron stays positively
//! oriented; smoothing moves must also not lower the worst incident quality.
//! Nodes are visited in ascending id order so the result is deterministic.

use crate::quality::{orientation, tetrahedron_quality};
use config::constants::{EPSILON, GRADIENT_STEP_RATIO};
use glam::DVec3;
use pipemesh_geometry::Solid;
use tracing::debug;

/// Moves accepted by [`optimize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeReport {
    pub projected: usize,
    pub smoothed: usize,
}

/// Node-to-tetrahedra incidence in compressed row form.
struct Incidence {
    offsets: Vec<usize>,
    tets: Vec<usize>,
}

impl Incidence {
    fn new(node_count: usize, tetrahedra: &[[usize; 4]]) -> Self {
        let mut offsets = vec![0; node_count + 1];
        for tet in tetrahedra {
            for &node in tet {
                offsets[node + 1] += 1;
            }
        }
        for i in 0..node_count {
            offsets[i + 1] += offsets[i];
        }
        let mut fill = offsets.clone();
        let mut tets = vec![0; offsets[node_count]];
        for (index, tet) in tetrahedra.iter().enumerate() {
            for &node in tet {
                tets[fill[node]] = index;
                fill[node] += 1;
            }
        }
        Self { offsets, tets }
    }

    #[inline]
    fn of(&self, node: usize) -> &[usize] {
        &self.tets[self.offsets[node]..self.offsets[node + 1]]
    }
}

/// Central-difference gradient of the signed distance.
fn gradient(solid: &Solid, p: DVec3, step: f64) -> DVec3 {
    let d = |axis: DVec3| {
        (solid.signed_distance(p + axis * step) - solid.signed_distance(p - axis * step))
            / (2.0 * step)
    };
    DVec3::new(d(DVec3::X), d(DVec3::Y), d(DVec3::Z))
}

struct Optimizer<'a> {
    nodes: &'a mut [DVec3],
    tetrahedra: &'a [[usize; 4]],
    incidence: Incidence,
    min_orientation: f64,
}

impl<'a> Optimizer<'a> {
    fn new(nodes: &'a mut [DVec3], tetrahedra: &'a [[usize; 4]], min_orientation: f64) -> Self {
        let incidence = Incidence::new(nodes.len(), tetrahedra);
        Self {
            nodes,
            tetrahedra,
            incidence,
            min_orientation,
        }
    }

    /// Positions of `tet` with `node` placed at `at`.
    fn corners(&self, tet: [usize; 4], node: usize, at: DVec3) -> [DVec3; 4] {
        tet.map(|n| if n == node { at } else { self.nodes[n] })
    }

    fn valid_at(&self, node: usize, at: DVec3) -> bool {
        self.incidence.of(node).iter().all(|&t| {
            let [a, b, c, d] = self.corners(self.tetrahedra[t], node, at);
            orientation(a, b, c, d) > self.min_orientation
        })
    }

    fn worst_quality(&self, node: usize, at: DVec3) -> f64 {
        self.incidence
            .of(node)
            .iter()
            .map(|&t| {
                let corners = self.corners(self.tetrahedra[t], node, at);
                tetrahedron_quality(&corners, [0, 1, 2, 3])
            })
            .fold(f64::INFINITY, f64::min)
    }

    fn neighbour_centroid(&self, node: usize) -> Option<DVec3> {
        let mut neighbours: Vec<usize> = self
            .incidence
            .of(node)
            .iter()
            .flat_map(|&t| self.tetrahedra[t])
            .filter(|&n| n != node)
            .collect();
        neighbours.sort_unstable();
        neighbours.dedup();
        if neighbours.is_empty() {
            return None;
        }
        let sum: DVec3 = neighbours.iter().map(|&n| self.nodes[n]).sum();
        Some(sum / neighbours.len() as f64)
    }

    /// One Newton step towards the surface for every boundary node.
    fn project(&mut self, on_boundary: &[bool], solid: &Solid, step: f64) -> usize {
        let mut moved = 0;
        for node in 0..self.nodes.len() {
            if !on_boundary[node] {
                continue;
            }
            let p = self.nodes[node];
            let value = solid.signed_distance(p);
            if value == 0.0 {
                continue;
            }
            let g = gradient(solid, p, step);
            let norm = g.length_squared();
            if norm < EPSILON {
                continue;
            }
            let target = p - g * (value / norm);
            if self.valid_at(node, target) {
                self.nodes[node] = target;
                moved += 1;
            }
        }
        moved
    }

    /// Laplacian sweeps over the interior nodes.
    fn smooth(&mut self, on_boundary: &[bool], passes: usize) -> usize {
        let mut moved = 0;
        for _ in 0..passes {
            for node in 0..self.nodes.len() {
                if on_boundary[node] {
                    continue;
                }
                let Some(target) = self.neighbour_centroid(node) else {
                    continue;
                };
                let current = self.nodes[node];
                if target == current || !self.valid_at(node, target) {
                    continue;
                }
                if self.worst_quality(node, target) >= self.worst_quality(node, current) {
                    self.nodes[node] = target;
                    moved += 1;
                }
            }
        }
        moved
    }
}

/// Projects boundary nodes onto the surface and smooths interior nodes.
///
/// `spacing` is the lattice spacing the mesh was generated with; it scales
/// the gradient step. Moves leaving any incident tetrahedron with six times
/// its volume at or below `min_orientation` are rejected.
pub fn optimize(
    nodes: &mut [DVec3],
    tetrahedra: &[[usize; 4]],
    on_boundary: &[bool],
    solid: &Solid,
    spacing: f64,
    passes: usize,
    min_orientation: f64,
) -> OptimizeReport {
    let mut optimizer = Optimizer::new(nodes, tetrahedra, min_orientation);
    let report = OptimizeReport {
        projected: optimizer.project(on_boundary, solid, GRADIENT_STEP_RATIO * spacing),
        smoothed: optimizer.smooth(on_boundary, passes),
    };
    debug!(
        projected = report.projected,
        smoothed = report.smoothed,
        passes,
        "optimized mesh"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::signed_volume;
    use pipemesh_geometry::Frustum;

    /// Vertical cylinder around the z axis.
    fn column(x: f64, radius: f64) -> Solid {
        let part = Frustum::cylinder(DVec3::new(x, 0.0, -2.0), DVec3::Z * 4.0, radius);
        Solid::from_part(part.expect("cylinder"))
    }

    /// Octahedron around node 0, split into eight tetrahedra.
    fn star(centre: DVec3) -> (Vec<DVec3>, Vec<[usize; 4]>) {
        let nodes = vec![
            centre,
            DVec3::new(0.5, 0.0, 0.0),
            DVec3::new(0.0, 0.5, 0.0),
            DVec3::new(-0.5, 0.0, 0.0),
            DVec3::new(0.0, -0.5, 0.0),
            DVec3::new(0.0, 0.0, 0.5),
            DVec3::new(0.0, 0.0, -0.5),
        ];
        let mut tets = Vec::new();
        for (a, b) in [(1, 2), (2, 3), (3, 4), (4, 1)] {
            tets.push([0, a, b, 5]);
            tets.push([0, b, a, 6]);
        }
        (nodes, tets)
    }

    #[test]
    fn test_star_is_positive() {
        let (nodes, tets) = star(DVec3::ZERO);
        for t in tets {
            let [a, b, c, d] = t.map(|n| nodes[n]);
            assert!(signed_volume(a, b, c, d) > 0.0);
        }
    }

    #[test]
    fn test_incidence() {
        let (nodes, tets) = star(DVec3::ZERO);
        let incidence = Incidence::new(nodes.len(), &tets);
        assert_eq!(incidence.of(0).len(), 8);
        assert_eq!(incidence.of(5), &[0, 2, 4, 6]);
    }

    #[test]
    fn test_smoothing_recentres_interior_node() {
        let (mut nodes, tets) = star(DVec3::new(0.2, 0.1, 0.05));
        let mut on_boundary = vec![true; nodes.len()];
        on_boundary[0] = false;
        let moved = Optimizer::new(&mut nodes, &tets, 0.0).smooth(&on_boundary, 2);
        assert_eq!(moved, 1);
        assert!(nodes[0].length() < 1e-12);
    }

    #[test]
    fn test_boundary_nodes_are_projected() {
        let (mut nodes, tets) = star(DVec3::ZERO);
        let solid = column(0.0, 0.45);
        let mut on_boundary = vec![false; nodes.len()];
        on_boundary[1] = true;
        let moved = Optimizer::new(&mut nodes, &tets, 0.0).project(&on_boundary, &solid, 1e-5);
        assert_eq!(moved, 1);
        assert!(solid.signed_distance(nodes[1]).abs() < 1e-6);
        assert!((nodes[1].x - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_moves_that_invert_are_rejected() {
        let (mut nodes, tets) = star(DVec3::ZERO);
        // Projecting node 1 onto this surface would drag it past node 0
        let solid = column(-3.0, 2.0);
        let before = nodes.clone();
        let mut on_boundary = vec![false; nodes.len()];
        on_boundary[1] = true;
        let report = optimize(&mut nodes, &tets, &on_boundary, &solid, 0.1, 0, 0.0);
        assert_eq!(report, OptimizeReport::default());
        assert_eq!(nodes, before);
    }
}
