//! # Lattice Stuffing
//!
//! Fills an implicit solid with tetrahedra by conforming a BCC lattice to
//! its surface.
//!
//! ## Pipeline
//!
//! ```text
//! sample ──► snap ──► cut points ──► clip ──► compact
//!   │          │           │            │
//!   │          │           │            └─ convex pieces of tet ∩ {f ≤ 0}
//!   │          │           └─ one shared point per sign-changing edge
//!   │          └─ nodes near a crossing move onto the surface
//!   └─ signed distance at every lattice node
//! ```
//!
//! Node ids are stable through the pipeline: lattice nodes keep their
//! lattice ids and cut points are numbered after them, in edge order. Every
//! tetrahedron face is therefore triangulated identically by both tets that
//! share it, which keeps the output conforming.

mod clip;

pub use clip::{Clipped, Clipper};

use crate::error::{MeshGenerationError, MeshResult};
use crate::lattice::Lattice;
use config::constants::{
    StuffingConfig, MIN_PIECE_VOLUME_RATIO, ROOT_REFINEMENT_STEPS, SURFACE_TOLERANCE,
};
use glam::DVec3;
use pipemesh_geometry::Solid;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

// =============================================================================
// NODE FIELD
// =============================================================================

/// Positions and signed distances of the lattice nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeField {
    pub positions: Vec<DVec3>,
    pub values: Vec<f64>,
}

impl NodeField {
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Samples the signed distance at every lattice node.
///
/// Values within `SURFACE_TOLERANCE · h` of zero become exactly zero.
pub fn sample(lattice: &Lattice, solid: &Solid) -> NodeField {
    let tolerance = SURFACE_TOLERANCE * lattice.spacing();
    let positions: Vec<DVec3> = (0..lattice.node_count())
        .into_par_iter()
        .map(|node| lattice.position(node))
        .collect();
    let values = positions
        .par_iter()
        .map(|p| {
            let value = solid.signed_distance(*p);
            if value.abs() < tolerance {
                0.0
            } else {
                value
            }
        })
        .collect();
    NodeField { positions, values }
}

#[inline]
fn opposite(a: f64, b: f64) -> bool {
    (a < 0.0 && b > 0.0) || (a > 0.0 && b < 0.0)
}

/// Fraction along `a → b` where the surface crosses, by bisection on the
/// exact signed distance.
fn refine_crossing(solid: &Solid, a: DVec3, value_a: f64, b: DVec3) -> f64 {
    let (mut lo, mut hi) = (0.0, 1.0);
    let inside = value_a < 0.0;
    for _ in 0..ROOT_REFINEMENT_STEPS {
        let mid = 0.5 * (lo + hi);
        if (solid.signed_distance(a.lerp(b, mid)) < 0.0) == inside {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Moves lattice nodes that lie close to a surface crossing onto it.
///
/// A node snaps when a crossing on one of its edges is within
/// `snap_fraction` of the edge length. Among several candidates the closest
/// crossing wins; ties keep the first in edge order. Returns the number of
/// snapped nodes.
pub fn snap(lattice: &Lattice, solid: &Solid, field: &mut NodeField, snap_fraction: f64) -> usize {
    let candidates: Vec<(usize, f64, DVec3)> = {
        let field = &*field;
        (0..lattice.node_count())
            .into_par_iter()
            .flat_map_iter(|a| {
                let mut neighbours = Vec::new();
                lattice.edges_from(a, &mut neighbours);
                let mut found = Vec::new();
                for b in neighbours {
                    let (va, vb) = (field.values[a], field.values[b]);
                    if !opposite(va, vb) {
                        continue;
                    }
                    let (pa, pb) = (field.positions[a], field.positions[b]);
                    let t = refine_crossing(solid, pa, va, pb);
                    let crossing = pa.lerp(pb, t);
                    let length = (pb - pa).length();
                    if t < snap_fraction {
                        found.push((a, t * length, crossing));
                    } else if 1.0 - t < snap_fraction {
                        found.push((b, (1.0 - t) * length, crossing));
                    }
                }
                found
            })
            .collect()
    };

    let mut best: HashMap<usize, (f64, DVec3)> = HashMap::new();
    for (node, distance, target) in candidates {
        match best.get(&node) {
            Some((current, _)) if *current <= distance => {}
            _ => {
                best.insert(node, (distance, target));
            }
        }
    }

    for (&node, &(_, target)) in &best {
        field.positions[node] = target;
        field.values[node] = 0.0;
    }
    best.len()
}

// =============================================================================
// CUT POINTS
// =============================================================================

/// Points where the surface crosses lattice edges whose endpoints have
/// strictly opposite signs.
///
/// Cut points are placed by linear interpolation of the node values, so the
/// part of a tetrahedron on the negative side stays a convex polytope.
#[derive(Debug, Clone, Default)]
pub struct CutPoints {
    base: usize,
    ids: HashMap<(usize, usize), usize>,
    positions: Vec<DVec3>,
}

impl CutPoints {
    /// Finds all cut points. Ids start at `lattice.node_count()`.
    pub fn build(lattice: &Lattice, field: &NodeField) -> Self {
        let edges: Vec<((usize, usize), DVec3)> = (0..lattice.node_count())
            .into_par_iter()
            .flat_map_iter(|a| {
                let mut neighbours = Vec::new();
                lattice.edges_from(a, &mut neighbours);
                neighbours.into_iter().filter_map(move |b| {
                    let (va, vb) = (field.values[a], field.values[b]);
                    if !opposite(va, vb) {
                        return None;
                    }
                    let t = va / (va - vb);
                    let point = field.positions[a].lerp(field.positions[b], t);
                    Some(((a.min(b), a.max(b)), point))
                })
            })
            .collect();

        let base = lattice.node_count();
        let mut ids = HashMap::with_capacity(edges.len());
        let mut positions = Vec::with_capacity(edges.len());
        for (key, point) in edges {
            ids.insert(key, base + positions.len());
            positions.push(point);
        }
        Self {
            base,
            ids,
            positions,
        }
    }

    /// Id of the cut point on edge `(a, b)`, in either order.
    #[inline]
    pub fn get(&self, a: usize, b: usize) -> Option<usize> {
        self.ids.get(&(a.min(b), a.max(b))).copied()
    }

    /// First cut point id.
    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of the cut point with id `id`.
    #[inline]
    pub fn position(&self, id: usize) -> DVec3 {
        self.positions[id - self.base]
    }
}

// =============================================================================
// STUFFING
// =============================================================================

/// Tetrahedra filling the solid, with compact node numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct Stuffed {
    pub nodes: Vec<DVec3>,
    pub tetrahedra: Vec<[usize; 4]>,
}

/// Counters reported by one stuffing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StuffingReport {
    pub snapped: usize,
    pub cut_points: usize,
    pub clipped: usize,
    pub degenerate: usize,
}

#[derive(Default)]
struct CellOutput {
    pieces: Vec<[usize; 4]>,
    clipped: usize,
    degenerate: usize,
    inverted: usize,
}

/// Fills `solid` with tetrahedra conforming to its surface.
///
/// # Errors
///
/// [`MeshGenerationError::InvertedElements`] when snapping turned any
/// uncut lattice tetrahedron inside out.
pub fn stuff(
    lattice: &Lattice,
    solid: &Solid,
    config: &StuffingConfig,
) -> MeshResult<(Stuffed, StuffingReport)> {
    let mut field = sample(lattice, solid);
    let snapped = snap(lattice, solid, &mut field, config.snap_fraction);
    let cuts = CutPoints::build(lattice, &field);
    debug!(snapped, cut_points = cuts.len(), "conformed lattice to surface");

    let h = lattice.spacing();
    let clipper = Clipper::new(&field, &cuts, solid, 6.0 * MIN_PIECE_VOLUME_RATIO * h * h * h);

    let outputs: Vec<CellOutput> = (0..lattice.cell_count())
        .into_par_iter()
        .map(|cell| {
            let mut tets = Vec::new();
            lattice.cell_tetrahedra(cell, &mut tets);
            let mut output = CellOutput::default();
            for tet in tets {
                match clipper.clip(tet, &mut output.pieces) {
                    Clipped::Outside | Clipped::Whole => {}
                    Clipped::Pieces { degenerate } => {
                        output.clipped += 1;
                        output.degenerate += degenerate;
                    }
                    Clipped::Inverted => output.inverted += 1,
                }
            }
            output
        })
        .collect();

    let mut report = StuffingReport {
        snapped,
        cut_points: cuts.len(),
        ..StuffingReport::default()
    };
    let mut inverted = 0;
    let mut pieces = Vec::new();
    for output in outputs {
        report.clipped += output.clipped;
        report.degenerate += output.degenerate;
        inverted += output.inverted;
        pieces.extend(output.pieces);
    }
    if inverted > 0 {
        return Err(MeshGenerationError::InvertedElements { count: inverted });
    }

    Ok((compact(&field, &cuts, pieces), report))
}

/// Drops unused nodes and renumbers the rest in ascending id order.
fn compact(field: &NodeField, cuts: &CutPoints, mut tetrahedra: Vec<[usize; 4]>) -> Stuffed {
    let total = field.len() + cuts.len();
    let mut remap = vec![usize::MAX; total];
    for tet in &tetrahedra {
        for &node in tet {
            remap[node] = 0;
        }
    }

    let mut nodes = Vec::new();
    for (old, slot) in remap.iter_mut().enumerate() {
        if *slot == 0 {
            *slot = nodes.len();
            nodes.push(if old < field.len() {
                field.positions[old]
            } else {
                cuts.position(old)
            });
        }
    }

    for tet in &mut tetrahedra {
        *tet = tet.map(|node| remap[node]);
    }
    Stuffed { nodes, tetrahedra }
}

#[cfg(test)]
mod tests;
