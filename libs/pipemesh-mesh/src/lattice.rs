//! # Body-Centred Cubic Lattice
//!
//! Background lattice of the stuffing mesher. Nodes are the corners of a
//! regular grid of cubes plus one node at the centre of every cube.
//!
//! ## Tetrahedra
//!
//! Every pair of face-adjacent cubes contributes four tetrahedra, each made
//! of the two cube centres and one edge of the shared face:
//!
//! ```text
//!        q3 ─────── q2
//!        │ ╲       ╱ │
//!   c1 ──┼── face ──┼── c2      tets: (c1, c2, q0, q1), (c1, c2, q1, q2),
//!        │ ╱       ╲ │                (c1, c2, q2, q3), (c1, c2, q3, q0)
//!        q0 ─────── q1
//! ```
//!
//! All lattice tetrahedra are congruent and positively oriented.
//!
//! ## Node Numbering
//!
//! Corners come first, `i + (nx + 1) * (j + (ny + 1) * k)`, followed by the
//! centres, `corners + i + nx * (j + ny * k)`.

use crate::error::{MeshGenerationError, MeshResult};
use config::constants::MAX_LATTICE_NODES;
use glam::DVec3;

/// A BCC lattice over an axis-aligned box.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    origin: DVec3,
    spacing: f64,
    /// Cubes per axis
    cells: [usize; 3],
}

impl Lattice {
    /// Creates a lattice of cube size `spacing` covering `[min, max]` grown
    /// by `margin` cubes on every side.
    ///
    /// # Errors
    ///
    /// [`MeshGenerationError::TooManyElements`] when the lattice would hold
    /// more than `MAX_LATTICE_NODES` nodes.
    pub fn covering(min: DVec3, max: DVec3, spacing: f64, margin: usize) -> MeshResult<Self> {
        let pad = DVec3::splat(spacing * margin as f64);
        let origin = min - pad;
        let extent = (max + pad - origin) / spacing;

        // Estimate in floating point first so huge boxes cannot overflow
        let estimate = (extent.x.ceil() + 1.0) * (extent.y.ceil() + 1.0) * (extent.z.ceil() + 1.0)
            + extent.x.ceil() * extent.y.ceil() * extent.z.ceil();
        if !estimate.is_finite() || estimate > MAX_LATTICE_NODES as f64 {
            return Err(MeshGenerationError::TooManyElements {
                count: if estimate.is_finite() { estimate as usize } else { usize::MAX },
                max: MAX_LATTICE_NODES,
            });
        }

        let cells = [
            (extent.x.ceil() as usize).max(1),
            (extent.y.ceil() as usize).max(1),
            (extent.z.ceil() as usize).max(1),
        ];
        Ok(Self {
            origin,
            spacing,
            cells,
        })
    }

    #[inline]
    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    #[inline]
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    /// Cubes per axis.
    #[inline]
    pub fn cells(&self) -> [usize; 3] {
        self.cells
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells[0] * self.cells[1] * self.cells[2]
    }

    #[inline]
    pub fn corner_count(&self) -> usize {
        (self.cells[0] + 1) * (self.cells[1] + 1) * (self.cells[2] + 1)
    }

    /// Corners plus centres.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.corner_count() + self.cell_count()
    }

    /// Number of lattice tetrahedra.
    pub fn tetrahedron_count(&self) -> usize {
        let [nx, ny, nz] = self.cells;
        4 * ((nx - 1) * ny * nz + nx * (ny - 1) * nz + nx * ny * (nz - 1))
    }

    #[inline]
    fn corner(&self, i: usize, j: usize, k: usize) -> usize {
        i + (self.cells[0] + 1) * (j + (self.cells[1] + 1) * k)
    }

    #[inline]
    fn centre(&self, i: usize, j: usize, k: usize) -> usize {
        self.corner_count() + i + self.cells[0] * (j + self.cells[1] * k)
    }

    fn cell_coordinates(&self, cell: usize) -> (usize, usize, usize) {
        let [nx, ny, _] = self.cells;
        (cell % nx, (cell / nx) % ny, cell / (nx * ny))
    }

    /// Position of a node.
    pub fn position(&self, node: usize) -> DVec3 {
        let corners = self.corner_count();
        let index = if node < corners {
            let (sx, sy) = (self.cells[0] + 1, self.cells[1] + 1);
            DVec3::new(
                (node % sx) as f64,
                ((node / sx) % sy) as f64,
                (node / (sx * sy)) as f64,
            )
        } else {
            let (i, j, k) = self.cell_coordinates(node - corners);
            DVec3::new(i as f64 + 0.5, j as f64 + 0.5, k as f64 + 0.5)
        };
        self.origin + index * self.spacing
    }

    /// Appends the tetrahedra owned by `cell`: those around its faces
    /// towards the `+x`, `+y` and `+z` neighbours.
    pub fn cell_tetrahedra(&self, cell: usize, out: &mut Vec<[usize; 4]>) {
        let [nx, ny, nz] = self.cells;
        let (i, j, k) = self.cell_coordinates(cell);
        let c1 = self.centre(i, j, k);

        if i + 1 < nx {
            let c2 = self.centre(i + 1, j, k);
            let face = [
                self.corner(i + 1, j, k),
                self.corner(i + 1, j + 1, k),
                self.corner(i + 1, j + 1, k + 1),
                self.corner(i + 1, j, k + 1),
            ];
            push_face_tetrahedra(c1, c2, face, out);
        }
        if j + 1 < ny {
            let c2 = self.centre(i, j + 1, k);
            let face = [
                self.corner(i, j + 1, k),
                self.corner(i, j + 1, k + 1),
                self.corner(i + 1, j + 1, k + 1),
                self.corner(i + 1, j + 1, k),
            ];
            push_face_tetrahedra(c1, c2, face, out);
        }
        if k + 1 < nz {
            let c2 = self.centre(i, j, k + 1);
            let face = [
                self.corner(i, j, k + 1),
                self.corner(i + 1, j, k + 1),
                self.corner(i + 1, j + 1, k + 1),
                self.corner(i, j + 1, k + 1),
            ];
            push_face_tetrahedra(c1, c2, face, out);
        }
    }

    /// Appends the lattice edges starting at `node`, each edge listed from
    /// exactly one of its endpoints.
    ///
    /// Corners own their `+x`, `+y`, `+z` axis edges; centres own their
    /// forward centre-to-centre edges and the eight diagonals to the corners
    /// of their cube.
    pub fn edges_from(&self, node: usize, out: &mut Vec<usize>) {
        let [nx, ny, nz] = self.cells;
        let corners = self.corner_count();
        if node < corners {
            let (sx, sy) = (nx + 1, ny + 1);
            let (i, j, k) = (node % sx, (node / sx) % sy, node / (sx * sy));
            if i < nx {
                out.push(self.corner(i + 1, j, k));
            }
            if j < ny {
                out.push(self.corner(i, j + 1, k));
            }
            if k < nz {
                out.push(self.corner(i, j, k + 1));
            }
        } else {
            let (i, j, k) = self.cell_coordinates(node - corners);
            if i + 1 < nx {
                out.push(self.centre(i + 1, j, k));
            }
            if j + 1 < ny {
                out.push(self.centre(i, j + 1, k));
            }
            if k + 1 < nz {
                out.push(self.centre(i, j, k + 1));
            }
            for dk in 0..2 {
                for dj in 0..2 {
                    for di in 0..2 {
                        out.push(self.corner(i + di, j + dj, k + dk));
                    }
                }
            }
        }
    }
}

fn push_face_tetrahedra(c1: usize, c2: usize, face: [usize; 4], out: &mut Vec<[usize; 4]>) {
    for m in 0..4 {
        out.push([c1, c2, face[m], face[(m + 1) % 4]]);
    }
}
