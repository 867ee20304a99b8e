//! # Tetrahedral Mesh
//!
//! Result of a volume mesh generation: nodes, positively oriented
//! tetrahedra, and the outward boundary triangles grouped into surface
//! entities.

use crate::quality::{signed_volume, tetrahedron_quality};
use glam::DVec3;
use pipemesh_geometry::Patch;
use pipemesh_io::{CellBlock, CellKind, Mesh, GEOMETRICAL};

/// A boundary surface entity: one patch of one part of the solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceEntity {
    /// Surface tag, numbered from 1 in `(part, patch)` order
    pub tag: i32,
    /// Index of the part within the solid
    pub part: usize,
    pub patch: Patch,
}

/// Summary of a generated mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStatistics {
    pub nodes: usize,
    pub tetrahedra: usize,
    pub triangles: usize,
    pub surfaces: usize,
    /// Worst mean ratio over all tetrahedra
    pub min_quality: f64,
    pub mean_quality: f64,
    /// Total enclosed volume
    pub volume: f64,
}

/// A conforming tetrahedral mesh of one volume entity.
#[derive(Debug, Clone, PartialEq)]
pub struct TetMesh {
    /// Tag of the meshed volume
    pub volume_tag: i32,
    pub nodes: Vec<DVec3>,
    pub tetrahedra: Vec<[usize; 4]>,
    /// Boundary triangles oriented outward
    pub triangles: Vec<[usize; 3]>,
    /// Surface tag of every triangle
    pub triangle_entities: Vec<i32>,
    pub surfaces: Vec<SurfaceEntity>,
}

impl TetMesh {
    /// Computes counts, quality and volume.
    pub fn statistics(&self) -> MeshStatistics {
        let mut min_quality = f64::INFINITY;
        let mut quality_sum = 0.0;
        let mut volume = 0.0;
        for &tet in &self.tetrahedra {
            let q = tetrahedron_quality(&self.nodes, tet);
            min_quality = min_quality.min(q);
            quality_sum += q;
            let [a, b, c, d] = tet.map(|n| self.nodes[n]);
            volume += signed_volume(a, b, c, d);
        }
        let count = self.tetrahedra.len();
        MeshStatistics {
            nodes: self.nodes.len(),
            tetrahedra: count,
            triangles: self.triangles.len(),
            surfaces: self.surfaces.len(),
            min_quality: if count == 0 { 0.0 } else { min_quality },
            mean_quality: if count == 0 { 0.0 } else { quality_sum / count as f64 },
            volume,
        }
    }

    /// Converts to the interchange representation: one triangle block
    /// tagged with surface entities, then one tetrahedron block tagged with
    /// the volume.
    pub fn to_mesh(&self) -> Mesh {
        let triangles = CellBlock::new(
            CellKind::Triangle,
            self.triangles.iter().flatten().copied().collect(),
        );
        let tetrahedra = CellBlock::new(
            CellKind::Tetra,
            self.tetrahedra.iter().flatten().copied().collect(),
        );
        let mut mesh = Mesh::new(self.nodes.clone(), vec![triangles, tetrahedra]);
        mesh.cell_data.insert(
            GEOMETRICAL.to_string(),
            vec![
                self.triangle_entities.clone(),
                vec![self.volume_tag; self.tetrahedra.len()],
            ],
        );
        mesh
    }
}
