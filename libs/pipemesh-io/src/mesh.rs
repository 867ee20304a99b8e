//! # Mesh Model
//!
//! Format-neutral unstructured mesh: a point array, typed cell blocks with
//! flat connectivity, and integer tags attached per cell.
//!
//! ## Cell Data
//!
//! `cell_data[key][block][cell]` holds one value per cell of each block.
//! Gmsh entity tags live under [`GEOMETRICAL`] and physical group tags under
//! [`PHYSICAL`].

use glam::DVec3;
use std::collections::BTreeMap;

/// Cell data key of the geometric entity tag of each cell.
pub const GEOMETRICAL: &str = "gmsh:geometrical";

/// Cell data key of the physical group tag of each cell.
pub const PHYSICAL: &str = "gmsh:physical";

/// Element shape of a cell block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKind {
    Vertex,
    Line,
    Triangle,
    Quad,
    Tetra,
    Hexahedron,
    Wedge,
    Pyramid,
    /// Second-order triangle
    Triangle6,
    /// Second-order tetrahedron
    Tetra10,
}

impl CellKind {
    /// Number of nodes of one cell.
    pub const fn nodes_per_cell(self) -> usize {
        match self {
            CellKind::Vertex => 1,
            CellKind::Line => 2,
            CellKind::Triangle => 3,
            CellKind::Quad | CellKind::Tetra => 4,
            CellKind::Pyramid => 5,
            CellKind::Wedge | CellKind::Triangle6 => 6,
            CellKind::Hexahedron => 8,
            CellKind::Tetra10 => 10,
        }
    }

    /// Topological dimension.
    pub const fn dimension(self) -> u8 {
        match self {
            CellKind::Vertex => 0,
            CellKind::Line => 1,
            CellKind::Triangle | CellKind::Quad | CellKind::Triangle6 => 2,
            CellKind::Tetra
            | CellKind::Hexahedron
            | CellKind::Wedge
            | CellKind::Pyramid
            | CellKind::Tetra10 => 3,
        }
    }

    /// Gmsh element type number.
    pub const fn gmsh_type(self) -> i32 {
        match self {
            CellKind::Line => 1,
            CellKind::Triangle => 2,
            CellKind::Quad => 3,
            CellKind::Tetra => 4,
            CellKind::Hexahedron => 5,
            CellKind::Wedge => 6,
            CellKind::Pyramid => 7,
            CellKind::Triangle6 => 9,
            CellKind::Tetra10 => 11,
            CellKind::Vertex => 15,
        }
    }

    /// Kind for a Gmsh element type number.
    pub fn from_gmsh_type(number: i32) -> Option<Self> {
        Some(match number {
            1 => CellKind::Line,
            2 => CellKind::Triangle,
            3 => CellKind::Quad,
            4 => CellKind::Tetra,
            5 => CellKind::Hexahedron,
            6 => CellKind::Wedge,
            7 => CellKind::Pyramid,
            9 => CellKind::Triangle6,
            11 => CellKind::Tetra10,
            15 => CellKind::Vertex,
            _ => return None,
        })
    }

    /// Short lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            CellKind::Vertex => "vertex",
            CellKind::Line => "line",
            CellKind::Triangle => "triangle",
            CellKind::Quad => "quad",
            CellKind::Tetra => "tetra",
            CellKind::Hexahedron => "hexahedron",
            CellKind::Wedge => "wedge",
            CellKind::Pyramid => "pyramid",
            CellKind::Triangle6 => "triangle6",
            CellKind::Tetra10 => "tetra10",
        }
    }
}

/// Cells of a single kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellBlock {
    pub kind: CellKind,
    /// Point indices, `kind.nodes_per_cell()` per cell
    pub connectivity: Vec<usize>,
}

impl CellBlock {
    /// Creates a block from flat connectivity.
    pub fn new(kind: CellKind, connectivity: Vec<usize>) -> Self {
        Self { kind, connectivity }
    }

    /// Number of cells in the block.
    #[inline]
    pub fn len(&self) -> usize {
        self.connectivity.len() / self.kind.nodes_per_cell()
    }

    /// Returns true when the block holds no cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.connectivity.is_empty()
    }

    /// Iterates over the cells as index slices.
    pub fn cells(&self) -> impl Iterator<Item = &[usize]> {
        self.connectivity.chunks_exact(self.kind.nodes_per_cell())
    }
}

/// An unstructured mesh.
///
/// # Example
///
/// ```rust
/// use pipemesh_io::{CellBlock, CellKind, Mesh};
/// use glam::DVec3;
///
/// let points = vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
/// let mesh = Mesh::new(points, vec![CellBlock::new(CellKind::Tetra, vec![0, 1, 2, 3])]);
/// assert_eq!(mesh.cell_count(), 1);
/// assert_eq!(mesh.max_dimension(), Some(3));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub points: Vec<DVec3>,
    pub cells: Vec<CellBlock>,
    /// Per-cell integer data, one vector per block
    pub cell_data: BTreeMap<String, Vec<Vec<i32>>>,
    /// Named physical groups: name → `(tag, dimension)`
    pub field_data: BTreeMap<String, (i32, u8)>,
}

impl Mesh {
    /// Creates a mesh without cell data.
    pub fn new(points: Vec<DVec3>, cells: Vec<CellBlock>) -> Self {
        Self {
            points,
            cells,
            cell_data: BTreeMap::new(),
            field_data: BTreeMap::new(),
        }
    }

    /// Total number of cells over all blocks.
    pub fn cell_count(&self) -> usize {
        self.cells.iter().map(CellBlock::len).sum()
    }

    /// Number of cells of one kind.
    pub fn cell_count_of(&self, kind: CellKind) -> usize {
        self.cells
            .iter()
            .filter(|block| block.kind == kind)
            .map(CellBlock::len)
            .sum()
    }

    /// Highest topological dimension among non-empty blocks.
    pub fn max_dimension(&self) -> Option<u8> {
        self.cells
            .iter()
            .filter(|block| !block.is_empty())
            .map(|block| block.kind.dimension())
            .max()
    }

    /// Tags stored under `key` for block `block`.
    pub fn cell_tags(&self, key: &str, block: usize) -> Option<&[i32]> {
        self.cell_data
            .get(key)
            .and_then(|blocks| blocks.get(block))
            .map(Vec::as_slice)
    }

    /// Checks connectivity lengths, point indices and cell data alignment.
    pub fn validate(&self) -> Result<(), String> {
        for (index, block) in self.cells.iter().enumerate() {
            if block.connectivity.len() % block.kind.nodes_per_cell() != 0 {
                return Err(format!(
                    "block {index} ({}) has {} indices, not a multiple of {}",
                    block.kind.name(),
                    block.connectivity.len(),
                    block.kind.nodes_per_cell()
                ));
            }
            if let Some(bad) = block
                .connectivity
                .iter()
                .find(|&&i| i >= self.points.len())
            {
                return Err(format!(
                    "block {index} references point {bad} of {}",
                    self.points.len()
                ));
            }
        }
        for (key, blocks) in &self.cell_data {
            if blocks.len() != self.cells.len() {
                return Err(format!(
                    "cell data '{key}' has {} blocks, mesh has {}",
                    blocks.len(),
                    self.cells.len()
                ));
            }
            for (index, (values, block)) in blocks.iter().zip(&self.cells).enumerate() {
                if values.len() != block.len() {
                    return Err(format!(
                        "cell data '{key}' block {index} has {} values for {} cells",
                        values.len(),
                        block.len()
                    ));
                }
            }
        }
        Ok(())
    }
}
