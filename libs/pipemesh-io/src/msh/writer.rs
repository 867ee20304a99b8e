//! Gmsh MSH 4.1 ASCII writer.

use crate::error::{WriteError, WriteResult};
use crate::mesh::{CellKind, Mesh, GEOMETRICAL, PHYSICAL};
use config::constants::MSH_FORMAT_VERSION;
use glam::DVec3;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Entity tag used for cells without a `gmsh:geometrical` value.
const DEFAULT_ENTITY: i32 = 1;

/// Geometric entity collected from cell tags.
#[derive(Debug)]
struct Entity {
    min: DVec3,
    max: DVec3,
    physicals: BTreeSet<i32>,
}

impl Entity {
    fn new() -> Self {
        Self {
            min: DVec3::splat(f64::INFINITY),
            max: DVec3::splat(f64::NEG_INFINITY),
            physicals: BTreeSet::new(),
        }
    }

    fn include(&mut self, p: DVec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

/// Element blocks keyed by `(dimension, entity tag, kind)`.
type Blocks = BTreeMap<(u8, i32, CellKind), Vec<usize>>;

/// Writes `mesh` as an ASCII MSH 4.1 file, creating or truncating `path`.
///
/// Cells are regrouped into one element block per `(dimension, entity tag,
/// element type)`; all nodes go into a single node block attached to the
/// first entity of highest dimension.
///
/// # Errors
///
/// [`WriteError::NoCells`] for a mesh without cells,
/// [`WriteError::InvalidMesh`] when connectivity or tags are inconsistent.
pub fn write_msh(mesh: &Mesh, path: impl AsRef<Path>) -> WriteResult<()> {
    let file = File::create(path.as_ref())?;
    let mut out = BufWriter::new(file);
    write_msh_to(mesh, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Serializes `mesh` to MSH 4.1 text.
pub fn to_msh_string(mesh: &Mesh) -> WriteResult<String> {
    let mut buffer = Vec::new();
    write_msh_to(mesh, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Serializes `mesh` to any writer.
pub fn write_msh_to<W: Write>(mesh: &Mesh, out: &mut W) -> WriteResult<()> {
    mesh.validate().map_err(WriteError::InvalidMesh)?;
    if mesh.cell_count() == 0 {
        return Err(WriteError::NoCells);
    }

    let (entities, blocks) = collect(mesh);
    debug!(
        entities = entities.len(),
        blocks = blocks.len(),
        "writing MSH {MSH_FORMAT_VERSION}"
    );

    writeln!(out, "$MeshFormat")?;
    writeln!(out, "{MSH_FORMAT_VERSION} 0 8")?;
    writeln!(out, "$EndMeshFormat")?;

    if !mesh.field_data.is_empty() {
        writeln!(out, "$PhysicalNames")?;
        writeln!(out, "{}", mesh.field_data.len())?;
        for (name, (tag, dim)) in &mesh.field_data {
            writeln!(out, "{dim} {tag} \"{name}\"")?;
        }
        writeln!(out, "$EndPhysicalNames")?;
    }

    write_entities(out, &entities)?;
    write_nodes(out, mesh, &entities)?;
    write_elements(out, &blocks)?;
    Ok(())
}

fn collect(mesh: &Mesh) -> (BTreeMap<(u8, i32), Entity>, Blocks) {
    let mut entities: BTreeMap<(u8, i32), Entity> = BTreeMap::new();
    let mut blocks: Blocks = BTreeMap::new();

    for (b, block) in mesh.cells.iter().enumerate() {
        let dim = block.kind.dimension();
        let geometrical = mesh.cell_tags(GEOMETRICAL, b);
        let physical = mesh.cell_tags(PHYSICAL, b);

        for (i, cell) in block.cells().enumerate() {
            let tag = geometrical.map_or(DEFAULT_ENTITY, |tags| tags[i]);
            let entity = entities.entry((dim, tag)).or_insert_with(Entity::new);
            for &node in cell {
                entity.include(mesh.points[node]);
            }
            if let Some(&group) = physical.and_then(|tags| tags.get(i)) {
                if group != 0 {
                    entity.physicals.insert(group);
                }
            }
            blocks
                .entry((dim, tag, block.kind))
                .or_default()
                .extend_from_slice(cell);
        }
    }
    (entities, blocks)
}

fn write_entities<W: Write>(out: &mut W, entities: &BTreeMap<(u8, i32), Entity>) -> WriteResult<()> {
    let count = |dim: u8| entities.keys().filter(|(d, _)| *d == dim).count();
    writeln!(out, "$Entities")?;
    writeln!(out, "{} {} {} {}", count(0), count(1), count(2), count(3))?;

    for ((dim, tag), entity) in entities {
        let physicals: Vec<String> = entity.physicals.iter().map(i32::to_string).collect();
        let physicals = if physicals.is_empty() {
            "0".to_string()
        } else {
            format!("{} {}", physicals.len(), physicals.join(" "))
        };
        let (min, max) = (entity.min, entity.max);
        if *dim == 0 {
            writeln!(out, "{tag} {} {} {} {physicals}", min.x, min.y, min.z)?;
        } else {
            writeln!(
                out,
                "{tag} {} {} {} {} {} {} {physicals} 0",
                min.x, min.y, min.z, max.x, max.y, max.z
            )?;
        }
    }
    writeln!(out, "$EndEntities")?;
    Ok(())
}

fn write_nodes<W: Write>(
    out: &mut W,
    mesh: &Mesh,
    entities: &BTreeMap<(u8, i32), Entity>,
) -> WriteResult<()> {
    let n = mesh.points.len();
    // Highest dimension first, lowest tag within it
    let (dim, tag) = entities
        .keys()
        .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .copied()
        .unwrap_or((3, DEFAULT_ENTITY));

    writeln!(out, "$Nodes")?;
    writeln!(out, "1 {n} 1 {n}")?;
    writeln!(out, "{dim} {tag} 0 {n}")?;
    for i in 1..=n {
        writeln!(out, "{i}")?;
    }
    for p in &mesh.points {
        writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
    }
    writeln!(out, "$EndNodes")?;
    Ok(())
}

fn write_elements<W: Write>(out: &mut W, blocks: &Blocks) -> WriteResult<()> {
    let total: usize = blocks
        .iter()
        .map(|((_, _, kind), conn)| conn.len() / kind.nodes_per_cell())
        .sum();

    writeln!(out, "$Elements")?;
    writeln!(out, "{} {total} 1 {total}", blocks.len())?;
    let mut element = 0usize;
    for ((dim, tag, kind), connectivity) in blocks {
        let npc = kind.nodes_per_cell();
        writeln!(
            out,
            "{dim} {tag} {} {}",
            kind.gmsh_type(),
            connectivity.len() / npc
        )?;
        for cell in connectivity.chunks_exact(npc) {
            element += 1;
            write!(out, "{element}")?;
            for node in cell {
                write!(out, " {}", node + 1)?;
            }
            writeln!(out)?;
        }
    }
    writeln!(out, "$EndElements")?;
    Ok(())
}
