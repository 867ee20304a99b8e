//! # Volume Mesh Generation
//!
//! Drives the mesher for one solid:
//!
//! ```text
//! sizing → lattice → stuffing → checks → optimization → boundary entities
//! ```

use crate::error::{MeshGenerationError, MeshResult};
use crate::lattice::Lattice;
use crate::optimize::optimize;
use crate::options::Options;
use crate::sizing::target_edge_length;
use crate::stuffing::stuff;
use crate::tet_mesh::{SurfaceEntity, TetMesh};
use crate::topology::{analyze, boundary_nodes};
use config::constants::{
    StuffingConfig, LATTICE_MARGIN_CELLS, MAX_TETRAHEDRA, MIN_PIECE_VOLUME_RATIO,
};
use glam::DVec3;
use pipemesh_geometry::{Patch, Solid};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Generates a tetrahedral mesh of `solid`, tagged as volume `volume_tag`.
///
/// # Errors
///
/// - [`MeshGenerationError::InvalidOption`] / [`MeshGenerationError::ResolutionTooCoarse`]
///   from sizing
/// - [`MeshGenerationError::TooManyElements`] when the lattice or the mesh
///   exceeds its limit
/// - [`MeshGenerationError::InvertedElements`] when snapping inverts an
///   element
/// - [`MeshGenerationError::EmptyMesh`] / [`MeshGenerationError::Disconnected`]
///   when the result is not a single non-empty piece
pub fn tetrahedralize(volume_tag: i32, solid: &Solid, options: &Options) -> MeshResult<TetMesh> {
    let h = target_edge_length(options, solid)?;
    let (min, max) = solid.bounding_box();
    let lattice = Lattice::covering(min, max, h, LATTICE_MARGIN_CELLS)?;
    info!(
        volume = volume_tag,
        edge_length = h,
        lattice_nodes = lattice.node_count(),
        lattice_tetrahedra = lattice.tetrahedron_count(),
        "meshing volume"
    );

    let config = StuffingConfig::default();
    let (mut stuffed, report) = stuff(&lattice, solid, &config)?;
    debug!(
        snapped = report.snapped,
        cut_points = report.cut_points,
        clipped = report.clipped,
        "stuffed lattice"
    );
    if report.degenerate > 0 {
        warn!(pieces = report.degenerate, "dropped degenerate pieces");
    }

    let count = stuffed.tetrahedra.len();
    if count == 0 {
        return Err(MeshGenerationError::EmptyMesh);
    }
    if count > MAX_TETRAHEDRA {
        return Err(MeshGenerationError::TooManyElements {
            count,
            max: MAX_TETRAHEDRA,
        });
    }

    let topology = analyze(&stuffed.tetrahedra);
    if topology.components != 1 {
        return Err(MeshGenerationError::Disconnected {
            components: topology.components,
        });
    }

    if options.optimize() {
        let on_boundary = boundary_nodes(stuffed.nodes.len(), &topology.boundary);
        optimize(
            &mut stuffed.nodes,
            &stuffed.tetrahedra,
            &on_boundary,
            solid,
            h,
            config.smoothing_passes,
            6.0 * MIN_PIECE_VOLUME_RATIO * h * h * h,
        );
    }

    let (triangle_entities, surfaces) = classify(solid, &stuffed.nodes, &topology.boundary);
    let mesh = TetMesh {
        volume_tag,
        nodes: stuffed.nodes,
        tetrahedra: stuffed.tetrahedra,
        triangles: topology.boundary,
        triangle_entities,
        surfaces,
    };

    let stats = mesh.statistics();
    info!(
        nodes = stats.nodes,
        tetrahedra = stats.tetrahedra,
        triangles = stats.triangles,
        surfaces = stats.surfaces,
        min_quality = stats.min_quality,
        mean_quality = stats.mean_quality,
        volume = stats.volume,
        "generated mesh"
    );
    debug!(bound = solid.volume_upper_bound(), "volume of the unfused parts");
    Ok(mesh)
}

/// Assigns every boundary triangle to the closest part patch and numbers
/// the patches in use.
fn classify(
    solid: &Solid,
    nodes: &[DVec3],
    triangles: &[[usize; 3]],
) -> (Vec<i32>, Vec<SurfaceEntity>) {
    let keys: Vec<(usize, Patch)> = triangles
        .par_iter()
        .map(|face| {
            let centroid = face.iter().map(|&n| nodes[n]).sum::<DVec3>() / 3.0;
            solid.closest_patch(centroid).unwrap_or((0, Patch::Lateral))
        })
        .collect();

    let mut tags: BTreeMap<(usize, Patch), i32> = keys.iter().map(|key| (*key, 0)).collect();
    let mut surfaces = Vec::with_capacity(tags.len());
    for (index, ((part, patch), tag)) in tags.iter_mut().enumerate() {
        *tag = index as i32 + 1;
        surfaces.push(SurfaceEntity {
            tag: *tag,
            part: *part,
            patch: *patch,
        });
    }

    let entities = keys.iter().map(|key| tags[key]).collect();
    (entities, surfaces)
}
