//! # Pipeline
//!
//! The Mesh Generator and Format Converter stages, and [`run`] which chains
//! all three stages inside one engine session.

use crate::builder::build_bifurcation;
use crate::error::PipelineResult;
use crate::parameters::PipeParameters;
use config::constants::{CONTACT_TOLERANCE, INTERCHANGE_MESH_FILE, NATIVE_MESH_FILE};
use pipemesh_geometry::DimTag;
use pipemesh_io::{ConversionSummary, ConvertError};
use pipemesh_mesh::options::{
    MESH_SIZE_EXTEND_FROM_BOUNDARY, MESH_SIZE_MAX, MESH_SIZE_MIN, OPTIMIZE,
};
use pipemesh_mesh::{EngineResult, MeshStatistics, Session};
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of a full pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Handle of the fused solid
    pub volume: DimTag,
    /// Uncovered pipe ends of the fused solid
    pub openings: usize,
    pub mesh: MeshStatistics,
    pub conversion: ConversionSummary,
    pub native_path: PathBuf,
    pub interchange_path: PathBuf,
}

/// Meshes the session's model at a uniform edge length and writes the
/// native mesh file to `path`.
///
/// # Errors
///
/// [`pipemesh_mesh::EngineError::MeshGeneration`] when the solid cannot be
/// meshed at `params.edgelen`, [`pipemesh_mesh::EngineError::Write`] when
/// the file cannot be written.
pub fn generate_mesh(
    session: &mut Session,
    params: &PipeParameters,
    path: impl AsRef<Path>,
) -> EngineResult<MeshStatistics> {
    let options = session.options_mut();
    options.set_number(MESH_SIZE_EXTEND_FROM_BOUNDARY, 0.0)?;
    options.set_number(MESH_SIZE_MAX, params.edgelen)?;
    options.set_number(MESH_SIZE_MIN, params.edgelen)?;
    options.set_number(OPTIMIZE, 1.0)?;

    session.occ().synchronize();
    let stats = session.generate(3)?.statistics();
    session.write(path)?;
    Ok(stats)
}

/// Re-serializes the native mesh file `input` as the interchange file
/// `output`.
///
/// # Errors
///
/// [`ConvertError::Read`] for a missing or malformed input,
/// [`ConvertError::Write`] when the output cannot be written.
pub fn convert_mesh(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<ConversionSummary, ConvertError> {
    pipemesh_io::convert(input, output)
}

/// Builds, meshes and converts the bifurcation, writing
/// `bifurcation.msh` and `bifurcation.xml` into `dir`.
///
/// The engine session spans all stages and is finalized on return, also
/// when a stage fails. Files written before a failure are left in place.
pub fn run(params: &PipeParameters, dir: impl AsRef<Path>) -> PipelineResult<PipelineReport> {
    let dir = dir.as_ref();
    let native_path = dir.join(NATIVE_MESH_FILE);
    let interchange_path = dir.join(INTERCHANGE_MESH_FILE);

    let mut session = Session::initialize();
    let volume = build_bifurcation(session.occ(), params)?;
    let solid = session.kernel().solid(volume)?;
    let openings = solid.openings(CONTACT_TOLERANCE * solid.diagonal()).len();
    info!(volume = %volume, openings, "geometry ready");

    let mesh = generate_mesh(&mut session, params, &native_path)?;
    let conversion = convert_mesh(&native_path, &interchange_path)?;
    info!(
        native = %native_path.display(),
        interchange = %interchange_path.display(),
        vertices = conversion.points,
        cells = conversion.cells_written,
        "pipeline complete"
    );

    Ok(PipelineReport {
        volume,
        openings,
        mesh,
        conversion,
        native_path,
        interchange_path,
    })
}
