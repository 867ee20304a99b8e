//! # Pipemesh IO
//!
//! Mesh file I/O and format conversion.
//!
//! ## Formats
//!
//! | Format     | Extension | Read        | Write |
//! |------------|-----------|-------------|-------|
//! | Gmsh MSH   | `.msh`    | 4.1, 2.x    | 4.1   |
//! | DOLFIN XML | `.xml`    | yes         | yes   |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pipemesh_io::convert;
//!
//! let summary = convert("bifurcation.msh", "bifurcation.xml").unwrap();
//! println!("{} vertices, {} cells", summary.points, summary.cells_written);
//! ```

pub mod dolfin;
pub mod error;
pub mod format;
pub mod mesh;
pub mod msh;

pub use error::{ConvertError, ReadError, ReadResult, WriteError, WriteResult};
pub use format::MeshFormat;
pub use mesh::{CellBlock, CellKind, Mesh, GEOMETRICAL, PHYSICAL};

use std::path::Path;
use tracing::info;

fn format_of(path: &Path) -> Option<MeshFormat> {
    MeshFormat::from_path(path)
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reads a mesh file, choosing the format from the extension.
///
/// # Errors
///
/// [`ReadError::UnsupportedFormat`] for unknown extensions, otherwise the
/// errors of the format reader.
pub fn read(path: impl AsRef<Path>) -> ReadResult<Mesh> {
    let path = path.as_ref();
    let format = format_of(path).ok_or_else(|| {
        ReadError::UnsupportedFormat(format!("unknown extension '.{}'", extension_of(path)))
    })?;
    let mesh = match format {
        MeshFormat::Gmsh => msh::read_msh(path)?,
        MeshFormat::Dolfin => dolfin::read_dolfin(path)?,
    };
    info!(
        path = %path.display(),
        format = format.name(),
        points = mesh.points.len(),
        cells = mesh.cell_count(),
        "read mesh"
    );
    Ok(mesh)
}

/// Writes a mesh file, choosing the format from the extension. Returns the
/// number of cells written.
pub fn write(mesh: &Mesh, path: impl AsRef<Path>) -> WriteResult<usize> {
    let path = path.as_ref();
    let format = format_of(path).ok_or_else(|| {
        WriteError::UnsupportedFormat(format!("unknown extension '.{}'", extension_of(path)))
    })?;
    let written = match format {
        MeshFormat::Gmsh => {
            msh::write_msh(mesh, path)?;
            mesh.cell_count()
        }
        MeshFormat::Dolfin => dolfin::write_dolfin(mesh, path)?,
    };
    info!(
        path = %path.display(),
        format = format.name(),
        points = mesh.points.len(),
        cells = written,
        "wrote mesh"
    );
    Ok(written)
}

/// Outcome of [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Points read and written
    pub points: usize,
    /// Cells in the input file
    pub cells_read: usize,
    /// Cells in the output file
    pub cells_written: usize,
}

/// Reads `input` and re-serializes it as `output`, each format chosen from
/// the extension. Point coordinates and cell connectivity are carried over
/// unchanged.
pub fn convert(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<ConversionSummary, ConvertError> {
    let mesh = read(input)?;
    let cells_written = write(&mesh, output)?;
    Ok(ConversionSummary {
        points: mesh.points.len(),
        cells_read: mesh.cell_count(),
        cells_written,
    })
}
