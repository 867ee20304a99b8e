//! # Pipeline Errors

use pipemesh_geometry::ConstructionError;
use pipemesh_io::ConvertError;
use pipemesh_mesh::{EngineError, MeshGenerationError};
use thiserror::Error;

/// Failure of any pipeline stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Geometry, meshing or native file output failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Reading the native file or writing the interchange file failed.
    #[error("Conversion failed: {0}")]
    Convert(#[from] ConvertError),
}

impl From<ConstructionError> for PipelineError {
    fn from(err: ConstructionError) -> Self {
        Self::Engine(err.into())
    }
}

impl From<MeshGenerationError> for PipelineError {
    fn from(err: MeshGenerationError) -> Self {
        Self::Engine(err.into())
    }
}

impl PipelineError {
    /// The construction error, if the geometry could not be built.
    pub fn as_construction(&self) -> Option<&ConstructionError> {
        match self {
            Self::Engine(EngineError::Construction(err)) => Some(err),
            _ => None,
        }
    }

    /// The mesh generation error, if meshing failed.
    pub fn as_mesh_generation(&self) -> Option<&MeshGenerationError> {
        match self {
            Self::Engine(EngineError::MeshGeneration(err)) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for pipeline stages.
pub type PipelineResult<T> = Result<T, PipelineError>;
