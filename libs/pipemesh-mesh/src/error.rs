//! # Mesh Generation Errors
//!
//! Error types for the meshing engine.

use pipemesh_geometry::ConstructionError;
use pipemesh_io::WriteError;
use thiserror::Error;

/// Errors that can occur while configuring the engine or generating a mesh.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshGenerationError {
    /// The model changed since the last synchronization.
    #[error("Model is not synchronized; call synchronize() after the last topology change")]
    NotSynchronized,

    /// The synchronized model holds no volume.
    #[error("Model contains no volume to mesh")]
    NoVolume,

    /// The synchronized model holds more than one volume.
    #[error("Model contains {count} volumes (expected exactly one)")]
    MultipleVolumes { count: usize },

    /// The target edge length cannot resolve the smallest feature.
    #[error("Edge length {edge_length} exceeds the smallest feature size {feature_size}")]
    ResolutionTooCoarse { edge_length: f64, feature_size: f64 },

    /// Lattice or mesh size over the configured limit.
    #[error("Too many elements: {count} (max: {max})")]
    TooManyElements { count: usize, max: usize },

    /// No tetrahedron survived.
    #[error("Mesh generation produced no tetrahedra")]
    EmptyMesh,

    /// The tetrahedra form several face-connected pieces.
    #[error("Mesh has {components} disconnected components (expected 1)")]
    Disconnected { components: usize },

    /// Lattice tetrahedra turned inside out while conforming to the surface.
    #[error("{count} tetrahedra inverted while conforming to the surface")]
    InvertedElements { count: usize },

    /// Only volume meshes can be generated.
    #[error("Unsupported mesh dimension {dim} (expected 3)")]
    UnsupportedDimension { dim: i32 },

    /// Option value out of range or inconsistent with other options.
    #[error("Invalid value for option {name}: {message}")]
    InvalidOption { name: String, message: String },

    /// Option name not known to the engine.
    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    /// Write requested before any mesh was generated.
    #[error("No mesh has been generated")]
    NoMesh,
}

impl MeshGenerationError {
    /// Creates an invalid option error.
    pub fn invalid_option(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by an engine session.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Construction failed: {0}")]
    Construction(#[from] ConstructionError),

    #[error("Mesh generation failed: {0}")]
    MeshGeneration(#[from] MeshGenerationError),

    #[error("Write failed: {0}")]
    Write(#[from] WriteError),
}

/// Result type alias for mesh generation.
pub type MeshResult<T> = Result<T, MeshGenerationError>;

/// Result type alias for session operations.
pub type EngineResult<T> = Result<T, EngineError>;
