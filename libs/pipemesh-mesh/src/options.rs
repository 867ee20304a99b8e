//! # Engine Options
//!
//! Named numeric options in the `Mesh.*` namespace.
//!
//! | Name                              | Default | Meaning                               |
//! |-----------------------------------|---------|---------------------------------------|
//! | `Mesh.MeshSizeMin`                | 0       | lower bound of the element size       |
//! | `Mesh.MeshSizeMax`                | 1e22    | upper bound of the element size       |
//! | `Mesh.MeshSizeFactor`             | 1       | multiplier applied before clamping    |
//! | `Mesh.MeshSizeExtendFromBoundary` | 1       | derive the size from geometry features |
//! | `Mesh.Optimize`                   | 1       | smooth and project after generation   |

use crate::error::{MeshGenerationError, MeshResult};

pub const MESH_SIZE_MIN: &str = "Mesh.MeshSizeMin";
pub const MESH_SIZE_MAX: &str = "Mesh.MeshSizeMax";
pub const MESH_SIZE_FACTOR: &str = "Mesh.MeshSizeFactor";
pub const MESH_SIZE_EXTEND_FROM_BOUNDARY: &str = "Mesh.MeshSizeExtendFromBoundary";
pub const OPTIMIZE: &str = "Mesh.Optimize";

/// Default of `Mesh.MeshSizeMax`; values this large mean "no bound".
pub const UNBOUNDED_SIZE: f64 = 1e22;

/// Mesh generation options.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    mesh_size_min: f64,
    mesh_size_max: f64,
    mesh_size_factor: f64,
    extend_from_boundary: f64,
    optimize: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mesh_size_min: 0.0,
            mesh_size_max: UNBOUNDED_SIZE,
            mesh_size_factor: 1.0,
            extend_from_boundary: 1.0,
            optimize: 1.0,
        }
    }
}

impl Options {
    /// Sets a named option.
    ///
    /// # Errors
    ///
    /// [`MeshGenerationError::UnknownOption`] for names outside the table
    /// above, [`MeshGenerationError::InvalidOption`] for non-finite or
    /// out-of-range values.
    pub fn set_number(&mut self, name: &str, value: f64) -> MeshResult<()> {
        if !value.is_finite() {
            return Err(MeshGenerationError::invalid_option(name, format!("{value} is not finite")));
        }
        match name {
            MESH_SIZE_MIN => {
                if value < 0.0 {
                    return Err(MeshGenerationError::invalid_option(name, "must be non-negative"));
                }
                self.mesh_size_min = value;
            }
            MESH_SIZE_MAX => {
                if value <= 0.0 {
                    return Err(MeshGenerationError::invalid_option(name, "must be positive"));
                }
                self.mesh_size_max = value;
            }
            MESH_SIZE_FACTOR => {
                if value <= 0.0 {
                    return Err(MeshGenerationError::invalid_option(name, "must be positive"));
                }
                self.mesh_size_factor = value;
            }
            MESH_SIZE_EXTEND_FROM_BOUNDARY => {
                if ![0.0, 1.0, 2.0].contains(&value) {
                    return Err(MeshGenerationError::invalid_option(name, "must be 0, 1 or 2"));
                }
                self.extend_from_boundary = value;
            }
            OPTIMIZE => {
                if ![0.0, 1.0].contains(&value) {
                    return Err(MeshGenerationError::invalid_option(name, "must be 0 or 1"));
                }
                self.optimize = value;
            }
            _ => return Err(MeshGenerationError::UnknownOption(name.to_string())),
        }
        tracing::debug!(option = name, value, "set option");
        Ok(())
    }

    /// Reads a named option.
    pub fn number(&self, name: &str) -> MeshResult<f64> {
        Ok(match name {
            MESH_SIZE_MIN => self.mesh_size_min,
            MESH_SIZE_MAX => self.mesh_size_max,
            MESH_SIZE_FACTOR => self.mesh_size_factor,
            MESH_SIZE_EXTEND_FROM_BOUNDARY => self.extend_from_boundary,
            OPTIMIZE => self.optimize,
            _ => return Err(MeshGenerationError::UnknownOption(name.to_string())),
        })
    }

    #[inline]
    pub fn mesh_size_min(&self) -> f64 {
        self.mesh_size_min
    }

    #[inline]
    pub fn mesh_size_max(&self) -> f64 {
        self.mesh_size_max
    }

    #[inline]
    pub fn mesh_size_factor(&self) -> f64 {
        self.mesh_size_factor
    }

    /// Whether the size is derived from geometric features.
    #[inline]
    pub fn extend_from_boundary(&self) -> bool {
        self.extend_from_boundary != 0.0
    }

    /// Whether the optimization pass runs after generation.
    #[inline]
    pub fn optimize(&self) -> bool {
        self.optimize != 0.0
    }
}
