//! # Construction Errors
//!
//! Error types for primitive construction and boolean operations.

use crate::handle::DimTag;
use thiserror::Error;

/// Errors that can occur while building solids.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstructionError {
    /// A primitive has a non-positive radius or length.
    #[error("Degenerate {primitive}: {message}")]
    DegeneratePrimitive {
        /// Kind of primitive being built ("cylinder", "cone")
        primitive: &'static str,
        message: String,
    },

    /// A handle does not name a live entity.
    #[error("Unknown entity {0}")]
    UnknownEntity(DimTag),

    /// Only volumes can take part in boolean operations.
    #[error("Unsupported entity dimension {dim} (expected 3)")]
    UnsupportedDimension { dim: i32 },

    /// A boolean operation was given no objects or no tools.
    #[error("Boolean fuse needs at least one object and one tool")]
    EmptyFuse,

    /// The fused parts do not form a single connected solid.
    #[error("Fuse produced {components} disjoint solids (expected 1)")]
    DisjointFuse { components: usize },
}

impl ConstructionError {
    /// Creates a degenerate primitive error.
    pub fn degenerate(primitive: &'static str, message: impl Into<String>) -> Self {
        Self::DegeneratePrimitive {
            primitive,
            message: message.into(),
        }
    }
}

/// Result type alias for construction operations.
pub type ConstructionResult<T> = Result<T, ConstructionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConstructionError::degenerate("cylinder", "length must be positive: 0");
        assert!(err.to_string().contains("cylinder"));
        assert!(err.to_string().contains("length"));

        let err = ConstructionError::DisjointFuse { components: 2 };
        assert!(err.to_string().contains("2 disjoint"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ConstructionError>();
    }
}
