//! # Entity Handles
//!
//! Opaque `(dimension, tag)` pairs naming entities of the modeling kernel.

use std::fmt;

/// Handle of a kernel entity.
///
/// Handles stay valid until the entity is removed, either explicitly or by a
/// boolean operation that consumes its inputs.
///
/// # Example
///
/// ```rust
/// use pipemesh_geometry::DimTag;
///
/// let handle = DimTag::volume(3);
/// assert_eq!(handle.dim, 3);
/// assert_eq!(handle.to_string(), "(3, 3)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimTag {
    /// Topological dimension (3 for volumes)
    pub dim: i32,
    /// Tag, unique within its dimension
    pub tag: i32,
}

impl DimTag {
    /// Creates a handle from its parts.
    pub const fn new(dim: i32, tag: i32) -> Self {
        Self { dim, tag }
    }

    /// Creates a volume handle.
    pub const fn volume(tag: i32) -> Self {
        Self { dim: 3, tag }
    }
}

impl fmt::Display for DimTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.dim, self.tag)
    }
}

impl From<(i32, i32)> for DimTag {
    fn from((dim, tag): (i32, i32)) -> Self {
        Self { dim, tag }
    }
}
