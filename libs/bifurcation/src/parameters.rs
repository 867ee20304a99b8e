//! # Pipe Parameters

use config::constants::{
    DEFAULT_CONELEN, DEFAULT_EDGE_LENGTH, DEFAULT_LEN1, DEFAULT_LEN2, DEFAULT_RADIUS1,
    DEFAULT_RADIUS2,
};

/// The six scalars defining the bifurcated pipe and its mesh.
///
/// Both branches share `radius2`, `len2` and `conelen`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeParameters {
    /// Radius of the main pipe
    pub radius1: f64,
    /// Radius of both branch pipes
    pub radius2: f64,
    /// Length of the main pipe, which ends at the origin
    pub len1: f64,
    /// Axial offset of each branch pipe along x and z
    pub len2: f64,
    /// Axial offset of each cone along x and z
    pub conelen: f64,
    /// Target tetrahedron edge length
    pub edgelen: f64,
}

impl Default for PipeParameters {
    fn default() -> Self {
        Self {
            radius1: DEFAULT_RADIUS1,
            radius2: DEFAULT_RADIUS2,
            len1: DEFAULT_LEN1,
            len2: DEFAULT_LEN2,
            conelen: DEFAULT_CONELEN,
            edgelen: DEFAULT_EDGE_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = PipeParameters::default();
        assert_eq!(
            (params.radius1, params.radius2, params.len1, params.len2, params.conelen, params.edgelen),
            (0.15, 0.119, 0.9, 0.4, 0.2, 0.02)
        );
    }
}
