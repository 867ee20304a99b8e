//! # Configuration Constants
//!
//! Centralized constants for the bifurcation pipeline. Geometry defaults,
//! output names, tolerances and the tunables of the tetrahedral mesher are
//! defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Pipe Geometry**: Default dimensions of the bifurcated pipe
//! - **Output**: File names and format versions
//! - **Mesher**: Lattice, snapping and optimization tunables
//! - **Limits**: Maximum values for safety bounds

use std::fmt;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Epsilon for floating-point comparisons.
///
/// Used for determining if two floating-point values are "equal" within
/// numerical tolerance.
///
/// # Example
///
/// ```rust
/// use config::constants::EPSILON;
///
/// fn approximately_equal(a: f64, b: f64) -> bool {
///     (a - b).abs() < EPSILON
/// }
///
/// assert!(approximately_equal(1.0, 1.0 + 1e-11));
/// ```
pub const EPSILON: f64 = 1e-10;

/// Relative distance below which two convex parts count as touching.
///
/// Scaled by the bounding-box diagonal of the parts being fused. Parts whose
/// faces coincide exactly (a cone end disc against a cylinder base) are
/// connected through this tolerance.
pub const CONTACT_TOLERANCE: f64 = 1e-6;

/// Relative signed-distance magnitude treated as "on the surface".
///
/// Scaled by the lattice spacing. Node values below it are set to exactly
/// zero before snapping.
pub const SURFACE_TOLERANCE: f64 = 1e-9;

/// Iteration cap for the GJK overlap test.
pub const GJK_MAX_ITERATIONS: usize = 64;

// =============================================================================
// PIPE GEOMETRY DEFAULTS
// =============================================================================

/// Radius of the main pipe.
pub const DEFAULT_RADIUS1: f64 = 0.15;

/// Radius of the two branch pipes.
pub const DEFAULT_RADIUS2: f64 = 0.119;

/// Length of the main pipe, which ends at the origin.
pub const DEFAULT_LEN1: f64 = 0.9;

/// Axial offset of each branch pipe along both the x and z directions.
pub const DEFAULT_LEN2: f64 = 0.4;

/// Axial offset of each conical transition along both the x and z directions.
pub const DEFAULT_CONELEN: f64 = 0.2;

/// Target tetrahedron edge length.
///
/// # Example
///
/// ```rust
/// use config::constants::{DEFAULT_EDGE_LENGTH, DEFAULT_RADIUS2};
///
/// // Several elements across the narrowest feature
/// assert!(DEFAULT_RADIUS2 / DEFAULT_EDGE_LENGTH > 4.0);
/// ```
pub const DEFAULT_EDGE_LENGTH: f64 = 0.02;

// =============================================================================
// OUTPUT CONSTANTS
// =============================================================================

/// Native mesh file written by the mesh generator.
pub const NATIVE_MESH_FILE: &str = "bifurcation.msh";

/// Interchange mesh file written by the converter.
pub const INTERCHANGE_MESH_FILE: &str = "bifurcation.xml";

/// Version written in the `$MeshFormat` section of native files.
pub const MSH_FORMAT_VERSION: &str = "4.1";

/// Namespace attribute of DOLFIN XML files.
pub const DOLFIN_NAMESPACE: &str = "https://fenicsproject.org/";

// =============================================================================
// MESHER CONSTANTS
// =============================================================================

/// Number of lattice cells added around the solid's bounding box.
pub const LATTICE_MARGIN_CELLS: usize = 2;

/// Fraction of a lattice edge within which a node snaps onto the surface.
///
/// Must stay below one half so that at most one endpoint of an edge can
/// claim a given surface crossing.
///
/// # Example
///
/// ```rust
/// use config::constants::SNAP_FRACTION;
/// assert!(SNAP_FRACTION > 0.0 && SNAP_FRACTION < 0.5);
/// ```
pub const SNAP_FRACTION: f64 = 0.2;

/// Bisection steps used to locate a surface crossing on a lattice edge.
pub const ROOT_REFINEMENT_STEPS: usize = 24;

/// Volume, relative to the cubed lattice spacing, below which a clipped
/// piece is discarded as degenerate.
pub const MIN_PIECE_VOLUME_RATIO: f64 = 1e-9;

/// Number of Gauss-Seidel smoothing sweeps when optimization is enabled.
pub const SMOOTHING_PASSES: usize = 3;

/// Finite-difference step, relative to the lattice spacing, used for
/// surface gradients.
pub const GRADIENT_STEP_RATIO: f64 = 1e-4;

/// Elements requested across the smallest feature when size extension from
/// the boundary is enabled.
pub const FEATURE_RESOLUTION: f64 = 4.0;

/// Divisions of the bounding-box diagonal used as the edge length when no
/// explicit size bound applies.
pub const DEFAULT_SIZE_DIVISIONS: f64 = 10.0;

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Maximum number of lattice nodes for a single generation.
///
/// Safety limit to prevent memory exhaustion from a tiny edge length.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_LATTICE_NODES;
///
/// let node_count = 250_000;
/// assert!(node_count < MAX_LATTICE_NODES);
/// ```
pub const MAX_LATTICE_NODES: usize = 40_000_000;

/// Maximum number of tetrahedra in a generated mesh.
pub const MAX_TETRAHEDRA: usize = 20_000_000;

// =============================================================================
// MESHER CONFIGURATION
// =============================================================================

/// Validated tunables of the lattice stuffing mesher.
///
/// # Examples
/// ```
/// use config::constants::StuffingConfig;
/// let config = StuffingConfig::default();
/// assert!(config.snap_fraction > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StuffingConfig {
    /// Fraction of an edge within which lattice nodes snap to the surface.
    pub snap_fraction: f64,
    /// Smoothing sweeps performed by the optimizer.
    pub smoothing_passes: usize,
}

impl StuffingConfig {
    /// Builds a configuration enforcing strict validation of the snap
    /// fraction.
    ///
    /// # Examples
    /// ```
    /// use config::constants::StuffingConfig;
    /// let cfg = StuffingConfig::new(0.25, 5).expect("valid config");
    /// assert_eq!(cfg.smoothing_passes, 5);
    /// assert!(StuffingConfig::new(0.5, 5).is_err());
    /// ```
    pub fn new(snap_fraction: f64, smoothing_passes: usize) -> Result<Self, ConfigError> {
        if !(snap_fraction > 0.0 && snap_fraction < 0.5) {
            return Err(ConfigError::InvalidSnapFraction(snap_fraction));
        }
        Ok(Self {
            snap_fraction,
            smoothing_passes,
        })
    }
}

impl Default for StuffingConfig {
    fn default() -> Self {
        Self {
            snap_fraction: SNAP_FRACTION,
            smoothing_passes: SMOOTHING_PASSES,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when the snap fraction is outside `(0, 0.5)`.
    InvalidSnapFraction(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSnapFraction(value) => {
                write!(f, "snap fraction must lie in (0, 0.5): {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Checks if a f64 value is approximately zero within EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_zero;
///
/// assert!(approx_zero(1e-11));
/// assert!(!approx_zero(0.1));
/// ```
#[inline]
pub fn approx_zero(value: f64) -> bool {
    value.abs() < EPSILON
}
