//! # Config Crate
//!
//! Centralized configuration constants for the bifurcation meshing pipeline.
//! Pipe dimensions, output names, numeric tolerances and mesher tunables are
//! defined here so that the geometry kernel, the mesher, the converter and the
//! binary agree on the same values.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{DEFAULT_EDGE_LENGTH, DEFAULT_RADIUS2, EPSILON};
//!
//! // The default mesh is fine enough to resolve the branch radius
//! assert!(DEFAULT_EDGE_LENGTH < DEFAULT_RADIUS2);
//!
//! // Use EPSILON for floating-point comparisons
//! let value: f64 = 1e-11;
//! assert!(value.abs() < EPSILON);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Deterministic**: No environment-dependent values
//! - **Well-Documented**: Every constant has clear documentation

pub mod constants;

#[cfg(test)]
mod tests;
