//! # Primitives
//!
//! Convex solid primitives. Cylinders and cones are both represented as
//! capped cone frusta.

pub mod frustum;

pub use frustum::{Frustum, Patch};
