//! # Pipemesh Geometry
//!
//! Solid modeling kernel for parametric pipe networks.
//!
//! ## Architecture
//!
//! ```text
//! Kernel (tags) → Solid (union of parts) → Frustum (convex part)
//! ```
//!
//! Solids are kept as exact implicit shapes: every part is a capped cone
//! frustum with a closed-form signed distance, and a fused solid is the
//! union of its parts. The mesher samples that distance directly, so no
//! boundary representation is ever built.
//!
//! ## Usage
//!
//! ```rust
//! use pipemesh_geometry::{DimTag, Kernel};
//!
//! let mut kernel = Kernel::new();
//! let pipe = kernel.add_cylinder(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.1).unwrap();
//! let cone = kernel.add_cone(1.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.1, 0.05).unwrap();
//! let (fused, _) = kernel
//!     .fuse(&[DimTag::volume(pipe)], &[DimTag::volume(cone)], true, true)
//!     .unwrap();
//! assert_eq!(fused.len(), 1);
//! ```

pub mod error;
pub mod gjk;
pub mod handle;
pub mod kernel;
pub mod primitives;
pub mod solid;

pub use error::{ConstructionError, ConstructionResult};
pub use gjk::{intersects, SupportMap};
pub use handle::DimTag;
pub use kernel::{FuseOutput, Kernel, SynchronizedModel};
pub use primitives::{Frustum, Patch};
pub use solid::{Opening, Solid};
