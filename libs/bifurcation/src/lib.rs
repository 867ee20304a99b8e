//! # Bifurcation
//!
//! Parametric bifurcated pipe, meshed into tetrahedra and converted to an
//! interchange format.
//!
//! ## Pipeline
//!
//! ```text
//! PipeParameters
//!      │
//!      ▼
//! build_bifurcation ──► generate_mesh ──► bifurcation.msh ──► convert_mesh ──► bifurcation.xml
//!   (3 cylinders +        (uniform edge
//!    2 cones, fused)       length, optimized)
//! ```
//!
//! All three stages run inside one engine [`Session`](pipemesh_mesh::Session),
//! which is released on every exit path.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bifurcation::{run, PipeParameters};
//!
//! let report = run(&PipeParameters::default(), ".").unwrap();
//! println!("{} tetrahedra", report.mesh.tetrahedra);
//! ```

pub mod builder;
pub mod error;
pub mod parameters;
pub mod pipeline;

pub use builder::build_bifurcation;
pub use error::{PipelineError, PipelineResult};
pub use parameters::PipeParameters;
pub use pipeline::{convert_mesh, generate_mesh, run, PipelineReport};
