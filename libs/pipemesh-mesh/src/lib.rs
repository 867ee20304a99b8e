//! # Pipemesh Mesh
//!
//! Tetrahedral meshing engine for implicit pipe solids.
//!
//! ## Architecture
//!
//! ```text
//! Session ─► generate ─► sizing ─► Lattice ─► stuffing ─► topology ─► optimize ─► TetMesh
//!    │                                                                              │
//!    └──────────────────────────── write (.msh) ◄─────────────── to_mesh ◄──────────┘
//! ```
//!
//! The solid is never triangulated up front. A body-centred cubic lattice
//! is conformed to the zero level set of the solid's signed distance, which
//! yields tetrahedra whose boundary faces follow the surface.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pipemesh_mesh::{options, Session};
//!
//! let mut session = Session::initialize();
//! session.occ().add_cylinder(0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.2).unwrap();
//! session.occ().synchronize();
//! session.options_mut().set_number(options::MESH_SIZE_MAX, 0.05).unwrap();
//! let stats = session.generate(3).unwrap().statistics();
//! println!("{} tetrahedra", stats.tetrahedra);
//! session.write("pipe.msh").unwrap();
//! ```

pub mod error;
pub mod generate;
pub mod lattice;
pub mod optimize;
pub mod options;
pub mod quality;
pub mod session;
pub mod sizing;
pub mod stuffing;
pub mod tet_mesh;
pub mod topology;

pub use error::{EngineError, EngineResult, MeshGenerationError, MeshResult};
pub use generate::tetrahedralize;
pub use options::Options;
pub use session::Session;
pub use tet_mesh::{MeshStatistics, SurfaceEntity, TetMesh};
