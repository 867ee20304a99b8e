//! # Gmsh MSH
//!
//! ASCII MSH files as written by Gmsh.
//!
//! ## Layout (4.1)
//!
//! ```text
//! $MeshFormat   version file-type data-size
//! $Entities     points / curves / surfaces / volumes with bounding boxes
//! $Nodes        entity blocks: tags, then coordinates
//! $Elements     entity blocks: tag followed by node tags per element
//! ```
//!
//! Version 2.x files list nodes and elements flat, each element carrying
//! its physical and geometrical tag. Both versions are read; 4.1 is
//! written.

mod reader;
mod writer;

pub use reader::{parse_msh, read_msh};
pub use writer::{to_msh_string, write_msh, write_msh_to};
