//! # Format Detection

use std::path::Path;

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Gmsh MSH (`.msh`).
    Gmsh,
    /// DOLFIN XML (`.xml`).
    Dolfin,
}

impl MeshFormat {
    /// Detects the format from the file extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "msh" => Some(Self::Gmsh),
            "xml" => Some(Self::Dolfin),
            _ => None,
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gmsh => "Gmsh MSH",
            Self::Dolfin => "DOLFIN XML",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(MeshFormat::from_path("bifurcation.msh"), Some(MeshFormat::Gmsh));
        assert_eq!(MeshFormat::from_path("out/MESH.XML"), Some(MeshFormat::Dolfin));
        assert_eq!(MeshFormat::from_path("mesh.vtu"), None);
        assert_eq!(MeshFormat::from_path("mesh"), None);
    }
}
