//! # I/O Errors
//!
//! Error types for reading, writing and converting mesh files.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a mesh file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// Input file does not exist.
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Content does not follow the format.
    #[error("Malformed input at line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// Format or format variant this crate does not read.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Known format with a version this crate does not read.
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(String),

    /// XML syntax error.
    #[error("XML error: {0}")]
    Xml(String),
}

impl ReadError {
    /// Creates a malformed input error.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }

    /// Maps an I/O error on `path`, turning a missing file into
    /// [`ReadError::NotFound`].
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path: path.into() }
        } else {
            Self::Io(err)
        }
    }
}

/// Errors that can occur while writing a mesh file.
#[derive(Debug, Error)]
pub enum WriteError {
    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output extension does not name a known format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Mesh has no cells to write.
    #[error("Mesh has no cells")]
    NoCells,

    /// Cell kind cannot be expressed in the target format.
    #[error("Cell kind '{kind}' is not supported by {format}")]
    UnsupportedCellKind {
        kind: &'static str,
        format: &'static str,
    },

    /// Mesh violates its own invariants (bad indices, misaligned tags).
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// XML serialization error.
    #[error("XML error: {0}")]
    Xml(String),
}

/// Errors of a file conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Result type alias for read operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// Result type alias for write operations.
pub type WriteResult<T> = Result<T, WriteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ReadError::from_io("mesh.msh", err);
        assert!(matches!(err, ReadError::NotFound { .. }));
        assert!(err.to_string().contains("mesh.msh"));

        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no");
        assert!(matches!(ReadError::from_io("mesh.msh", err), ReadError::Io(_)));
    }

    #[test]
    fn test_error_display() {
        let err = ReadError::malformed(12, "expected node count");
        assert_eq!(
            err.to_string(),
            "Malformed input at line 12: expected node count"
        );

        let err = WriteError::UnsupportedCellKind {
            kind: "pyramid",
            format: "DOLFIN XML",
        };
        assert!(err.to_string().contains("pyramid"));
    }

    #[test]
    fn test_convert_error_is_transparent() {
        let err: ConvertError = WriteError::NoCells.into();
        assert_eq!(err.to_string(), "Mesh has no cells");
    }
}
