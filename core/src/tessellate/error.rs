//! Error types for tessellation.

use std::fmt;

use crate::mesh::{MeshError, PrimitiveType};

/// Errors that can occur while tessellating a curve or surface.
#[derive(Debug, Clone, PartialEq)]
pub enum TessellateError {
    /// A subdivision count was zero.
    ZeroSubdivisions(&'static str),
    /// The primitive type cannot represent the evaluated geometry.
    UnsupportedMode(PrimitiveType),
    /// The target mesh rejected the geometry.
    Mesh(MeshError),
}

impl fmt::Display for TessellateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSubdivisions(parameter) => {
                write!(f, "Subdivision count {} must be positive", parameter)
            }
            Self::UnsupportedMode(mode) => write!(f, "Cannot tessellate into {:?}", mode),
            Self::Mesh(e) => write!(f, "Mesh error: {}", e),
        }
    }
}

impl std::error::Error for TessellateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Mesh(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MeshError> for TessellateError {
    fn from(e: MeshError) -> Self {
        Self::Mesh(e)
    }
}
