//! Error types for mesh building.

use std::fmt;

use super::mode::PrimitiveType;

/// Errors that can occur while building or converting meshes.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A `mode` call requested a primitive family different from the mesh's.
    IncompatibleMode {
        current: PrimitiveType,
        requested: PrimitiveType,
    },
    /// Two meshes of different primitive families cannot be merged.
    IncompatibleMerge {
        target: PrimitiveType,
        source: PrimitiveType,
    },
    /// A subdivision count is below the minimum a shape needs.
    TooFewSubdivisions {
        parameter: &'static str,
        value: u32,
        minimum: u32,
    },
    /// A size or radius is negative.
    NegativeDimension { parameter: &'static str, value: f32 },
    /// An index refers past the end of the vertex data.
    InvalidIndex { index: u32, vertex_count: usize },
    /// An operation needs attributes the mesh does not carry.
    MissingAttributes(&'static str),
    /// Replacement attribute data does not cover every vertex.
    AttributeLength { expected: usize, actual: usize },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleMode { current, requested } => write!(
                f,
                "Cannot switch a {:?} mesh to a {:?} primitive mode",
                current, requested
            ),
            Self::IncompatibleMerge { target, source } => {
                write!(f, "Cannot merge a {:?} mesh into a {:?} mesh", source, target)
            }
            Self::TooFewSubdivisions {
                parameter,
                value,
                minimum,
            } => write!(
                f,
                "Too few subdivisions for {}: {} (minimum {})",
                parameter, value, minimum
            ),
            Self::NegativeDimension { parameter, value } => {
                write!(f, "Negative dimension for {}: {}", parameter, value)
            }
            Self::InvalidIndex {
                index,
                vertex_count,
            } => write!(
                f,
                "Index {} out of range for {} vertices",
                index, vertex_count
            ),
            Self::MissingAttributes(what) => write!(f, "Missing vertex attributes: {}", what),
            Self::AttributeLength { expected, actual } => write!(
                f,
                "Attribute data has {} floats, expected {}",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for MeshError {}

/// Fail when `value` is below `minimum`.
pub(crate) fn check_subdivisions(
    parameter: &'static str,
    value: u32,
    minimum: u32,
) -> Result<(), MeshError> {
    if value < minimum {
        return Err(MeshError::TooFewSubdivisions {
            parameter,
            value,
            minimum,
        });
    }
    Ok(())
}

/// Fail when `value` is negative.
pub(crate) fn check_dimension(parameter: &'static str, value: f32) -> Result<(), MeshError> {
    if value < 0.0 {
        return Err(MeshError::NegativeDimension { parameter, value });
    }
    Ok(())
}
