//! Primitive assembly modes.

/// Primitive family stored in a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveType {
    /// Every three indices form a triangle.
    #[default]
    Triangles,
    /// Every two indices form a line segment.
    Lines,
    /// Every index is a point.
    Points,
}

impl PrimitiveType {
    /// Number of indices per primitive.
    pub fn indices_per_primitive(&self) -> usize {
        match self {
            Self::Triangles => 3,
            Self::Lines => 2,
            Self::Points => 1,
        }
    }
}

/// How a stream of vertices is assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveMode {
    /// Every third vertex closes a triangle.
    Triangles,
    /// Each vertex after the second closes a triangle with alternating winding.
    TriangleStrip,
    /// Each vertex after the second closes a triangle with the run's first vertex.
    TriangleFan,
    /// Every fourth vertex closes a quad.
    Quads,
    /// Every second vertex after the first four closes a quad.
    QuadStrip,
    /// Every second vertex closes a line.
    Lines,
    /// Each vertex after the first closes a line with the previous vertex.
    LineStrip,
    /// Every vertex is a point.
    Points,
}

impl PrimitiveMode {
    /// Primitive family this mode produces.
    pub fn primitive_type(&self) -> PrimitiveType {
        match self {
            Self::Triangles
            | Self::TriangleStrip
            | Self::TriangleFan
            | Self::Quads
            | Self::QuadStrip => PrimitiveType::Triangles,
            Self::Lines | Self::LineStrip => PrimitiveType::Lines,
            Self::Points => PrimitiveType::Points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_families() {
        assert_eq!(
            PrimitiveMode::QuadStrip.primitive_type(),
            PrimitiveType::Triangles
        );
        assert_eq!(
            PrimitiveMode::LineStrip.primitive_type(),
            PrimitiveType::Lines
        );
        assert_eq!(PrimitiveType::Lines.indices_per_primitive(), 2);
    }
}
