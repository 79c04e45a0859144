//! Vertex attribute presence and interleaved layout.
//!
//! Every vertex of a [`MeshBuilder`](super::MeshBuilder) carries a position
//! followed by the optional attributes in [`AttributeBits`] order: normal,
//! color, texture coordinate, tangent, bitangent. Widening a format adds
//! attributes; [`VertexFormat::relayout`] converts existing vertex data to
//! the wider format, zero-filling the new fields.

use bitflags::bitflags;

bitflags! {
    /// Optional per-vertex attributes present in a mesh.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttributeBits: u32 {
        const NORMAL = 1 << 0;
        const COLOR = 1 << 1;
        const TEXCOORD = 1 << 2;
        const TANGENT = 1 << 3;
        const BITANGENT = 1 << 4;
    }
}

/// Number of floats in a position.
pub const POSITION_COMPONENTS: usize = 3;

impl AttributeBits {
    /// Optional attributes in layout order.
    pub const ORDER: [AttributeBits; 5] = [
        AttributeBits::NORMAL,
        AttributeBits::COLOR,
        AttributeBits::TEXCOORD,
        AttributeBits::TANGENT,
        AttributeBits::BITANGENT,
    ];

    /// Float count of a single attribute flag. Zero for composite or empty values.
    pub fn components(self) -> usize {
        if self == Self::TEXCOORD {
            2
        } else if self == Self::NORMAL
            || self == Self::COLOR
            || self == Self::TANGENT
            || self == Self::BITANGENT
        {
            3
        } else {
            0
        }
    }
}

/// Interleaved layout of a mesh's vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexFormat {
    bits: AttributeBits,
}

impl VertexFormat {
    /// Format with the given optional attributes.
    pub fn new(bits: AttributeBits) -> Self {
        Self { bits }
    }

    /// Position-only format.
    pub fn position_only() -> Self {
        Self::default()
    }

    /// Optional attributes present.
    pub fn bits(&self) -> AttributeBits {
        self.bits
    }

    /// Whether `attribute` is present.
    pub fn has(&self, attribute: AttributeBits) -> bool {
        self.bits.contains(attribute)
    }

    /// Floats per vertex.
    pub fn stride(&self) -> usize {
        POSITION_COMPONENTS
            + AttributeBits::ORDER
                .iter()
                .filter(|a| self.bits.contains(**a))
                .map(|a| a.components())
                .sum::<usize>()
    }

    /// Float offset of `attribute` within a vertex, or `None` if absent.
    pub fn offset(&self, attribute: AttributeBits) -> Option<usize> {
        if !self.bits.contains(attribute) || attribute.components() == 0 {
            return None;
        }
        let mut offset = POSITION_COMPONENTS;
        for a in AttributeBits::ORDER {
            if a == attribute {
                return Some(offset);
            }
            if self.bits.contains(a) {
                offset += a.components();
            }
        }
        None
    }

    /// The union of this format and `bits`.
    pub fn widen(&self, bits: AttributeBits) -> Self {
        Self::new(self.bits | bits)
    }

    /// Copy `vertices` laid out in this format into the layout of `target`.
    ///
    /// Attributes absent from `self` are zero-filled; attributes absent from
    /// `target` are dropped.
    pub fn relayout(&self, vertices: &[f32], target: &VertexFormat) -> Vec<f32> {
        let src_stride = self.stride();
        let dst_stride = target.stride();
        let count = vertices.len() / src_stride;
        let mut out = vec![0.0; count * dst_stride];
        for (src, dst) in vertices
            .chunks_exact(src_stride)
            .zip(out.chunks_exact_mut(dst_stride))
        {
            dst[..POSITION_COMPONENTS].copy_from_slice(&src[..POSITION_COMPONENTS]);
            for a in AttributeBits::ORDER {
                if let (Some(from), Some(to)) = (self.offset(a), target.offset(a)) {
                    let n = a.components();
                    dst[to..to + n].copy_from_slice(&src[from..from + n]);
                }
            }
        }
        out
    }
}
