//! Interleaved vertex layout descriptors.
//!
//! A [`VertexLayout`] lists the attributes of one interleaved `f32` vertex
//! buffer. Offsets and strides are counted in floats, not bytes; multiply by
//! four for the byte values a graphics API expects.
//!
//! # Example
//!
//! ```
//! use prism_core::mesh::{VertexAttribute, VertexLayout, VertexAttributeSemantic};
//!
//! let layout = VertexLayout::new()
//!     .with_attribute(VertexAttribute::position(0))
//!     .with_attribute(VertexAttribute::normal(3))
//!     .with_attribute(VertexAttribute::tex_coord(6));
//! assert_eq!(layout.stride(), 8);
//! assert!(layout.has_semantic(VertexAttributeSemantic::Normal));
//! ```

use std::sync::Arc;

use super::format::{AttributeBits, VertexFormat};

/// Semantic meaning of a vertex attribute.
///
/// Semantics are used to match mesh attributes with shader inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeSemantic {
    /// Vertex position (float3).
    Position,
    /// Vertex normal (float3).
    Normal,
    /// Vertex color (float3).
    Color,
    /// Texture coordinates (float2).
    TexCoord,
    /// Tangent (float3).
    Tangent,
    /// Bitangent (float3).
    Bitangent,
}

impl VertexAttributeSemantic {
    /// Get a unique index for this semantic (used for matching).
    pub fn index(&self) -> u32 {
        match self {
            Self::Position => 0,
            Self::Normal => 1,
            Self::Color => 2,
            Self::TexCoord => 3,
            Self::Tangent => 4,
            Self::Bitangent => 5,
        }
    }

    /// The optional attribute flag for this semantic. `None` for positions.
    pub fn attribute_bit(&self) -> Option<AttributeBits> {
        match self {
            Self::Position => None,
            Self::Normal => Some(AttributeBits::NORMAL),
            Self::Color => Some(AttributeBits::COLOR),
            Self::TexCoord => Some(AttributeBits::TEXCOORD),
            Self::Tangent => Some(AttributeBits::TANGENT),
            Self::Bitangent => Some(AttributeBits::BITANGENT),
        }
    }
}

/// Format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// Single 32-bit float.
    Float,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
}

impl VertexAttributeFormat {
    /// Format holding `components` floats, if one exists.
    pub fn from_components(components: usize) -> Option<Self> {
        match components {
            1 => Some(Self::Float),
            2 => Some(Self::Float2),
            3 => Some(Self::Float3),
            4 => Some(Self::Float4),
            _ => None,
        }
    }

    /// Number of floats.
    pub fn components(&self) -> usize {
        match self {
            Self::Float => 1,
            Self::Float2 => 2,
            Self::Float3 => 3,
            Self::Float4 => 4,
        }
    }

    /// Get the size in bytes of this format.
    pub fn size(&self) -> usize {
        self.components() * std::mem::size_of::<f32>()
    }
}

/// A single vertex attribute description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Semantic meaning of this attribute.
    pub semantic: VertexAttributeSemantic,
    /// Data format of this attribute.
    pub format: VertexAttributeFormat,
    /// Float offset within a vertex.
    pub offset: usize,
}

impl VertexAttribute {
    /// Create a new vertex attribute.
    pub fn new(
        semantic: VertexAttributeSemantic,
        format: VertexAttributeFormat,
        offset: usize,
    ) -> Self {
        Self {
            semantic,
            format,
            offset,
        }
    }

    /// Create a position attribute (float3).
    pub fn position(offset: usize) -> Self {
        Self::new(
            VertexAttributeSemantic::Position,
            VertexAttributeFormat::Float3,
            offset,
        )
    }

    /// Create a normal attribute (float3).
    pub fn normal(offset: usize) -> Self {
        Self::new(
            VertexAttributeSemantic::Normal,
            VertexAttributeFormat::Float3,
            offset,
        )
    }

    /// Create a color attribute (float3).
    pub fn color(offset: usize) -> Self {
        Self::new(
            VertexAttributeSemantic::Color,
            VertexAttributeFormat::Float3,
            offset,
        )
    }

    /// Create a texture coordinate attribute (float2).
    pub fn tex_coord(offset: usize) -> Self {
        Self::new(
            VertexAttributeSemantic::TexCoord,
            VertexAttributeFormat::Float2,
            offset,
        )
    }

    /// Create a tangent attribute (float3).
    pub fn tangent(offset: usize) -> Self {
        Self::new(
            VertexAttributeSemantic::Tangent,
            VertexAttributeFormat::Float3,
            offset,
        )
    }

    /// Create a bitangent attribute (float3).
    pub fn bitangent(offset: usize) -> Self {
        Self::new(
            VertexAttributeSemantic::Bitangent,
            VertexAttributeFormat::Float3,
            offset,
        )
    }

    /// One past the last float of this attribute.
    pub fn end(&self) -> usize {
        self.offset + self.format.components()
    }
}

/// Describes the attributes of one interleaved vertex buffer.
///
/// Layouts are typically wrapped in `Arc` and shared between mesh buffers
/// built from meshes with the same attribute set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexLayout {
    /// The vertex attributes.
    pub attributes: Vec<VertexAttribute>,
    stride: usize,
    /// Optional label for debugging.
    pub label: Option<String>,
}

impl VertexLayout {
    /// Create a new empty vertex layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex attribute, growing the stride to cover it.
    pub fn with_attribute(mut self, attribute: VertexAttribute) -> Self {
        self.stride = self.stride.max(attribute.end());
        self.attributes.push(attribute);
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Layout matching a builder vertex format.
    pub fn from_format(format: &VertexFormat) -> Arc<Self> {
        let mut layout = Self::new().with_attribute(VertexAttribute::position(0));
        for semantic in [
            VertexAttributeSemantic::Normal,
            VertexAttributeSemantic::Color,
            VertexAttributeSemantic::TexCoord,
            VertexAttributeSemantic::Tangent,
            VertexAttributeSemantic::Bitangent,
        ] {
            let Some(bit) = semantic.attribute_bit() else {
                continue;
            };
            let (Some(offset), Some(attr_format)) = (
                format.offset(bit),
                VertexAttributeFormat::from_components(bit.components()),
            ) else {
                continue;
            };
            layout = layout.with_attribute(VertexAttribute::new(semantic, attr_format, offset));
        }
        Arc::new(layout)
    }

    /// Floats per vertex.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Optional attributes present, as builder flags.
    pub fn attribute_bits(&self) -> AttributeBits {
        self.attributes
            .iter()
            .filter_map(|attr| attr.semantic.attribute_bit())
            .collect()
    }

    /// Check if this layout has a specific semantic.
    pub fn has_semantic(&self, semantic: VertexAttributeSemantic) -> bool {
        self.attributes.iter().any(|attr| attr.semantic == semantic)
    }

    /// Get an attribute by semantic.
    pub fn get_attribute(&self, semantic: VertexAttributeSemantic) -> Option<&VertexAttribute> {
        self.attributes
            .iter()
            .find(|attr| attr.semantic == semantic)
    }

    /// Check if this layout is compatible with another layout.
    ///
    /// A layout is compatible if the other layout has all the semantics this
    /// one has, with matching formats. Offsets don't need to match.
    pub fn is_compatible_with(&self, other: &VertexLayout) -> bool {
        self.attributes.iter().all(|attr| {
            other.attributes.iter().any(|other_attr| {
                other_attr.semantic == attr.semantic && other_attr.format == attr.format
            })
        })
    }

    /// Validate the layout: one attribute per semantic, none past the stride.
    pub fn validate(&self) -> Result<(), String> {
        for (i, attr) in self.attributes.iter().enumerate() {
            if attr.end() > self.stride {
                return Err(format!(
                    "Attribute {:?} ends at {} past stride {}",
                    attr.semantic,
                    attr.end(),
                    self.stride
                ));
            }
            if self.attributes[..i]
                .iter()
                .any(|other| other.semantic == attr.semantic)
            {
                return Err(format!("Attribute {:?} defined twice", attr.semantic));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_attribute_format_size() {
        assert_eq!(VertexAttributeFormat::Float.size(), 4);
        assert_eq!(VertexAttributeFormat::Float3.size(), 12);
        assert_eq!(VertexAttributeFormat::Float4.size(), 16);
        assert_eq!(
            VertexAttributeFormat::from_components(2),
            Some(VertexAttributeFormat::Float2)
        );
    }

    #[test]
    fn test_layout_from_format() {
        let format = VertexFormat::new(AttributeBits::NORMAL | AttributeBits::TEXCOORD);
        let layout = VertexLayout::from_format(&format);
        assert_eq!(layout.stride(), 8);
        assert_eq!(
            layout
                .get_attribute(VertexAttributeSemantic::TexCoord)
                .map(|a| a.offset),
            Some(6)
        );
        assert!(!layout.has_semantic(VertexAttributeSemantic::Color));
        assert_eq!(layout.attribute_bits(), format.bits());
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_vertex_layout_validation() {
        let invalid = VertexLayout::new()
            .with_attribute(VertexAttribute::position(0))
            .with_attribute(VertexAttribute::position(3));
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_vertex_layout_compatibility() {
        let required = VertexLayout::new()
            .with_attribute(VertexAttribute::position(0))
            .with_attribute(VertexAttribute::normal(3));
        let provided = VertexLayout::new()
            .with_attribute(VertexAttribute::position(0))
            .with_attribute(VertexAttribute::tex_coord(3))
            .with_attribute(VertexAttribute::normal(5));

        assert!(required.is_compatible_with(&provided));
        assert!(!provided.is_compatible_with(&required));
    }
}
