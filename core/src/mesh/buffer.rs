//! GPU-ready mesh snapshots.
//!
//! A [`MeshBuffer`] holds an interleaved `f32` vertex array, a typed index
//! array and the [`VertexLayout`] describing it. Index width is picked from
//! the vertex count: `u8` up to 256 vertices, `u16` up to 65536, `u32`
//! beyond. Every index is below the vertex count; the setters that replace
//! indices or attributes re-check this.

use std::sync::Arc;

use crate::math::{Aabb, Vec3};

use super::builder::MeshBuilder;
use super::error::MeshError;
use super::layout::{
    VertexAttribute, VertexAttributeFormat, VertexAttributeSemantic, VertexLayout,
};
use super::mode::PrimitiveType;

/// Index format for indexed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 8-bit unsigned integers (max 256 vertices).
    Uint8,
    /// 16-bit unsigned integers (max 65536 vertices).
    #[default]
    Uint16,
    /// 32-bit unsigned integers.
    Uint32,
}

impl IndexFormat {
    /// Get the size in bytes of each index.
    pub fn size(&self) -> usize {
        match self {
            Self::Uint8 => 1,
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }

    /// Narrowest format able to address `vertex_count` vertices.
    pub fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count <= 1 << 8 {
            Self::Uint8
        } else if vertex_count <= 1 << 16 {
            Self::Uint16
        } else {
            Self::Uint32
        }
    }
}

/// Typed index storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexData {
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
}

impl IndexData {
    /// Store `indices` in the narrowest format for `vertex_count`.
    pub fn new(indices: &[u32], vertex_count: usize) -> Self {
        match IndexFormat::for_vertex_count(vertex_count) {
            IndexFormat::Uint8 => Self::Uint8(indices.iter().map(|&i| i as u8).collect()),
            IndexFormat::Uint16 => Self::Uint16(indices.iter().map(|&i| i as u16).collect()),
            IndexFormat::Uint32 => Self::Uint32(indices.to_vec()),
        }
    }

    /// Element format.
    pub fn format(&self) -> IndexFormat {
        match self {
            Self::Uint8(_) => IndexFormat::Uint8,
            Self::Uint16(_) => IndexFormat::Uint16,
            Self::Uint32(_) => IndexFormat::Uint32,
        }
    }

    /// Number of indices.
    pub fn len(&self) -> usize {
        match self {
            Self::Uint8(v) => v.len(),
            Self::Uint16(v) => v.len(),
            Self::Uint32(v) => v.len(),
        }
    }

    /// Whether there are no indices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index `i` widened to `u32`.
    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            Self::Uint8(v) => v.get(i).map(|&x| x as u32),
            Self::Uint16(v) => v.get(i).map(|&x| x as u32),
            Self::Uint32(v) => v.get(i).copied(),
        }
    }

    /// All indices widened to `u32`.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Uint8(v) => v.as_slice(),
            Self::Uint16(v) => bytemuck::cast_slice(v),
            Self::Uint32(v) => bytemuck::cast_slice(v),
        }
    }
}

/// Immutable interleaved mesh data ready for upload.
#[derive(Debug, Clone)]
pub struct MeshBuffer {
    vertices: Vec<f32>,
    indices: IndexData,
    layout: Arc<VertexLayout>,
    primitive_type: PrimitiveType,
    label: Option<String>,
}

impl MeshBuffer {
    /// Snapshot a builder mesh.
    pub fn from_builder(mesh: &MeshBuilder) -> Self {
        let layout = VertexLayout::from_format(&mesh.format());
        Self {
            vertices: mesh.vertices().to_vec(),
            indices: IndexData::new(mesh.indices(), mesh.vertex_count()),
            layout,
            primitive_type: mesh.primitive_type(),
            label: None,
        }
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Vertex layout.
    pub fn layout(&self) -> &Arc<VertexLayout> {
        &self.layout
    }

    /// Primitive family.
    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    /// Interleaved vertex data.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Interleaved vertex data as bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index data.
    pub fn indices(&self) -> &IndexData {
        &self.indices
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        match self.layout.stride() {
            0 => 0,
            stride => self.vertices.len() / stride,
        }
    }

    /// Number of indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Number of triangles, lines or points.
    pub fn primitive_count(&self) -> usize {
        self.indices.len() / self.primitive_type.indices_per_primitive()
    }

    /// Attribute descriptor for `semantic`.
    pub fn attribute(&self, semantic: VertexAttributeSemantic) -> Option<&VertexAttribute> {
        self.layout.get_attribute(semantic)
    }

    /// Position of vertex `i`.
    pub fn position(&self, i: usize) -> Option<Vec3> {
        let offset = self.attribute(VertexAttributeSemantic::Position)?.offset;
        let stride = self.layout.stride();
        let v = self.vertices.get(i * stride..(i + 1) * stride)?;
        Some(Vec3::new(v[offset], v[offset + 1], v[offset + 2]))
    }

    /// Bounds of every vertex referenced by an index.
    pub fn bounds(&self) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        for i in self.indices.iter() {
            let p = self.position(i as usize)?;
            match bounds.as_mut() {
                Some(b) => b.include(&p),
                None => bounds = Some(Aabb::new(p, p)),
            }
        }
        bounds
    }

    /// Replace the index array.
    ///
    /// Fails if an index is out of range or the count does not fit the
    /// primitive type; the buffer is unchanged on failure.
    pub fn set_indices(&mut self, indices: &[u32]) -> Result<(), MeshError> {
        let vertex_count = self.vertex_count();
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::InvalidIndex {
                index,
                vertex_count,
            });
        }
        let per_primitive = self.primitive_type.indices_per_primitive();
        if indices.len() % per_primitive != 0 {
            return Err(MeshError::AttributeLength {
                expected: indices.len() - indices.len() % per_primitive,
                actual: indices.len(),
            });
        }
        self.indices = IndexData::new(indices, vertex_count);
        Ok(())
    }

    /// Replace or add the values of one attribute.
    ///
    /// `data` holds `components` floats per vertex. An existing attribute
    /// with the same semantic and size is overwritten in place; otherwise the
    /// vertex data is re-laid out with the attribute appended.
    pub fn set_attribute(
        &mut self,
        semantic: VertexAttributeSemantic,
        components: usize,
        data: &[f32],
    ) -> Result<(), MeshError> {
        let vertex_count = self.vertex_count();
        let Some(format) = VertexAttributeFormat::from_components(components) else {
            return Err(MeshError::AttributeLength {
                expected: vertex_count * 4,
                actual: data.len(),
            });
        };
        if data.len() != vertex_count * components {
            return Err(MeshError::AttributeLength {
                expected: vertex_count * components,
                actual: data.len(),
            });
        }
        let stride = self.layout.stride();
        let existing = self
            .layout
            .get_attribute(semantic)
            .filter(|a| a.format == format)
            .map(|a| a.offset);
        if let Some(offset) = existing {
            for (dst, src) in self
                .vertices
                .chunks_exact_mut(stride)
                .zip(data.chunks_exact(components))
            {
                dst[offset..offset + components].copy_from_slice(src);
            }
            return Ok(());
        }

        let kept: Vec<VertexAttribute> = self
            .layout
            .attributes
            .iter()
            .filter(|a| a.semantic != semantic)
            .cloned()
            .collect();
        let mut layout = VertexLayout::new();
        let mut offset = 0;
        for attr in &kept {
            layout =
                layout.with_attribute(VertexAttribute::new(attr.semantic, attr.format, offset));
            offset += attr.format.components();
        }
        layout = layout.with_attribute(VertexAttribute::new(semantic, format, offset));
        let new_stride = layout.stride();
        let mut vertices = Vec::with_capacity(vertex_count * new_stride);
        for (i, v) in self.vertices.chunks_exact(stride).enumerate() {
            for attr in &kept {
                vertices.extend_from_slice(&v[attr.offset..attr.end()]);
            }
            vertices.extend_from_slice(&data[i * components..(i + 1) * components]);
        }
        if let Some(label) = &self.layout.label {
            layout = layout.with_label(label.clone());
        }
        self.vertices = vertices;
        self.layout = Arc::new(layout);
        Ok(())
    }
}

impl MeshBuilder {
    /// Snapshot this mesh into a [`MeshBuffer`].
    pub fn to_mesh_buffer(&self) -> MeshBuffer {
        MeshBuffer::from_builder(self)
    }
}

static_assertions::assert_impl_all!(MeshBuffer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::PrimitiveMode;

    fn quad() -> MeshBuilder {
        let mut mesh = MeshBuilder::new();
        mesh.mode(PrimitiveMode::Quads).unwrap();
        mesh.normal3(0.0, 0.0, 1.0);
        mesh.vertex2(0.0, 0.0)
            .vertex2(2.0, 0.0)
            .vertex2(2.0, 1.0)
            .vertex2(0.0, 1.0);
        mesh
    }

    #[test]
    fn test_index_format_size() {
        assert_eq!(IndexFormat::Uint8.size(), 1);
        assert_eq!(IndexFormat::Uint16.size(), 2);
        assert_eq!(IndexFormat::Uint32.size(), 4);
        assert_eq!(IndexFormat::for_vertex_count(256), IndexFormat::Uint8);
        assert_eq!(IndexFormat::for_vertex_count(257), IndexFormat::Uint16);
        assert_eq!(IndexFormat::for_vertex_count(70_000), IndexFormat::Uint32);
    }

    #[test]
    fn test_from_builder() {
        let buffer = quad().to_mesh_buffer().with_label("quad");
        assert_eq!(buffer.vertex_count(), 4);
        assert_eq!(buffer.index_count(), 6);
        assert_eq!(buffer.indices().format(), IndexFormat::Uint8);
        assert_eq!(buffer.indices().as_bytes(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(buffer.vertex_bytes().len(), 4 * 6 * 4);
        assert_eq!(buffer.label(), Some("quad"));
        let bounds = buffer.bounds().unwrap();
        assert_eq!(bounds.max, Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_set_indices_validates() {
        let mut buffer = quad().to_mesh_buffer();
        assert!(matches!(
            buffer.set_indices(&[0, 1, 4]),
            Err(MeshError::InvalidIndex { index: 4, .. })
        ));
        assert!(buffer.set_indices(&[0, 1]).is_err());
        assert_eq!(buffer.index_count(), 6);
        buffer.set_indices(&[3, 2, 1]).unwrap();
        assert_eq!(buffer.primitive_count(), 1);
    }

    #[test]
    fn test_set_attribute_overwrites_and_appends() {
        let mut buffer = quad().to_mesh_buffer();
        let normals = [0.0, 0.0, -1.0].repeat(4);
        buffer
            .set_attribute(VertexAttributeSemantic::Normal, 3, &normals)
            .unwrap();
        assert_eq!(buffer.vertices()[5], -1.0);

        let uvs = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        buffer
            .set_attribute(VertexAttributeSemantic::TexCoord, 2, &uvs)
            .unwrap();
        assert_eq!(buffer.layout().stride(), 8);
        assert_eq!(buffer.vertex_count(), 4);
        let uv = buffer
            .attribute(VertexAttributeSemantic::TexCoord)
            .unwrap()
            .offset;
        assert_eq!(buffer.vertices()[8 + uv], 1.0);
        assert_eq!(buffer.position(2), Some(Vec3::new(2.0, 1.0, 0.0)));

        assert!(
            buffer
                .set_attribute(VertexAttributeSemantic::Color, 3, &[1.0; 5])
                .is_err()
        );
    }
}
