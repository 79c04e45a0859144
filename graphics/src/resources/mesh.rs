//! Mesh buffers uploaded to the GPU.

use std::collections::HashMap;
use std::sync::Arc;

use prism_core::mesh::{IndexFormat, MeshBuffer, PrimitiveType, VertexAttribute, VertexLayout};

use crate::backend::{AttributePointer, BufferId, GraphicsContext};
use crate::error::GraphicsError;

const FLOAT_BYTES: u32 = std::mem::size_of::<f32>() as u32;

/// GPU copies of one [`MeshBuffer`].
#[derive(Debug, Clone)]
pub struct GpuMesh {
    pub vertex_buffer: BufferId,
    pub index_buffer: BufferId,
    pub index_format: IndexFormat,
    pub index_count: usize,
    pub primitive_type: PrimitiveType,
    pub layout: Arc<VertexLayout>,
}

impl GpuMesh {
    /// Byte layout of `attribute` for binding at `location`.
    pub fn pointer(&self, attribute: &VertexAttribute, location: u32) -> AttributePointer {
        AttributePointer {
            location,
            components: attribute.format.components() as u32,
            stride_bytes: self.layout.stride() as u32 * FLOAT_BYTES,
            offset_bytes: attribute.offset as u32 * FLOAT_BYTES,
        }
    }
}

/// Uploads each shared mesh buffer once.
///
/// Entries are keyed by the `Arc` identity of the buffer, so shapes sharing
/// one `Arc<MeshBuffer>` share the GPU copy.
#[derive(Debug, Default)]
pub struct GpuMeshCache {
    meshes: HashMap<*const MeshBuffer, (Arc<MeshBuffer>, GpuMesh)>,
}

impl GpuMeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// GPU copy of `mesh`, uploading it on first use.
    pub fn get_or_upload(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        mesh: &Arc<MeshBuffer>,
    ) -> Result<&GpuMesh, GraphicsError> {
        let key = Arc::as_ptr(mesh);
        if !self.meshes.contains_key(&key) {
            let vertex_buffer = ctx.create_vertex_buffer(mesh.vertex_bytes())?;
            let index_buffer = match ctx.create_index_buffer(mesh.indices().as_bytes()) {
                Ok(buffer) => buffer,
                Err(err) => {
                    ctx.delete_buffer(vertex_buffer);
                    return Err(err);
                }
            };
            log::debug!(
                "Uploaded mesh {:?}: {} vertices, {} indices",
                mesh.label().unwrap_or("<unnamed>"),
                mesh.vertex_count(),
                mesh.index_count()
            );
            let gpu = GpuMesh {
                vertex_buffer,
                index_buffer,
                index_format: mesh.indices().format(),
                index_count: mesh.index_count(),
                primitive_type: mesh.primitive_type(),
                layout: Arc::clone(mesh.layout()),
            };
            self.meshes.insert(key, (Arc::clone(mesh), gpu));
        }
        self.meshes
            .get(&key)
            .map(|(_, gpu)| gpu)
            .ok_or_else(|| GraphicsError::ResourceCreationFailed("mesh upload".into()))
    }

    /// Delete GPU copies of meshes nothing else references. Returns how
    /// many were released.
    pub fn release_unused(&mut self, ctx: &mut dyn GraphicsContext) -> usize {
        let before = self.meshes.len();
        self.meshes.retain(|_, (mesh, gpu)| {
            if Arc::strong_count(mesh) > 1 {
                return true;
            }
            ctx.delete_buffer(gpu.vertex_buffer);
            ctx.delete_buffer(gpu.index_buffer);
            false
        });
        before - self.meshes.len()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
