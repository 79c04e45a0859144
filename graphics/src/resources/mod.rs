//! GPU resources owned by a scene: textures loaded by name and uploaded
//! mesh buffers.

mod mesh;
mod texture;

pub use mesh::{GpuMesh, GpuMeshCache};
pub use texture::{ImageData, ImageSource, LoadStatus, TextureLoader};
