//! # Prism Graphics
//!
//! Scene rendering on top of a small WebGL-like graphics context.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`GraphicsContext`] - Trait for the GPU calls the renderer makes
//! - [`ProgramCache`] - Shader variants keyed by [`ShaderFlags`]
//! - [`materials`] - Material and light uniform binding
//! - [`TextureLoader`] - Asynchronous, non-blocking texture loading
//! - [`Scene3D`] - Shape trees, batches, frustum culling and draw calls
//! - [`DummyContext`] - A recording context for tests and headless runs
//!
//! CPU-side data (meshes, shapes, curves, materials) lives in `prism-core`.
//!
//! ## Example
//!
//! ```
//! use prism_graphics::{DummyContext, ProgramCache, ShaderFlags};
//!
//! let mut ctx = DummyContext::new();
//! let mut cache = ProgramCache::new();
//! let program = cache.program(ShaderFlags::LIGHTING, &mut ctx).unwrap();
//! assert!(program.uses_lights());
//! ```

pub mod backend;
pub mod error;
pub mod materials;
pub mod resources;
pub mod scene;
pub mod shader;

// Re-export main types for convenience
pub use backend::{ContextCall, DummyContext, GraphicsContext, UniformValue};
pub use error::{GraphicsError, TextureError};
pub use materials::{LightsBinder, MAX_TEXTURE_UNITS, MaterialBinder};
pub use resources::{GpuMesh, GpuMeshCache, ImageData, ImageSource, LoadStatus, TextureLoader};
pub use scene::{
    Batch3D, Node, RenderContext, RenderPass, RenderStats, Scene3D, SceneParameters, Shape,
    ShapeGroup, Transform,
};
pub use shader::{MatrixSemantics, ProgramCache, ShaderFlags, ShaderInfo, ShaderProgram};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// Logs the version; call once after installing a logger.
pub fn init() {
    log::info!("Prism Graphics v{} initialized", VERSION);
}
