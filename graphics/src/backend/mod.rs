//! Graphics context abstraction.
//!
//! The renderer talks to the GPU through the [`GraphicsContext`] trait, a
//! narrow WebGL-like surface: shader compilation and linking, active
//! uniform/attribute queries, uniform upload, textures, buffers, indexed
//! draws and framebuffers. Resources are referred to by opaque ids.
//!
//! # Available Backends
//!
//! - [`DummyContext`]: records every call without touching a GPU. Used by
//!   the tests and usable for headless runs.
//!
//! Other backends live with the application that owns the window or canvas
//! and implement the trait there.

pub mod dummy;

pub use dummy::{ContextCall, DummyContext};

use prism_core::mesh::{IndexFormat, PrimitiveType};

use crate::error::GraphicsError;
use crate::resources::ImageData;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

resource_id!(
    /// A compiled shader stage.
    ShaderId
);
resource_id!(
    /// A linked program.
    ProgramId
);
resource_id!(
    /// A texture object.
    TextureId
);
resource_id!(
    /// A vertex or index buffer.
    BufferId
);
resource_id!(
    /// An offscreen framebuffer.
    FramebufferId
);
resource_id!(
    /// Location of an active uniform within its program.
    UniformLocation
);

/// Shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// An active uniform or attribute reported by a linked program.
///
/// Struct-array uniforms are reported per member, e.g. `lights[1].diffuse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveVariable {
    pub name: String,
    pub location: u32,
}

/// A value for a uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Column-major 3x3 matrix.
    Mat3([f32; 9]),
    /// Column-major 4x4 matrix.
    Mat4([f32; 16]),
}

impl UniformValue {
    /// Zero of the same shape.
    pub fn zeroed(&self) -> Self {
        match self {
            Self::Int(_) => Self::Int(0),
            Self::Float(_) => Self::Float(0.0),
            Self::Vec2(_) => Self::Vec2([0.0; 2]),
            Self::Vec3(_) => Self::Vec3([0.0; 3]),
            Self::Vec4(_) => Self::Vec4([0.0; 4]),
            Self::Mat3(_) => Self::Mat3([0.0; 9]),
            Self::Mat4(_) => Self::Mat4([0.0; 16]),
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        Self::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        Self::Vec4(v)
    }
}

impl From<&prism_core::math::Mat3> for UniformValue {
    fn from(m: &prism_core::math::Mat3) -> Self {
        Self::Mat3(prism_core::math::mat3_to_array(m))
    }
}

impl From<&prism_core::math::Mat4> for UniformValue {
    fn from(m: &prism_core::math::Mat4) -> Self {
        Self::Mat4(prism_core::math::mat4_to_array(m))
    }
}

/// Byte layout of one vertex attribute inside a bound vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePointer {
    pub location: u32,
    pub components: u32,
    pub stride_bytes: u32,
    pub offset_bytes: u32,
}

/// The operations the renderer needs from a graphics API.
///
/// All methods are called from the render thread. A context that has been
/// lost reports `false` from [`is_valid`](Self::is_valid); the renderer
/// refuses to build programs for it.
pub trait GraphicsContext {
    /// Whether the context can still be used.
    fn is_valid(&self) -> bool;

    /// Compile one shader stage. The error carries the compiler log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str)
    -> Result<ShaderId, GraphicsError>;

    /// Link a vertex and a fragment stage. The error carries the linker log.
    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, GraphicsError>;

    fn delete_shader(&mut self, shader: ShaderId);

    fn active_uniforms(&self, program: ProgramId) -> Vec<ActiveVariable>;

    fn active_attributes(&self, program: ProgramId) -> Vec<ActiveVariable>;

    fn use_program(&mut self, program: ProgramId);

    /// Upload a uniform of the program currently in use.
    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue);

    /// Create an RGBA8 texture from decoded image data.
    fn create_texture(&mut self, image: &ImageData) -> Result<TextureId, GraphicsError>;

    /// Bind `texture` to `unit`, or unbind the unit.
    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

    fn create_vertex_buffer(&mut self, data: &[u8]) -> Result<BufferId, GraphicsError>;

    fn create_index_buffer(&mut self, data: &[u8]) -> Result<BufferId, GraphicsError>;

    fn delete_buffer(&mut self, buffer: BufferId);

    /// Point an attribute location at a vertex buffer.
    fn bind_vertex_attribute(&mut self, buffer: BufferId, pointer: AttributePointer);

    /// Draw `count` indices from `indices`.
    fn draw_elements(
        &mut self,
        primitive: PrimitiveType,
        indices: BufferId,
        format: IndexFormat,
        count: usize,
    );

    fn create_framebuffer(&mut self, width: u32, height: u32)
    -> Result<FramebufferId, GraphicsError>;

    /// Bind an offscreen target, or the default framebuffer for `None`.
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>);

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Clear color and/or depth.
    fn clear(&mut self, color: Option<[f32; 4]>, depth: Option<f32>);
}
