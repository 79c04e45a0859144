//! The top-level renderer.

use prism_core::profiling::{frame_mark, profile_plot, profile_scope};

use crate::backend::{FramebufferId, GraphicsContext, ProgramId};
use crate::error::GraphicsError;
use crate::resources::{GpuMeshCache, ImageSource, TextureLoader};
use crate::shader::ProgramCache;

use super::batch::Batch3D;

/// Viewport and defaults of a [`Scene3D`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParameters {
    pub width: u32,
    pub height: u32,
    /// Clear color of the main pass.
    pub clear_color: [f32; 4],
    /// Skip shapes whose bounds fall outside the view frustum.
    pub frustum_culling: bool,
}

impl Default for SceneParameters {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            frustum_culling: true,
        }
    }
}

impl SceneParameters {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_clear_color(mut self, clear_color: [f32; 4]) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn with_frustum_culling(mut self, frustum_culling: bool) -> Self {
        self.frustum_culling = frustum_culling;
        self
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Batches drawn into one target.
#[derive(Debug, Clone)]
pub struct RenderPass {
    pub batches: Vec<Batch3D>,
    /// Offscreen target; `None` draws to the default framebuffer.
    pub framebuffer: Option<FramebufferId>,
    pub clear_color: Option<[f32; 4]>,
    pub clear_depth: Option<f32>,
    pub label: Option<String>,
}

impl Default for RenderPass {
    fn default() -> Self {
        Self {
            batches: Vec::new(),
            framebuffer: None,
            clear_color: None,
            clear_depth: Some(1.0),
            label: None,
        }
    }
}

impl RenderPass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_batch(mut self, batch: Batch3D) -> Self {
        self.batches.push(batch);
        self
    }

    pub fn with_framebuffer(mut self, framebuffer: FramebufferId) -> Self {
        self.framebuffer = Some(framebuffer);
        self
    }

    pub fn with_clear_color(mut self, clear_color: Option<[f32; 4]>) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn with_clear_depth(mut self, clear_depth: Option<f32>) -> Self {
        self.clear_depth = clear_depth;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Counters of one [`Scene3D::render`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Shapes drawn.
    pub drawn: usize,
    /// Shapes outside the view frustum.
    pub culled: usize,
    /// Shapes whose program failed to build.
    pub skipped: usize,
}

impl std::ops::AddAssign for RenderStats {
    fn add_assign(&mut self, other: Self) {
        self.drawn += other.drawn;
        self.culled += other.culled;
        self.skipped += other.skipped;
    }
}

/// Borrowed renderer state for drawing batches.
pub struct RenderContext<'a> {
    pub(crate) ctx: &'a mut dyn GraphicsContext,
    pub(crate) programs: &'a mut ProgramCache,
    pub(crate) textures: &'a mut TextureLoader,
    pub(crate) meshes: &'a mut GpuMeshCache,
    pub(crate) frustum_culling: bool,
    current_program: Option<ProgramId>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        ctx: &'a mut dyn GraphicsContext,
        programs: &'a mut ProgramCache,
        textures: &'a mut TextureLoader,
        meshes: &'a mut GpuMeshCache,
    ) -> Self {
        Self {
            ctx,
            programs,
            textures,
            meshes,
            frustum_culling: true,
            current_program: None,
        }
    }

    pub fn with_frustum_culling(mut self, frustum_culling: bool) -> Self {
        self.frustum_culling = frustum_culling;
        self
    }

    /// Make `program` current unless it already is. Returns whether the
    /// context was called.
    pub fn use_program(&mut self, program: ProgramId) -> bool {
        if self.current_program == Some(program) {
            return false;
        }
        self.ctx.use_program(program);
        self.current_program = Some(program);
        true
    }

    pub fn context(&mut self) -> &mut dyn GraphicsContext {
        &mut *self.ctx
    }
}

/// A graphics context with everything needed to draw into it: the shader
/// variant cache, loaded textures, uploaded meshes and the render passes.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use prism_core::deferred::resolved;
/// use prism_core::material::Material;
/// use prism_core::math::Vec3;
/// use prism_core::shapes::{ShapeOptions, create_sphere};
/// use prism_graphics::{Batch3D, DummyContext, ImageData, Scene3D, SceneParameters, Shape};
///
/// let mesh = Arc::new(create_sphere(1.0, 16, 8, ShapeOptions::new())?.to_mesh_buffer());
/// let mut batch = Batch3D::new().with_node(Shape::new(mesh, Material::new()));
/// batch.perspective(60.0, 1.0, 0.1, 100.0);
/// batch.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::y());
///
/// let images = |_: &str| resolved(Ok(ImageData::solid(1, 1, [255; 4])));
/// let mut scene = Scene3D::new(DummyContext::new(), images, SceneParameters::new(320, 320))?;
/// scene.main_pass_mut().batches.push(batch);
/// let stats = scene.render()?;
/// assert_eq!(stats.drawn, 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Scene3D<C: GraphicsContext> {
    ctx: C,
    params: SceneParameters,
    programs: ProgramCache,
    textures: TextureLoader,
    meshes: GpuMeshCache,
    passes: Vec<RenderPass>,
    frame: u64,
}

impl<C: GraphicsContext> Scene3D<C> {
    /// Fails with [`GraphicsError::InvalidContext`] for a lost context.
    pub fn new(
        ctx: C,
        images: impl ImageSource + 'static,
        params: SceneParameters,
    ) -> Result<Self, GraphicsError> {
        if !ctx.is_valid() {
            return Err(GraphicsError::InvalidContext);
        }
        log::info!("Scene3D created ({}x{})", params.width, params.height);
        let main = RenderPass::new()
            .with_clear_color(Some(params.clear_color))
            .with_label("main");
        Ok(Self {
            ctx,
            params,
            programs: ProgramCache::new(),
            textures: TextureLoader::new(images),
            meshes: GpuMeshCache::new(),
            passes: vec![main],
            frame: 0,
        })
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    pub fn parameters(&self) -> &SceneParameters {
        &self.params
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.params.width = width;
        self.params.height = height;
    }

    pub fn set_frustum_culling(&mut self, frustum_culling: bool) {
        self.params.frustum_culling = frustum_culling;
    }

    pub fn programs(&self) -> &ProgramCache {
        &self.programs
    }

    pub fn textures(&self) -> &TextureLoader {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureLoader {
        &mut self.textures
    }

    pub fn meshes(&self) -> &GpuMeshCache {
        &self.meshes
    }

    pub fn passes(&self) -> &[RenderPass] {
        &self.passes
    }

    pub fn passes_mut(&mut self) -> &mut Vec<RenderPass> {
        &mut self.passes
    }

    /// The default-framebuffer pass created with the scene.
    pub fn main_pass_mut(&mut self) -> &mut RenderPass {
        if self.passes.is_empty() {
            self.passes.push(
                RenderPass::new()
                    .with_clear_color(Some(self.params.clear_color))
                    .with_label("main"),
            );
        }
        let last = self.passes.len() - 1;
        &mut self.passes[last]
    }

    pub fn add_pass(&mut self, pass: RenderPass) {
        self.passes.insert(self.passes.len().saturating_sub(1), pass);
    }

    pub fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<FramebufferId, GraphicsError> {
        self.ctx.create_framebuffer(width, height)
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Render every pass in order.
    ///
    /// Finished texture loads are uploaded first, so shapes waiting on a
    /// texture pick it up this frame.
    pub fn render(&mut self) -> Result<RenderStats, GraphicsError> {
        profile_scope!("scene_render");
        if !self.ctx.is_valid() {
            return Err(GraphicsError::InvalidContext);
        }
        let uploaded = self.textures.poll(&mut self.ctx);
        if uploaded > 0 {
            log::debug!("{} textures became available", uploaded);
        }

        let mut stats = RenderStats::default();
        let mut rc = RenderContext::new(
            &mut self.ctx,
            &mut self.programs,
            &mut self.textures,
            &mut self.meshes,
        )
        .with_frustum_culling(self.params.frustum_culling);
        for pass in &self.passes {
            rc.ctx.bind_framebuffer(pass.framebuffer);
            rc.ctx
                .viewport(0, 0, self.params.width, self.params.height);
            if pass.clear_color.is_some() || pass.clear_depth.is_some() {
                rc.ctx.clear(pass.clear_color, pass.clear_depth);
            }
            for batch in &pass.batches {
                batch.render(&mut rc, &mut stats)?;
            }
        }
        self.frame += 1;
        log::trace!("Frame {}: {:?}", self.frame, stats);
        profile_plot!("shapes_drawn", stats.drawn);
        profile_plot!("shapes_culled", stats.culled);
        frame_mark!();
        Ok(stats)
    }

    /// Free GPU copies of meshes no shape references any more.
    pub fn release_unused_meshes(&mut self) -> usize {
        self.meshes.release_unused(&mut self.ctx)
    }
}
