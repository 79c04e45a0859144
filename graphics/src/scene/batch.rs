//! Batches: a camera, lights and the shapes they render.

use std::cell::OnceCell;

use prism_core::material::{Lights, MAX_LIGHTS, MaterialKind};
use prism_core::math::{
    Frustum, Mat4, Vec3, mat4_inverse, mat4_inverse_transpose3, mat4_is_affine,
    mat4_is_translation_only, mat4_look_at, mat4_ortho, mat4_perspective,
};
use prism_core::profiling::profile_scope;

use crate::backend::{GraphicsContext, UniformValue};
use crate::error::GraphicsError;
use crate::materials::{LightsBinder, MaterialBinder};
use crate::shader::{MatrixSemantics, ShaderFlags, ShaderProgram};

use super::scene3d::{RenderContext, RenderStats};
use super::shape::{Node, Shape};

/// Shapes rendered with one view, one projection and one set of lights.
#[derive(Debug, Clone)]
pub struct Batch3D {
    view: Mat4,
    projection: Mat4,
    lights: Lights,
    nodes: Vec<Node>,
    pub label: Option<String>,
}

impl Default for Batch3D {
    fn default() -> Self {
        Self {
            view: Mat4::identity(),
            projection: Mat4::identity(),
            lights: Lights::new(),
            nodes: Vec::new(),
            label: None,
        }
    }
}

impl Batch3D {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_view(mut self, view: Mat4) -> Self {
        self.view = view;
        self
    }

    pub fn with_projection(mut self, projection: Mat4) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_lights(mut self, lights: Lights) -> Self {
        self.set_lights(lights);
        self
    }

    pub fn with_node(mut self, node: impl Into<Node>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    pub fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Perspective projection with a vertical field of view in degrees.
    pub fn perspective(&mut self, fovy_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.projection = mat4_perspective(fovy_degrees, aspect, near, far);
    }

    pub fn orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = mat4_ortho(left, right, bottom, top, near, far);
    }

    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.view = mat4_look_at(&eye, &center, &up);
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    pub fn set_lights(&mut self, lights: Lights) {
        if lights.len() > MAX_LIGHTS {
            log::warn!(
                "Batch has {} lights, only the first {} are used",
                lights.len(),
                MAX_LIGHTS
            );
        }
        self.lights = lights;
    }

    pub fn push(&mut self, node: impl Into<Node>) {
        self.nodes.push(node.into());
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut Vec<Node> {
        &mut self.nodes
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Frustum of the current view and projection.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(&(self.projection * self.view))
    }

    /// Draw every visible node, depth first.
    pub fn render(
        &self,
        rc: &mut RenderContext<'_>,
        stats: &mut RenderStats,
    ) -> Result<(), GraphicsError> {
        profile_scope!("batch_render");
        let frame = FrameMatrices::new(&self.view, &self.projection);
        let frustum = rc.frustum_culling.then(|| self.frustum());
        let walk = Walk {
            batch: self,
            frame: &frame,
            frustum: frustum.as_ref(),
        };
        for node in &self.nodes {
            walk.node(rc, stats, node, &Mat4::identity())?;
        }
        Ok(())
    }
}

struct Walk<'b> {
    batch: &'b Batch3D,
    frame: &'b FrameMatrices<'b>,
    frustum: Option<&'b Frustum>,
}

impl Walk<'_> {
    fn node(
        &self,
        rc: &mut RenderContext<'_>,
        stats: &mut RenderStats,
        node: &Node,
        parent: &Mat4,
    ) -> Result<(), GraphicsError> {
        if !node.is_visible() {
            return Ok(());
        }
        let world = parent * node.transform().matrix();
        match node {
            Node::Shape(shape) => self.shape(rc, stats, shape, &world),
            Node::Group(group) => {
                for child in &group.children {
                    self.node(rc, stats, child, &world)?;
                }
                Ok(())
            }
        }
    }

    fn shape(
        &self,
        rc: &mut RenderContext<'_>,
        stats: &mut RenderStats,
        shape: &Shape,
        world: &Mat4,
    ) -> Result<(), GraphicsError> {
        let Some(bounds) = shape.local_bounds() else {
            return Ok(());
        };
        if let Some(frustum) = self.frustum {
            if !frustum.has_box(&bounds.transformed(world)) {
                stats.culled += 1;
                return Ok(());
            }
        }

        let program = match &shape.shader {
            Some(info) => rc.programs.custom_program(info, &mut *rc.ctx)?,
            None => {
                let flags = default_flags(shape, !self.batch.lights.is_empty());
                rc.programs.program(flags, &mut *rc.ctx)?
            }
        };
        let Some(handle) = program.handle() else {
            log::trace!("Skipping '{}': program not linked", shape.label_or_default());
            stats.skipped += 1;
            return Ok(());
        };
        rc.use_program(handle);
        program.apply_defaults(&mut *rc.ctx);
        self.frame.upload(&program, &mut *rc.ctx, world);
        MaterialBinder::new(&shape.material).bind(&program, &mut *rc.ctx, &mut *rc.textures);
        if program.uses_lights() {
            LightsBinder::new(&self.batch.lights).bind(&program, &mut *rc.ctx, &self.batch.view);
        }

        let gpu = rc.meshes.get_or_upload(&mut *rc.ctx, shape.mesh())?.clone();
        if gpu.index_count == 0 {
            return Ok(());
        }
        for attribute in &gpu.layout.attributes {
            if let Some(location) = program.attribute_location(attribute.semantic) {
                rc.ctx
                    .bind_vertex_attribute(gpu.vertex_buffer, gpu.pointer(attribute, location));
            }
        }
        rc.ctx.draw_elements(
            gpu.primitive_type,
            gpu.index_buffer,
            gpu.index_format,
            gpu.index_count,
        );
        stats.drawn += 1;
        Ok(())
    }
}

fn default_flags(shape: &Shape, lit: bool) -> ShaderFlags {
    let attributes = shape.mesh().layout().attribute_bits();
    match &shape.material {
        MaterialKind::Basic(material) => ShaderFlags::for_material(material, attributes, lit),
        MaterialKind::Pbr(material) => ShaderFlags::for_pbr_material(material, attributes, lit),
    }
}

/// View and projection of one batch, with the products shapes ask for.
///
/// Only the matrices a program declares are computed and uploaded.
pub(crate) struct FrameMatrices<'a> {
    view: &'a Mat4,
    projection: &'a Mat4,
    view_translation_only: bool,
    view_inverse: OnceCell<Mat4>,
}

impl<'a> FrameMatrices<'a> {
    pub(crate) fn new(view: &'a Mat4, projection: &'a Mat4) -> Self {
        Self {
            view,
            projection,
            view_translation_only: mat4_is_translation_only(view),
            view_inverse: OnceCell::new(),
        }
    }

    /// `view * model`, adding translations when the view only translates.
    pub(crate) fn model_view(&self, model: &Mat4) -> Mat4 {
        if self.view_translation_only && mat4_is_affine(model) {
            let mut mv = *model;
            for row in 0..3 {
                mv[(row, 3)] += self.view[(row, 3)];
            }
            mv
        } else {
            self.view * model
        }
    }

    /// Upload the matrices `program` reads for a shape at `model`.
    pub(crate) fn upload(
        &self,
        program: &ShaderProgram,
        ctx: &mut dyn GraphicsContext,
        model: &Mat4,
    ) {
        let usage = program.matrix_usage();
        if usage.is_empty() {
            return;
        }
        if usage.contains(MatrixSemantics::MODEL) {
            program.set_matrix(ctx, MatrixSemantics::MODEL, model.into());
        }
        if usage.contains(MatrixSemantics::VIEW) {
            program.set_matrix(ctx, MatrixSemantics::VIEW, self.view.into());
        }
        if usage.contains(MatrixSemantics::PROJECTION) {
            program.set_matrix(ctx, MatrixSemantics::PROJECTION, self.projection.into());
        }
        if usage.contains(MatrixSemantics::VIEW_INVERSE) {
            let inverse = self.view_inverse.get_or_init(|| mat4_inverse(self.view));
            program.set_matrix(ctx, MatrixSemantics::VIEW_INVERSE, inverse.into());
        }

        let needs_model_view = MatrixSemantics::MODEL_VIEW
            | MatrixSemantics::MODEL_VIEW_PROJECTION
            | MatrixSemantics::MODEL_VIEW_INVERSE_TRANSPOSE;
        if !usage.intersects(needs_model_view) {
            return;
        }
        let mv = self.model_view(model);
        if usage.contains(MatrixSemantics::MODEL_VIEW) {
            program.set_matrix(ctx, MatrixSemantics::MODEL_VIEW, (&mv).into());
        }
        if usage.contains(MatrixSemantics::MODEL_VIEW_PROJECTION) {
            let mvp = self.projection * mv;
            program.set_matrix(ctx, MatrixSemantics::MODEL_VIEW_PROJECTION, (&mvp).into());
        }
        if usage.contains(MatrixSemantics::MODEL_VIEW_INVERSE_TRANSPOSE) {
            let normal = mat4_inverse_transpose3(&mv);
            program.set_matrix(
                ctx,
                MatrixSemantics::MODEL_VIEW_INVERSE_TRANSPOSE,
                UniformValue::from(&normal),
            );
        }
    }
}
