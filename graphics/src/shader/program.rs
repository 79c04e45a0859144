//! Linked shader programs with a uniform value cache.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use prism_core::mesh::VertexAttributeSemantic;
use prism_core::profiling::profile_scope;

use crate::backend::{GraphicsContext, ProgramId, ShaderStage, UniformLocation, UniformValue};
use crate::error::GraphicsError;

use super::{MatrixSemantics, ShaderFlags, ShaderInfo};

/// A shader variant linked for one context.
///
/// A program whose compilation or linking failed has no handle; shapes
/// using it are skipped at draw time. Uniform uploads go through
/// [`set_uniform`](Self::set_uniform), which skips values equal to the last
/// upload.
#[derive(Debug)]
pub struct ShaderProgram {
    handle: Option<ProgramId>,
    flags: ShaderFlags,
    info: Rc<ShaderInfo>,
    uniforms: HashMap<String, UniformLocation>,
    attributes: Vec<(VertexAttributeSemantic, u32)>,
    matrices: Vec<(MatrixSemantics, UniformLocation)>,
    matrix_usage: MatrixSemantics,
    uses_lights: bool,
    values: RefCell<HashMap<UniformLocation, UniformValue>>,
    defaults_applied: Cell<bool>,
}

impl ShaderProgram {
    /// Compile and link `info` with the `flags` header.
    ///
    /// Failures are logged and produce a program without a handle.
    pub fn build(
        ctx: &mut dyn GraphicsContext,
        info: Rc<ShaderInfo>,
        flags: ShaderFlags,
    ) -> Self {
        profile_scope!("shader_program_build");
        let header = flags.defines();
        let handle = match Self::link(ctx, &info, &header) {
            Ok(handle) => Some(handle),
            Err(err) => {
                log::error!(
                    "Shader '{}' ({:?}) failed to build: {}",
                    info.label(),
                    flags,
                    err
                );
                None
            }
        };
        let mut program = Self {
            handle,
            flags,
            info,
            uniforms: HashMap::new(),
            attributes: Vec::new(),
            matrices: Vec::new(),
            matrix_usage: MatrixSemantics::empty(),
            uses_lights: false,
            values: RefCell::new(HashMap::new()),
            defaults_applied: Cell::new(false),
        };
        if let Some(handle) = handle {
            program.reflect(ctx, handle);
        }
        program
    }

    fn link(
        ctx: &mut dyn GraphicsContext,
        info: &ShaderInfo,
        header: &str,
    ) -> Result<ProgramId, GraphicsError> {
        let vertex = ctx.compile_shader(
            ShaderStage::Vertex,
            &format!("{header}{}", info.vertex_source()),
        )?;
        let fragment = match ctx.compile_shader(
            ShaderStage::Fragment,
            &format!("{header}{}", info.fragment_source()),
        ) {
            Ok(fragment) => fragment,
            Err(err) => {
                ctx.delete_shader(vertex);
                return Err(err);
            }
        };
        let linked = ctx.link_program(vertex, fragment);
        ctx.delete_shader(vertex);
        ctx.delete_shader(fragment);
        linked
    }

    fn reflect(&mut self, ctx: &dyn GraphicsContext, handle: ProgramId) {
        for uniform in ctx.active_uniforms(handle) {
            let location = UniformLocation(uniform.location);
            if let Some(semantic) = self.info.uniform_semantic(&uniform.name) {
                self.matrices.push((semantic, location));
                self.matrix_usage |= semantic;
            }
            if uniform.name.starts_with("lights[") {
                self.uses_lights = true;
            }
            self.uniforms.insert(uniform.name, location);
        }
        for attribute in ctx.active_attributes(handle) {
            match self.info.attribute_semantic(&attribute.name) {
                Some(semantic) => self.attributes.push((semantic, attribute.location)),
                None => log::debug!(
                    "Shader '{}': attribute '{}' has no semantic",
                    self.info.label(),
                    attribute.name
                ),
            }
        }
    }

    /// The linked program, or `None` if building failed.
    pub fn handle(&self) -> Option<ProgramId> {
        self.handle
    }

    pub fn is_linked(&self) -> bool {
        self.handle.is_some()
    }

    pub fn flags(&self) -> ShaderFlags {
        self.flags
    }

    pub fn info(&self) -> &Rc<ShaderInfo> {
        &self.info
    }

    /// Matrices the program reads.
    pub fn matrix_usage(&self) -> MatrixSemantics {
        self.matrix_usage
    }

    /// Whether the program declares the `lights` array.
    pub fn uses_lights(&self) -> bool {
        self.uses_lights
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    /// Attribute location reading mesh attribute `semantic`.
    pub fn attribute_location(&self, semantic: VertexAttributeSemantic) -> Option<u32> {
        self.attributes
            .iter()
            .find(|(s, _)| *s == semantic)
            .map(|&(_, location)| location)
    }

    /// Upload `value` to uniform `name` of this program, which must be in use.
    ///
    /// Returns `true` if a call reached the context: unknown names and
    /// unchanged values are skipped.
    pub fn set_uniform(
        &self,
        ctx: &mut dyn GraphicsContext,
        name: &str,
        value: UniformValue,
    ) -> bool {
        match self.uniforms.get(name) {
            Some(&location) => self.upload(ctx, location, value),
            None => false,
        }
    }

    /// Upload a matrix to every uniform carrying `semantic`.
    pub fn set_matrix(
        &self,
        ctx: &mut dyn GraphicsContext,
        semantic: MatrixSemantics,
        value: UniformValue,
    ) -> bool {
        let mut uploaded = false;
        for &(s, location) in &self.matrices {
            if s == semantic {
                uploaded |= self.upload(ctx, location, value);
            }
        }
        uploaded
    }

    fn upload(
        &self,
        ctx: &mut dyn GraphicsContext,
        location: UniformLocation,
        value: UniformValue,
    ) -> bool {
        let mut values = self.values.borrow_mut();
        if values.get(&location) == Some(&value) {
            return false;
        }
        ctx.set_uniform(location, &value);
        values.insert(location, value);
        true
    }

    /// Upload the shader's default uniforms the first time the program is
    /// used. The program must be in use.
    pub fn apply_defaults(&self, ctx: &mut dyn GraphicsContext) {
        if self.defaults_applied.replace(true) {
            return;
        }
        for (name, value) in self.info.default_uniforms() {
            self.set_uniform(ctx, name, *value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ContextCall, DummyContext};

    fn build(ctx: &mut DummyContext, flags: ShaderFlags) -> ShaderProgram {
        ShaderProgram::build(ctx, Rc::new(ShaderInfo::default_shader()), flags)
    }

    #[test]
    fn reflects_default_shader() {
        let mut ctx = DummyContext::new();
        let program = build(&mut ctx, ShaderFlags::LIGHTING);
        assert!(program.is_linked());
        assert!(program.uses_lights());
        assert!(program.has_uniform("lights[2].radius"));
        assert_eq!(
            program.matrix_usage(),
            MatrixSemantics::MODEL_VIEW
                | MatrixSemantics::PROJECTION
                | MatrixSemantics::MODEL_VIEW_INVERSE_TRANSPOSE
        );
        assert!(program.attribute_location(VertexAttributeSemantic::Normal).is_some());
        assert!(program.attribute_location(VertexAttributeSemantic::TexCoord).is_none());

        let unlit = build(&mut ctx, ShaderFlags::empty());
        assert!(!unlit.uses_lights());
        assert!(!unlit.has_uniform("normalMatrix"));
    }

    #[test]
    fn unchanged_uniforms_are_not_reuploaded() {
        let mut ctx = DummyContext::new();
        let program = build(&mut ctx, ShaderFlags::empty());
        ctx.use_program(program.handle().unwrap());
        let red = UniformValue::Vec4([1.0, 0.0, 0.0, 1.0]);
        assert!(program.set_uniform(&mut ctx, "md", red));
        assert!(!program.set_uniform(&mut ctx, "md", red));
        assert!(!program.set_uniform(&mut ctx, "missing", red));
        assert_eq!(
            ctx.count_calls(|c| matches!(c, ContextCall::SetUniform { .. })),
            1
        );
    }

    #[test]
    fn defaults_apply_once() {
        let mut ctx = DummyContext::new();
        let program = build(&mut ctx, ShaderFlags::SPECULAR | ShaderFlags::LIGHTING);
        let handle = program.handle().unwrap();
        ctx.use_program(handle);
        program.apply_defaults(&mut ctx);
        assert_eq!(ctx.uniform_value(handle, "ma"), Some(UniformValue::Vec3([0.2; 3])));
        assert_eq!(ctx.uniform_value(handle, "mshin"), Some(UniformValue::Float(0.0)));
        ctx.clear_calls();
        program.apply_defaults(&mut ctx);
        assert!(ctx.calls().is_empty());
    }

    #[test]
    fn failed_build_has_no_handle() {
        let mut ctx = DummyContext::new().with_compile_failure("");
        let program = build(&mut ctx, ShaderFlags::LIGHTING);
        assert!(program.handle().is_none());
        assert!(!program.has_uniform("md"));
        assert_eq!(ctx.program_count(), 0);
    }
}
