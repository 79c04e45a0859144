//! Per-context cache of compiled shader programs.

use std::collections::HashMap;
use std::rc::Rc;

use crate::backend::GraphicsContext;
use crate::error::GraphicsError;

use super::{ShaderFlags, ShaderInfo, ShaderProgram};

/// Compiled programs for one graphics context.
///
/// Default-shader variants are keyed by the exact [`ShaderFlags`] bits;
/// custom shaders by the identity of their `Rc<ShaderInfo>`. A cache must
/// only ever be used with the context its programs were built for; the
/// scene that owns the context owns the cache.
#[derive(Debug)]
pub struct ProgramCache {
    default_info: Rc<ShaderInfo>,
    programs: HashMap<ShaderFlags, Rc<ShaderProgram>>,
    // The info is held so its address stays unique while cached.
    custom: HashMap<*const ShaderInfo, (Rc<ShaderInfo>, Rc<ShaderProgram>)>,
}

impl Default for ProgramCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramCache {
    /// Cache for the built-in shader.
    pub fn new() -> Self {
        Self::with_default_info(Rc::new(ShaderInfo::default_shader()))
    }

    /// Cache whose flag variants are built from `info`.
    pub fn with_default_info(info: Rc<ShaderInfo>) -> Self {
        Self {
            default_info: info,
            programs: HashMap::new(),
            custom: HashMap::new(),
        }
    }

    /// Program for the default-shader variant `flags`.
    ///
    /// Repeated calls with the same flags return the same `Rc`. A variant
    /// that fails to build is cached too, without a handle, and is not
    /// rebuilt.
    pub fn program(
        &mut self,
        flags: ShaderFlags,
        ctx: &mut dyn GraphicsContext,
    ) -> Result<Rc<ShaderProgram>, GraphicsError> {
        if !ctx.is_valid() {
            return Err(GraphicsError::InvalidContext);
        }
        if let Some(program) = self.programs.get(&flags) {
            return Ok(Rc::clone(program));
        }
        log::debug!("Building shader variant {:?}", flags);
        let program = Rc::new(ShaderProgram::build(ctx, Rc::clone(&self.default_info), flags));
        self.programs.insert(flags, Rc::clone(&program));
        Ok(program)
    }

    /// Program for a user-supplied shader.
    pub fn custom_program(
        &mut self,
        info: &Rc<ShaderInfo>,
        ctx: &mut dyn GraphicsContext,
    ) -> Result<Rc<ShaderProgram>, GraphicsError> {
        if !ctx.is_valid() {
            return Err(GraphicsError::InvalidContext);
        }
        let key = Rc::as_ptr(info);
        if let Some((_, program)) = self.custom.get(&key) {
            return Ok(Rc::clone(program));
        }
        log::debug!("Building custom shader '{}'", info.label());
        let program = Rc::new(ShaderProgram::build(
            ctx,
            Rc::clone(info),
            ShaderFlags::empty(),
        ));
        self.custom.insert(key, (Rc::clone(info), Rc::clone(&program)));
        Ok(program)
    }

    /// Number of cached programs, failed ones included.
    pub fn len(&self) -> usize {
        self.programs.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached program, e.g. after the context was restored.
    pub fn clear(&mut self) {
        self.programs.clear();
        self.custom.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummyContext;

    #[test]
    fn same_flags_share_a_program() {
        let mut ctx = DummyContext::new();
        let mut cache = ProgramCache::new();
        let a = cache.program(ShaderFlags::LIGHTING, &mut ctx).unwrap();
        let b = cache.program(ShaderFlags::LIGHTING, &mut ctx).unwrap();
        let c = cache
            .program(ShaderFlags::LIGHTING | ShaderFlags::SPECULAR, &mut ctx)
            .unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
        assert_eq!(ctx.program_count(), 2);
    }

    #[test]
    fn invalid_context_is_rejected() {
        let mut ctx = DummyContext::new();
        ctx.lose_context();
        let mut cache = ProgramCache::new();
        assert_eq!(
            cache.program(ShaderFlags::empty(), &mut ctx).err(),
            Some(GraphicsError::InvalidContext)
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn failed_variant_is_cached_without_handle() {
        let mut ctx = DummyContext::new().with_compile_failure("#define PBR");
        let mut cache = ProgramCache::new();
        let pbr = cache.program(ShaderFlags::PBR, &mut ctx).unwrap();
        assert!(pbr.handle().is_none());
        let again = cache.program(ShaderFlags::PBR, &mut ctx).unwrap();
        assert!(Rc::ptr_eq(&pbr, &again));
        assert!(cache.program(ShaderFlags::empty(), &mut ctx).unwrap().is_linked());
    }

    #[test]
    fn custom_programs_keyed_by_info_identity() {
        let mut ctx = DummyContext::new();
        let mut cache = ProgramCache::new();
        let source = "attribute vec3 position;\nuniform mat4 modelViewProjectionMatrix;\n";
        let info = Rc::new(
            ShaderInfo::new("solid", source, "uniform vec4 md;\n").with_standard_semantics(),
        );
        let twin = Rc::new((*info).clone());
        let a = cache.custom_program(&info, &mut ctx).unwrap();
        let b = cache.custom_program(&info, &mut ctx).unwrap();
        let c = cache.custom_program(&twin, &mut ctx).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &c));
        assert_eq!(
            a.matrix_usage(),
            crate::shader::MatrixSemantics::MODEL_VIEW_PROJECTION
        );
    }
}
