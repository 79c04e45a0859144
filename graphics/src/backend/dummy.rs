//! Dummy graphics context for testing and headless runs.
//!
//! [`DummyContext`] performs no GPU work. It records every call as a
//! [`ContextCall`], keeps the uniform values and texture bindings it was
//! given, and reports active uniforms and attributes by scanning the
//! preprocessed shader sources, so programs built with different `#define`
//! headers expose different inputs just as they would on a real driver.

use std::collections::HashMap;

use prism_core::mesh::{IndexFormat, PrimitiveType};

use crate::error::GraphicsError;
use crate::resources::ImageData;

use super::{
    ActiveVariable, AttributePointer, BufferId, FramebufferId, GraphicsContext, ProgramId,
    ShaderId, ShaderStage, TextureId, UniformLocation, UniformValue,
};

/// One recorded context call.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextCall {
    CompileShader(ShaderStage),
    DeleteShader(ShaderId),
    LinkProgram(ProgramId),
    UseProgram(ProgramId),
    SetUniform {
        program: ProgramId,
        location: UniformLocation,
        value: UniformValue,
    },
    CreateTexture(TextureId),
    BindTexture {
        unit: u32,
        texture: Option<TextureId>,
    },
    CreateBuffer(BufferId),
    DeleteBuffer(BufferId),
    BindVertexAttribute {
        buffer: BufferId,
        pointer: AttributePointer,
    },
    DrawElements {
        primitive: PrimitiveType,
        indices: BufferId,
        format: IndexFormat,
        count: usize,
    },
    CreateFramebuffer(FramebufferId),
    BindFramebuffer(Option<FramebufferId>),
    Viewport {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    Clear {
        color: Option<[f32; 4]>,
        depth: Option<f32>,
    },
}

#[derive(Debug)]
struct DummyShader {
    stage: ShaderStage,
    /// Source with inactive preprocessor branches removed.
    active_source: String,
    defines: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct DummyProgram {
    uniforms: Vec<ActiveVariable>,
    attributes: Vec<ActiveVariable>,
}

/// Graphics context that records calls instead of drawing.
#[derive(Debug)]
pub struct DummyContext {
    valid: bool,
    compile_failure: Option<String>,
    next_id: u32,
    shaders: HashMap<ShaderId, DummyShader>,
    programs: HashMap<ProgramId, DummyProgram>,
    textures: HashMap<TextureId, (u32, u32)>,
    buffers: HashMap<BufferId, usize>,
    current_program: Option<ProgramId>,
    uniform_values: HashMap<(ProgramId, UniformLocation), UniformValue>,
    bound_textures: HashMap<u32, TextureId>,
    calls: Vec<ContextCall>,
}

impl Default for DummyContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DummyContext {
    /// Create a valid context.
    pub fn new() -> Self {
        Self {
            valid: true,
            compile_failure: None,
            next_id: 1,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            buffers: HashMap::new(),
            current_program: None,
            uniform_values: HashMap::new(),
            bound_textures: HashMap::new(),
            calls: Vec::new(),
        }
    }

    /// Make compilation fail for every shader whose source contains
    /// `marker`. An empty marker fails every shader.
    pub fn with_compile_failure(mut self, marker: impl Into<String>) -> Self {
        self.compile_failure = Some(marker.into());
        self
    }

    /// Simulate a lost context.
    pub fn lose_context(&mut self) {
        self.valid = false;
    }

    /// Get the context name.
    pub fn name(&self) -> &'static str {
        "Dummy Context"
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> &[ContextCall] {
        &self.calls
    }

    /// Forget the recorded calls, keeping all resources.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded calls matching `pred`.
    pub fn count_calls(&self, pred: impl Fn(&ContextCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Number of recorded draw calls.
    pub fn draw_count(&self) -> usize {
        self.count_calls(|c| matches!(c, ContextCall::DrawElements { .. }))
    }

    /// Number of linked programs.
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of live textures.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Number of live buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Last value uploaded to the uniform `name` of `program`.
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        let location = self
            .programs
            .get(&program)?
            .uniforms
            .iter()
            .find(|u| u.name == name)?
            .location;
        self.uniform_values
            .get(&(program, UniformLocation(location)))
            .copied()
    }

    /// Texture currently bound to `unit`.
    pub fn bound_texture(&self, unit: u32) -> Option<TextureId> {
        self.bound_textures.get(&unit).copied()
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_valid(&self) -> Result<(), GraphicsError> {
        if self.valid {
            Ok(())
        } else {
            Err(GraphicsError::InvalidContext)
        }
    }
}

impl GraphicsContext for DummyContext {
    fn is_valid(&self) -> bool {
        self.valid
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderId, GraphicsError> {
        self.check_valid()?;
        self.calls.push(ContextCall::CompileShader(stage));
        if let Some(marker) = &self.compile_failure {
            if source.contains(marker.as_str()) {
                return Err(GraphicsError::ShaderCompilation(format!(
                    "{:?}: forced failure",
                    stage
                )));
            }
        }
        let (active_source, defines) =
            preprocess(source).map_err(GraphicsError::ShaderCompilation)?;
        let id = ShaderId(self.allocate());
        log::trace!("DummyContext: compiled {:?} shader {:?}", stage, id);
        self.shaders.insert(
            id,
            DummyShader {
                stage,
                active_source,
                defines,
            },
        );
        Ok(id)
    }

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, GraphicsError> {
        self.check_valid()?;
        let (Some(vs), Some(fs)) = (self.shaders.get(&vertex), self.shaders.get(&fragment)) else {
            return Err(GraphicsError::ProgramLink("unknown shader".into()));
        };
        if vs.stage != ShaderStage::Vertex || fs.stage != ShaderStage::Fragment {
            return Err(GraphicsError::ProgramLink("mismatched shader stages".into()));
        }
        let mut program = DummyProgram::default();
        for shader in [vs, fs] {
            let declared = scan_declarations(&shader.active_source, &shader.defines);
            for name in declared.uniforms {
                if !program.uniforms.iter().any(|u| u.name == name) {
                    let location = program.uniforms.len() as u32;
                    program.uniforms.push(ActiveVariable { name, location });
                }
            }
            if shader.stage == ShaderStage::Vertex {
                for (location, name) in declared.attributes.into_iter().enumerate() {
                    program.attributes.push(ActiveVariable {
                        name,
                        location: location as u32,
                    });
                }
            }
        }
        let id = ProgramId(self.allocate());
        log::trace!(
            "DummyContext: linked program {:?} ({} uniforms, {} attributes)",
            id,
            program.uniforms.len(),
            program.attributes.len()
        );
        self.programs.insert(id, program);
        self.calls.push(ContextCall::LinkProgram(id));
        Ok(id)
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
        self.calls.push(ContextCall::DeleteShader(shader));
    }

    fn active_uniforms(&self, program: ProgramId) -> Vec<ActiveVariable> {
        self.programs
            .get(&program)
            .map(|p| p.uniforms.clone())
            .unwrap_or_default()
    }

    fn active_attributes(&self, program: ProgramId) -> Vec<ActiveVariable> {
        self.programs
            .get(&program)
            .map(|p| p.attributes.clone())
            .unwrap_or_default()
    }

    fn use_program(&mut self, program: ProgramId) {
        self.current_program = Some(program);
        self.calls.push(ContextCall::UseProgram(program));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let Some(program) = self.current_program else {
            log::warn!("DummyContext: uniform set with no program in use");
            return;
        };
        self.uniform_values.insert((program, location), *value);
        self.calls.push(ContextCall::SetUniform {
            program,
            location,
            value: *value,
        });
    }

    fn create_texture(&mut self, image: &ImageData) -> Result<TextureId, GraphicsError> {
        self.check_valid()?;
        let expected = image.width as usize * image.height as usize * 4;
        if image.pixels.len() != expected {
            return Err(GraphicsError::InvalidParameter(format!(
                "{}x{} image needs {} bytes, got {}",
                image.width,
                image.height,
                expected,
                image.pixels.len()
            )));
        }
        let id = TextureId(self.allocate());
        log::trace!(
            "DummyContext: creating texture {:?} ({}x{})",
            id,
            image.width,
            image.height
        );
        self.textures.insert(id, (image.width, image.height));
        self.calls.push(ContextCall::CreateTexture(id));
        Ok(id)
    }

    fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
        match texture {
            Some(t) => self.bound_textures.insert(unit, t),
            None => self.bound_textures.remove(&unit),
        };
        self.calls.push(ContextCall::BindTexture { unit, texture });
    }

    fn create_vertex_buffer(&mut self, data: &[u8]) -> Result<BufferId, GraphicsError> {
        self.check_valid()?;
        let id = BufferId(self.allocate());
        log::trace!("DummyContext: creating vertex buffer {:?} (size: {})", id, data.len());
        self.buffers.insert(id, data.len());
        self.calls.push(ContextCall::CreateBuffer(id));
        Ok(id)
    }

    fn create_index_buffer(&mut self, data: &[u8]) -> Result<BufferId, GraphicsError> {
        self.check_valid()?;
        let id = BufferId(self.allocate());
        log::trace!("DummyContext: creating index buffer {:?} (size: {})", id, data.len());
        self.buffers.insert(id, data.len());
        self.calls.push(ContextCall::CreateBuffer(id));
        Ok(id)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.calls.push(ContextCall::DeleteBuffer(buffer));
    }

    fn bind_vertex_attribute(&mut self, buffer: BufferId, pointer: AttributePointer) {
        self.calls
            .push(ContextCall::BindVertexAttribute { buffer, pointer });
    }

    fn draw_elements(
        &mut self,
        primitive: PrimitiveType,
        indices: BufferId,
        format: IndexFormat,
        count: usize,
    ) {
        self.calls.push(ContextCall::DrawElements {
            primitive,
            indices,
            format,
            count,
        });
    }

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<FramebufferId, GraphicsError> {
        self.check_valid()?;
        if width == 0 || height == 0 {
            return Err(GraphicsError::InvalidParameter(format!(
                "framebuffer size {}x{}",
                width, height
            )));
        }
        let id = FramebufferId(self.allocate());
        self.calls.push(ContextCall::CreateFramebuffer(id));
        Ok(id)
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) {
        self.calls.push(ContextCall::BindFramebuffer(framebuffer));
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.calls.push(ContextCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear(&mut self, color: Option<[f32; 4]>, depth: Option<f32>) {
        self.calls.push(ContextCall::Clear { color, depth });
    }
}

/// Strip inactive `#ifdef` branches and collect `#define`s.
///
/// Supports `#define`, `#ifdef`, `#ifndef`, `#else` and `#endif`; other
/// directives are dropped.
fn preprocess(source: &str) -> Result<(String, HashMap<String, String>), String> {
    let mut defines = HashMap::new();
    // (enclosing branch active, this branch active)
    let mut stack: Vec<(bool, bool)> = Vec::new();
    let mut out = String::with_capacity(source.len());
    for (line_no, line) in source.lines().enumerate() {
        let active = stack.last().map_or(true, |&(outer, this)| outer && this);
        let trimmed = line.trim();
        let Some(directive) = trimmed.strip_prefix('#') else {
            if active {
                out.push_str(line);
                out.push('\n');
            }
            continue;
        };
        let mut words = directive.split_whitespace();
        match words.next() {
            Some("define") if active => {
                if let Some(name) = words.next() {
                    let value = words.collect::<Vec<_>>().join(" ");
                    defines.insert(name.to_string(), value);
                }
            }
            Some("ifdef") => {
                let defined = words.next().is_some_and(|n| defines.contains_key(n));
                stack.push((active, defined));
            }
            Some("ifndef") => {
                let defined = words.next().is_some_and(|n| defines.contains_key(n));
                stack.push((active, !defined));
            }
            Some("else") => match stack.last_mut() {
                Some(top) => top.1 = !top.1,
                None => return Err(format!("{}: #else without #ifdef", line_no + 1)),
            },
            Some("endif") => {
                if stack.pop().is_none() {
                    return Err(format!("{}: #endif without #ifdef", line_no + 1));
                }
            }
            _ => {}
        }
    }
    if !stack.is_empty() {
        return Err("unterminated #ifdef".into());
    }
    Ok((out, defines))
}

#[derive(Debug, Default)]
struct Declarations {
    uniforms: Vec<String>,
    attributes: Vec<String>,
}

/// Find `uniform` and `attribute` declarations, expanding arrays and
/// struct members into the names a driver would report.
fn scan_declarations(source: &str, defines: &HashMap<String, String>) -> Declarations {
    let mut structs: HashMap<String, Vec<String>> = HashMap::new();
    let mut current_struct: Option<(String, Vec<String>)> = None;
    let mut out = Declarations::default();
    for line in source.lines() {
        let line = line.trim();
        if let Some((name, fields)) = current_struct.as_mut() {
            if line.starts_with('}') {
                let name = std::mem::take(name);
                let fields = std::mem::take(fields);
                structs.insert(name, fields);
                current_struct = None;
            } else if let Some(field) = declared_name(line) {
                fields.push(field.0);
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("struct ") {
            let name = rest.trim_end_matches('{').trim().to_string();
            current_struct = Some((name, Vec::new()));
        } else if let Some(rest) = line.strip_prefix("uniform ") {
            let type_name = rest.split_whitespace().next().unwrap_or_default();
            let Some((name, array)) = declared_name(rest) else {
                continue;
            };
            let len = array.map(|n| {
                n.parse::<usize>()
                    .ok()
                    .or_else(|| defines.get(&n).and_then(|v| v.parse().ok()))
                    .unwrap_or(1)
            });
            let elements: Vec<String> = match len {
                Some(len) => (0..len).map(|i| format!("{name}[{i}]")).collect(),
                None => vec![name],
            };
            for element in elements {
                match structs.get(type_name) {
                    Some(fields) => out
                        .uniforms
                        .extend(fields.iter().map(|f| format!("{element}.{f}"))),
                    None => out.uniforms.push(element),
                }
            }
        } else if let Some(rest) = line.strip_prefix("attribute ") {
            if let Some((name, _)) = declared_name(rest) {
                out.attributes.push(name);
            }
        }
    }
    out
}

/// Name and optional array length of a `type name[len];` declaration.
fn declared_name(declaration: &str) -> Option<(String, Option<String>)> {
    let declaration = declaration.trim().strip_suffix(';')?;
    let name = declaration.split_whitespace().last()?;
    match name.split_once('[') {
        Some((base, len)) => Some((
            base.to_string(),
            Some(len.trim_end_matches(']').to_string()),
        )),
        None => Some((name.to_string(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "attribute vec3 position;\n\
        #ifdef LIGHTING\n\
        attribute vec3 normal;\n\
        #endif\n\
        uniform mat4 modelViewMatrix;\n";

    const FRAGMENT: &str = "struct Light {\n\
            vec3 diffuse;\n\
            vec4 position;\n\
        };\n\
        uniform vec4 md;\n\
        #ifdef LIGHTING\n\
        uniform Light lights[COUNT];\n\
        #else\n\
        uniform float tint;\n\
        #endif\n";

    fn link(ctx: &mut DummyContext, header: &str) -> ProgramId {
        let vs = ctx
            .compile_shader(ShaderStage::Vertex, &format!("{header}{VERTEX}"))
            .unwrap();
        let fs = ctx
            .compile_shader(ShaderStage::Fragment, &format!("{header}{FRAGMENT}"))
            .unwrap();
        ctx.link_program(vs, fs).unwrap()
    }

    fn names(vars: Vec<ActiveVariable>) -> Vec<String> {
        vars.into_iter().map(|v| v.name).collect()
    }

    #[test]
    fn active_inputs_follow_defines() {
        let mut ctx = DummyContext::new();
        let lit = link(&mut ctx, "#define LIGHTING\n#define COUNT 2\n");
        assert_eq!(
            names(ctx.active_attributes(lit)),
            vec!["position", "normal"]
        );
        assert_eq!(
            names(ctx.active_uniforms(lit)),
            vec![
                "modelViewMatrix",
                "md",
                "lights[0].diffuse",
                "lights[0].position",
                "lights[1].diffuse",
                "lights[1].position",
            ]
        );

        let unlit = link(&mut ctx, "");
        assert_eq!(names(ctx.active_attributes(unlit)), vec!["position"]);
        assert_eq!(
            names(ctx.active_uniforms(unlit)),
            vec!["modelViewMatrix", "md", "tint"]
        );
    }

    #[test]
    fn uniform_values_are_tracked_per_program() {
        let mut ctx = DummyContext::new();
        let program = link(&mut ctx, "");
        ctx.use_program(program);
        ctx.set_uniform(UniformLocation(1), &UniformValue::Vec4([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(
            ctx.uniform_value(program, "md"),
            Some(UniformValue::Vec4([1.0, 0.0, 0.0, 1.0]))
        );
        assert_eq!(ctx.uniform_value(program, "tint"), None);
    }

    #[test]
    fn forced_and_syntax_failures() {
        let mut ctx = DummyContext::new().with_compile_failure("#define PBR");
        assert!(ctx.compile_shader(ShaderStage::Vertex, VERTEX).is_ok());
        assert!(matches!(
            ctx.compile_shader(ShaderStage::Vertex, "#define PBR\nvoid main() {}"),
            Err(GraphicsError::ShaderCompilation(_))
        ));
        assert!(ctx
            .compile_shader(ShaderStage::Fragment, "#ifdef A\nvoid main() {}")
            .is_err());
    }

    #[test]
    fn lost_context_refuses_resources() {
        let mut ctx = DummyContext::new();
        ctx.lose_context();
        assert!(!ctx.is_valid());
        assert_eq!(
            ctx.create_vertex_buffer(&[0; 4]),
            Err(GraphicsError::InvalidContext)
        );
    }

    #[test]
    fn texture_size_is_checked() {
        let mut ctx = DummyContext::new();
        let image = ImageData::new(2, 2, vec![0; 16]);
        assert!(ctx.create_texture(&image).is_ok());
        let short = ImageData::new(2, 2, vec![0; 3]);
        assert!(ctx.create_texture(&short).is_err());
        assert_eq!(ctx.texture_count(), 1);
    }
}
