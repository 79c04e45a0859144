//! Shader sources with their uniform and attribute semantics.

use std::borrow::Cow;

use bitflags::bitflags;
use prism_core::material::TextureSlot;
use prism_core::mesh::VertexAttributeSemantic;

use crate::backend::UniformValue;

const DEFAULT_VERTEX: &str = include_str!("../../shaders/default.vert");
const DEFAULT_FRAGMENT: &str = include_str!("../../shaders/default.frag");

bitflags! {
    /// Transform matrices a program consumes.
    ///
    /// Batches compute only the products a program declares.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MatrixSemantics: u8 {
        const MODEL = 1 << 0;
        const VIEW = 1 << 1;
        const PROJECTION = 1 << 2;
        const MODEL_VIEW = 1 << 3;
        const MODEL_VIEW_PROJECTION = 1 << 4;
        /// Inverse transpose of the model-view 3x3, for normals.
        const MODEL_VIEW_INVERSE_TRANSPOSE = 1 << 5;
        const VIEW_INVERSE = 1 << 6;
    }
}

/// Vertex and fragment sources plus the tables that tell the renderer what
/// each uniform and attribute means.
#[derive(Debug, Clone)]
pub struct ShaderInfo {
    label: String,
    vertex_source: Cow<'static, str>,
    fragment_source: Cow<'static, str>,
    uniform_semantics: Vec<(String, MatrixSemantics)>,
    attribute_semantics: Vec<(String, VertexAttributeSemantic)>,
    default_uniforms: Vec<(String, UniformValue)>,
}

impl ShaderInfo {
    /// Sources with empty semantic tables.
    pub fn new(
        label: impl Into<String>,
        vertex_source: impl Into<Cow<'static, str>>,
        fragment_source: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            label: label.into(),
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            uniform_semantics: Vec::new(),
            attribute_semantics: Vec::new(),
            default_uniforms: Vec::new(),
        }
    }

    /// The built-in shader with the standard tables and material defaults.
    pub fn default_shader() -> Self {
        let mut info = Self::new("default", DEFAULT_VERTEX, DEFAULT_FRAGMENT)
            .with_standard_semantics()
            .with_default_uniform("md", UniformValue::Vec4([0.8, 0.8, 0.8, 1.0]))
            .with_default_uniform("ma", UniformValue::Vec3([0.2, 0.2, 0.2]))
            .with_default_uniform("ms", UniformValue::Vec3([0.0; 3]))
            .with_default_uniform("me", UniformValue::Vec3([0.0; 3]))
            .with_default_uniform("mshin", UniformValue::Float(0.0))
            .with_default_uniform("metalness", UniformValue::Float(0.0))
            .with_default_uniform("roughness", UniformValue::Float(1.0));
        for slot in TextureSlot::ALL {
            info = info
                .with_default_uniform(slot.sampler_name(), UniformValue::Int(slot.unit() as i32));
        }
        info
    }

    /// Add the names the built-in shader uses for matrices and attributes.
    pub fn with_standard_semantics(self) -> Self {
        self.with_uniform_semantic("modelMatrix", MatrixSemantics::MODEL)
            .with_uniform_semantic("viewMatrix", MatrixSemantics::VIEW)
            .with_uniform_semantic("projectionMatrix", MatrixSemantics::PROJECTION)
            .with_uniform_semantic("modelViewMatrix", MatrixSemantics::MODEL_VIEW)
            .with_uniform_semantic(
                "modelViewProjectionMatrix",
                MatrixSemantics::MODEL_VIEW_PROJECTION,
            )
            .with_uniform_semantic(
                "normalMatrix",
                MatrixSemantics::MODEL_VIEW_INVERSE_TRANSPOSE,
            )
            .with_uniform_semantic("viewInverseMatrix", MatrixSemantics::VIEW_INVERSE)
            .with_attribute_semantic("position", VertexAttributeSemantic::Position)
            .with_attribute_semantic("normal", VertexAttributeSemantic::Normal)
            .with_attribute_semantic("color", VertexAttributeSemantic::Color)
            .with_attribute_semantic("uv", VertexAttributeSemantic::TexCoord)
            .with_attribute_semantic("tangent", VertexAttributeSemantic::Tangent)
            .with_attribute_semantic("bitangent", VertexAttributeSemantic::Bitangent)
    }

    /// Declare that uniform `name` receives the matrix `semantic`.
    pub fn with_uniform_semantic(
        mut self,
        name: impl Into<String>,
        semantic: MatrixSemantics,
    ) -> Self {
        self.uniform_semantics.push((name.into(), semantic));
        self
    }

    /// Declare that attribute `name` reads the mesh attribute `semantic`.
    pub fn with_attribute_semantic(
        mut self,
        name: impl Into<String>,
        semantic: VertexAttributeSemantic,
    ) -> Self {
        self.attribute_semantics.push((name.into(), semantic));
        self
    }

    /// Value uploaded once when a program is first used.
    pub fn with_default_uniform(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        self.default_uniforms.push((name.into(), value));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertex_source(&self) -> &str {
        &self.vertex_source
    }

    pub fn fragment_source(&self) -> &str {
        &self.fragment_source
    }

    /// Matrix semantic of uniform `name`.
    pub fn uniform_semantic(&self, name: &str) -> Option<MatrixSemantics> {
        self.uniform_semantics
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, s)| s)
    }

    /// Mesh attribute read by attribute `name`.
    pub fn attribute_semantic(&self, name: &str) -> Option<VertexAttributeSemantic> {
        self.attribute_semantics
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, s)| s)
    }

    pub fn default_uniforms(&self) -> &[(String, UniformValue)] {
        &self.default_uniforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shader_tables() {
        let info = ShaderInfo::default_shader();
        assert_eq!(
            info.uniform_semantic("normalMatrix"),
            Some(MatrixSemantics::MODEL_VIEW_INVERSE_TRANSPOSE)
        );
        assert_eq!(
            info.attribute_semantic("uv"),
            Some(VertexAttributeSemantic::TexCoord)
        );
        assert_eq!(info.uniform_semantic("md"), None);
        assert!(info
            .default_uniforms()
            .contains(&("envMap".to_string(), UniformValue::Int(5))));
        assert!(info.vertex_source().contains("#ifdef LIGHTING"));
    }

    #[test]
    fn custom_shader_starts_empty() {
        let info = ShaderInfo::new("unlit", "void main() {}", "void main() {}");
        assert_eq!(info.label(), "unlit");
        assert_eq!(info.attribute_semantic("position"), None);
        assert!(info.default_uniforms().is_empty());
    }
}
