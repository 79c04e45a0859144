//! Shader variants, programs and the program cache.
//!
//! The default shader pair in `shaders/` is written with `#ifdef` blocks for
//! every optional feature. A [`ShaderFlags`] value selects a variant: one
//! `#define` per set bit is prepended to both stages before compilation.
//! [`ProgramCache`] compiles each distinct flags value once.
//!
//! # Example
//!
//! ```
//! use prism_graphics::backend::DummyContext;
//! use prism_graphics::shader::{ProgramCache, ShaderFlags};
//!
//! let mut ctx = DummyContext::new();
//! let mut cache = ProgramCache::new();
//! let lit = cache.program(ShaderFlags::LIGHTING, &mut ctx).unwrap();
//! let again = cache.program(ShaderFlags::LIGHTING, &mut ctx).unwrap();
//! assert!(std::rc::Rc::ptr_eq(&lit, &again));
//! ```

mod cache;
mod info;
mod program;

pub use cache::ProgramCache;
pub use info::{MatrixSemantics, ShaderInfo};
pub use program::ShaderProgram;

use bitflags::bitflags;
use prism_core::material::{Material, MaterialTextures, PbrMaterial, TextureSlot, MAX_LIGHTS};
use prism_core::mesh::AttributeBits;

bitflags! {
    /// Optional features of the default shader.
    ///
    /// Each flag is emitted as `#define <NAME>`. The exact bits are the
    /// program cache key, so two masks that happen to render the same way
    /// still get separate programs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderFlags: u32 {
        /// Per-vertex normals and the light loop.
        const LIGHTING = 1 << 0;
        /// Phong specular term.
        const SPECULAR = 1 << 1;
        /// Per-vertex colors modulate the diffuse color.
        const VERTEX_COLOR = 1 << 2;
        /// Texture coordinates are passed to the fragment stage.
        const TEX_COORD = 1 << 3;
        const ALBEDO_MAP = 1 << 4;
        const SPECULAR_MAP = 1 << 5;
        /// Tangent-space normal map; needs tangents and bitangents.
        const NORMAL_MAP = 1 << 6;
        const METALNESS_MAP = 1 << 7;
        const ROUGHNESS_MAP = 1 << 8;
        /// Cube-map reflections.
        const ENV_MAP = 1 << 9;
        const EMISSION = 1 << 10;
        const EMISSION_MAP = 1 << 11;
        /// Metalness/roughness shading instead of Phong.
        const PBR = 1 << 12;
    }
}

impl Default for ShaderFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl ShaderFlags {
    /// Variant for a Phong material drawn on a mesh with `attributes`.
    ///
    /// Features whose inputs are missing are left out: lighting needs
    /// normals, texture maps need texture coordinates, normal maps also need
    /// tangents and bitangents.
    pub fn for_material(material: &Material, attributes: AttributeBits, lit: bool) -> Self {
        let mut flags = Self::common(attributes, lit);
        if flags.contains(Self::LIGHTING) && material.has_specular() {
            flags |= Self::SPECULAR;
        }
        if material.has_emission() {
            flags |= Self::EMISSION;
        }
        flags | Self::texture_flags(&material.textures, flags, attributes)
    }

    /// Variant for a metalness/roughness material.
    pub fn for_pbr_material(material: &PbrMaterial, attributes: AttributeBits, lit: bool) -> Self {
        let mut flags = Self::common(attributes, lit) | Self::PBR;
        if material.has_emission() {
            flags |= Self::EMISSION;
        }
        flags | Self::texture_flags(&material.textures, flags, attributes)
    }

    fn common(attributes: AttributeBits, lit: bool) -> Self {
        let mut flags = Self::empty();
        if lit && attributes.contains(AttributeBits::NORMAL) {
            flags |= Self::LIGHTING;
        }
        if attributes.contains(AttributeBits::COLOR) {
            flags |= Self::VERTEX_COLOR;
        }
        flags
    }

    fn texture_flags(
        textures: &MaterialTextures,
        flags: ShaderFlags,
        attributes: AttributeBits,
    ) -> Self {
        let has_uv = attributes.contains(AttributeBits::TEXCOORD);
        let lit = flags.contains(Self::LIGHTING);
        let mut out = Self::empty();
        for (slot, _) in textures.iter() {
            let usable = match slot {
                TextureSlot::Albedo => has_uv,
                TextureSlot::Specular => has_uv && flags.contains(Self::SPECULAR),
                TextureSlot::Normal => {
                    has_uv
                        && lit
                        && attributes.contains(AttributeBits::TANGENT | AttributeBits::BITANGENT)
                }
                TextureSlot::Metalness | TextureSlot::Roughness => {
                    has_uv && lit && flags.contains(Self::PBR)
                }
                TextureSlot::Environment => lit,
                TextureSlot::Emission => has_uv && flags.contains(Self::EMISSION),
            };
            if usable {
                out |= Self::for_slot(slot);
            }
        }
        if out.intersects(!Self::ENV_MAP) {
            out |= Self::TEX_COORD;
        }
        out
    }

    /// Flag enabling the texture in `slot`.
    pub fn for_slot(slot: TextureSlot) -> Self {
        match slot {
            TextureSlot::Albedo => Self::ALBEDO_MAP,
            TextureSlot::Specular => Self::SPECULAR_MAP,
            TextureSlot::Normal => Self::NORMAL_MAP,
            TextureSlot::Metalness => Self::METALNESS_MAP,
            TextureSlot::Roughness => Self::ROUGHNESS_MAP,
            TextureSlot::Environment => Self::ENV_MAP,
            TextureSlot::Emission => Self::EMISSION_MAP,
        }
    }

    /// Preprocessor header: `MAX_LIGHTS` plus one `#define` per set flag.
    pub fn defines(&self) -> String {
        let mut header = format!("#define MAX_LIGHTS {}\n", MAX_LIGHTS);
        for (name, _) in self.iter_names() {
            header.push_str("#define ");
            header.push_str(name);
            header.push('\n');
        }
        header
    }
}
