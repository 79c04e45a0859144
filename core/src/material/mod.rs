//! CPU-side material and light definitions.
//!
//! Two material models are supported:
//!
//! - [`Material`]: classic Phong terms (diffuse, ambient, specular,
//!   emission, shininess).
//! - [`PbrMaterial`]: metalness/roughness terms with an albedo color.
//!
//! Both reference textures by name per [`TextureSlot`]. Names are resolved
//! to GPU textures by the graphics crate's texture loader, so these types
//! carry no GPU state and can be built on any thread.
//!
//! [`Lights`] holds up to [`MAX_LIGHTS`] lights for one scene.

mod light;

pub use light::{Light, Lights, MAX_LIGHTS};

/// Well-known texture slots.
///
/// Each slot is bound to a fixed texture unit and sampler uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextureSlot {
    Albedo,
    Specular,
    Normal,
    Metalness,
    Roughness,
    Environment,
    Emission,
}

impl TextureSlot {
    /// Every slot in texture-unit order.
    pub const ALL: [TextureSlot; 7] = [
        TextureSlot::Albedo,
        TextureSlot::Specular,
        TextureSlot::Normal,
        TextureSlot::Metalness,
        TextureSlot::Roughness,
        TextureSlot::Environment,
        TextureSlot::Emission,
    ];

    /// Number of slots.
    pub const COUNT: usize = Self::ALL.len();

    /// Texture unit this slot binds to.
    pub fn unit(self) -> u32 {
        self as u32
    }

    /// Sampler uniform name in the default shaders.
    pub fn sampler_name(self) -> &'static str {
        match self {
            TextureSlot::Albedo => "albedoMap",
            TextureSlot::Specular => "specularMap",
            TextureSlot::Normal => "normalMap",
            TextureSlot::Metalness => "metalnessMap",
            TextureSlot::Roughness => "roughnessMap",
            TextureSlot::Environment => "envMap",
            TextureSlot::Emission => "emissionMap",
        }
    }
}

/// Texture names by slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialTextures {
    names: [Option<String>; TextureSlot::COUNT],
}

impl MaterialTextures {
    /// Texture name in `slot`, if any.
    pub fn get(&self, slot: TextureSlot) -> Option<&str> {
        self.names[slot as usize].as_deref()
    }

    /// Set or clear the texture in `slot`.
    pub fn set(&mut self, slot: TextureSlot, name: Option<String>) {
        self.names[slot as usize] = name;
    }

    /// Occupied slots with their texture names, in unit order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureSlot, &str)> + '_ {
        TextureSlot::ALL
            .iter()
            .filter_map(move |&slot| self.get(slot).map(|name| (slot, name)))
    }

    /// True if `slot` has a texture.
    pub fn has(&self, slot: TextureSlot) -> bool {
        self.names[slot as usize].is_some()
    }
}

/// Phong material.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Diffuse color `[r, g, b, a]`.
    pub diffuse: [f32; 4],
    pub ambient: [f32; 3],
    pub specular: [f32; 3],
    pub emission: [f32; 3],
    /// Specular exponent.
    pub shininess: f32,
    pub textures: MaterialTextures,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: [0.8, 0.8, 0.8, 1.0],
            ambient: [0.2, 0.2, 0.2],
            specular: [0.0, 0.0, 0.0],
            emission: [0.0, 0.0, 0.0],
            shininess: 0.0,
            textures: MaterialTextures::default(),
        }
    }
}

impl Material {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diffuse(mut self, diffuse: [f32; 4]) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_ambient(mut self, ambient: [f32; 3]) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_specular(mut self, specular: [f32; 3]) -> Self {
        self.specular = specular;
        self
    }

    pub fn with_emission(mut self, emission: [f32; 3]) -> Self {
        self.emission = emission;
        self
    }

    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = shininess;
        self
    }

    /// Attach a named texture to `slot`.
    pub fn with_texture(mut self, slot: TextureSlot, name: impl Into<String>) -> Self {
        self.textures.set(slot, Some(name.into()));
        self
    }

    /// True if the material has a visible specular highlight.
    pub fn has_specular(&self) -> bool {
        self.shininess > 0.0 && self.specular.iter().any(|&c| c != 0.0)
    }

    /// True if any emission component is nonzero.
    pub fn has_emission(&self) -> bool {
        self.emission.iter().any(|&c| c != 0.0)
    }
}

/// Metalness/roughness material.
#[derive(Debug, Clone, PartialEq)]
pub struct PbrMaterial {
    /// Base color `[r, g, b, a]`.
    pub albedo: [f32; 4],
    pub emission: [f32; 3],
    /// 0 for dielectrics, 1 for metals.
    pub metalness: f32,
    /// 0 is mirror-smooth, 1 fully rough.
    pub roughness: f32,
    pub textures: MaterialTextures,
}

impl Default for PbrMaterial {
    fn default() -> Self {
        Self {
            albedo: [1.0, 1.0, 1.0, 1.0],
            emission: [0.0, 0.0, 0.0],
            metalness: 0.0,
            roughness: 1.0,
            textures: MaterialTextures::default(),
        }
    }
}

impl PbrMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_albedo(mut self, albedo: [f32; 4]) -> Self {
        self.albedo = albedo;
        self
    }

    pub fn with_emission(mut self, emission: [f32; 3]) -> Self {
        self.emission = emission;
        self
    }

    /// Clamped to `[0, 1]`.
    pub fn with_metalness(mut self, metalness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self
    }

    /// Clamped to `[0, 1]`.
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    pub fn with_texture(mut self, slot: TextureSlot, name: impl Into<String>) -> Self {
        self.textures.set(slot, Some(name.into()));
        self
    }

    pub fn has_emission(&self) -> bool {
        self.emission.iter().any(|&c| c != 0.0)
    }
}

/// Either material model.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialKind {
    Basic(Material),
    Pbr(PbrMaterial),
}

impl MaterialKind {
    /// Texture names of the wrapped material.
    pub fn textures(&self) -> &MaterialTextures {
        match self {
            MaterialKind::Basic(m) => &m.textures,
            MaterialKind::Pbr(m) => &m.textures,
        }
    }

    pub fn is_pbr(&self) -> bool {
        matches!(self, MaterialKind::Pbr(_))
    }
}

impl Default for MaterialKind {
    fn default() -> Self {
        MaterialKind::Basic(Material::default())
    }
}

impl From<Material> for MaterialKind {
    fn from(material: Material) -> Self {
        MaterialKind::Basic(material)
    }
}

impl From<PbrMaterial> for MaterialKind {
    fn from(material: PbrMaterial) -> Self {
        MaterialKind::Pbr(material)
    }
}

static_assertions::assert_impl_all!(Material: Send, Sync);
static_assertions::assert_impl_all!(PbrMaterial: Send, Sync);
static_assertions::assert_impl_all!(MaterialKind: Send, Sync);
